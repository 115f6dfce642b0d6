//! Authorization service implementations

pub mod access;
pub mod permission;
pub mod role;
pub mod user;
