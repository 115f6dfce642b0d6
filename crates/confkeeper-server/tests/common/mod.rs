//! Common test utilities for integration testing
//!
//! - TestDatabase: migrated database per test (in-memory SQLite by default)
//! - Helpers that generate identifiers unique across tests and runs, so the
//!   suites also work against a shared `TEST_DATABASE_URL` database

#[allow(dead_code, unused_imports)]
pub mod db;

#[allow(unused_imports)]
pub use db::TestDatabase;

use std::sync::atomic::{AtomicU64, Ordering};

use confkeeper_common::Whitelist;

#[allow(dead_code)]
pub const TEST_AUTHOR: &str = "tester";
#[allow(dead_code)]
pub const TEST_PASSWORD: &str = "secret";
#[allow(dead_code)]
pub const DEFAULT_GROUP: &str = "DEFAULT_GROUP";

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique test ID to avoid conflicts between tests
pub fn unique_test_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_micros() as u64;
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{:x}{:08x}", timestamp, seq)
}

/// Unique value with a readable prefix, short enough for usernames and roles
#[allow(dead_code)]
pub fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, unique_test_id())
}

#[allow(dead_code)]
pub fn whitelist() -> Whitelist {
    Whitelist::default()
}
