use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConfigInfo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConfigInfo::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ConfigInfo::DataId).string_len(255).not_null())
                    .col(ColumnDef::new(ConfigInfo::GroupId).string_len(255).not_null())
                    .col(ColumnDef::new(ConfigInfo::TenantId).string_len(128).not_null())
                    .col(ColumnDef::new(ConfigInfo::Content).text().not_null())
                    .col(ColumnDef::new(ConfigInfo::Type).string_len(64).not_null())
                    .col(ColumnDef::new(ConfigInfo::Version).integer().not_null())
                    .col(ColumnDef::new(ConfigInfo::Author).string_len(128).not_null())
                    .col(ColumnDef::new(ConfigInfo::GmtCreate).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        // Two appends racing past the version lock cannot both commit
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uk_configinfo_key_version")
                    .table(ConfigInfo::Table)
                    .col(ConfigInfo::DataId)
                    .col(ConfigInfo::GroupId)
                    .col(ConfigInfo::TenantId)
                    .col(ConfigInfo::Version)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_configinfo_tenant")
                    .table(ConfigInfo::Table)
                    .col(ConfigInfo::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ConfigVersionLock::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConfigVersionLock::DataId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConfigVersionLock::GroupId)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConfigVersionLock::TenantId)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConfigVersionLock::GmtCreate)
                            .date_time()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ConfigVersionLock::DataId)
                            .col(ConfigVersionLock::GroupId)
                            .col(ConfigVersionLock::TenantId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TenantInfo::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TenantInfo::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TenantInfo::TenantId)
                            .string_len(128)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(TenantInfo::TenantName).string_len(128).not_null())
                    .col(ColumnDef::new(TenantInfo::TenantDesc).string_len(256).null())
                    .col(ColumnDef::new(TenantInfo::GmtCreate).big_integer().not_null())
                    .col(ColumnDef::new(TenantInfo::GmtModified).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(50)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string_len(500).not_null())
                    .col(ColumnDef::new(Users::Enabled).boolean().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Roles::Username).string_len(50).not_null())
                    .col(ColumnDef::new(Roles::Role).string_len(50).not_null())
                    .primary_key(Index::create().col(Roles::Username).col(Roles::Role))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Permissions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Permissions::Role).string_len(50).not_null())
                    .col(ColumnDef::new(Permissions::Resource).string_len(128).not_null())
                    .col(ColumnDef::new(Permissions::Action).string_len(8).not_null())
                    .primary_key(
                        Index::create()
                            .col(Permissions::Role)
                            .col(Permissions::Resource)
                            .col(Permissions::Action),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Permissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TenantInfo::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConfigVersionLock::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConfigInfo::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ConfigInfo {
    Table,
    Id,
    DataId,
    GroupId,
    TenantId,
    Content,
    Type,
    Version,
    Author,
    GmtCreate,
}

#[derive(DeriveIden)]
enum ConfigVersionLock {
    Table,
    DataId,
    GroupId,
    TenantId,
    GmtCreate,
}

#[derive(DeriveIden)]
enum TenantInfo {
    Table,
    Id,
    TenantId,
    TenantName,
    TenantDesc,
    GmtCreate,
    GmtModified,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Username,
    Password,
    Enabled,
}

#[derive(DeriveIden)]
enum Roles {
    Table,
    Username,
    Role,
}

#[derive(DeriveIden)]
enum Permissions {
    Table,
    Role,
    Resource,
    Action,
}
