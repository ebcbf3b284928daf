//! Initial schema migration.
//!
//! - `users`: credentials, region and alert preferences
//! - `transactions`: raw debit/credit rows the aggregates are computed from
//! - `limits`: one spending-limit profile per user

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    Email,
    Country,
    TelegramChatId,
    EmailAlertsEnabled,
    TelegramAlertsEnabled,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    Username,
    AmountMinor,
    Category,
    Direction,
    OccurredAtMs,
    Description,
}

#[derive(Iden)]
enum Limits {
    Table,
    Username,
    Food,
    Transport,
    Shopping,
    Entertainment,
    Bills,
    Healthcare,
    Education,
    Other,
    MonthlyBudget,
    DailyLimit,
    WeeklyLimit,
    SavingsGoal,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::Email).string())
                    .col(ColumnDef::new(Users::Country).string())
                    .col(ColumnDef::new(Users::TelegramChatId).big_integer())
                    .col(
                        ColumnDef::new(Users::EmailAlertsEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::TelegramAlertsEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::Username).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Category).string().not_null())
                    .col(ColumnDef::new(Transactions::Direction).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::OccurredAtMs)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Description).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-username")
                            .from(Transactions::Table, Transactions::Username)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-username-direction-occurred_at")
                    .table(Transactions::Table)
                    .col(Transactions::Username)
                    .col(Transactions::Direction)
                    .col(Transactions::OccurredAtMs)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Limits
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Limits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Limits::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Limits::Food).big_integer())
                    .col(ColumnDef::new(Limits::Transport).big_integer())
                    .col(ColumnDef::new(Limits::Shopping).big_integer())
                    .col(ColumnDef::new(Limits::Entertainment).big_integer())
                    .col(ColumnDef::new(Limits::Bills).big_integer())
                    .col(ColumnDef::new(Limits::Healthcare).big_integer())
                    .col(ColumnDef::new(Limits::Education).big_integer())
                    .col(ColumnDef::new(Limits::Other).big_integer())
                    .col(ColumnDef::new(Limits::MonthlyBudget).big_integer())
                    .col(ColumnDef::new(Limits::DailyLimit).big_integer())
                    .col(ColumnDef::new(Limits::WeeklyLimit).big_integer())
                    .col(ColumnDef::new(Limits::SavingsGoal).big_integer())
                    .col(ColumnDef::new(Limits::UpdatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-limits-username")
                            .from(Limits::Table, Limits::Username)
                            .to(Users::Table, Users::Username)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Limits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
