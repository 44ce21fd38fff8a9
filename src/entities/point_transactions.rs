use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "point_transaction_kind"
)]
#[serde(rename_all = "snake_case")]
pub enum PointTransactionKind {
    #[sea_orm(string_value = "welcome_bonus")]
    WelcomeBonus,
    #[sea_orm(string_value = "sweepstake_entry")]
    SweepstakeEntry,
    #[sea_orm(string_value = "sweepstake_refund")]
    SweepstakeRefund,
    #[sea_orm(string_value = "admin_adjustment")]
    AdminAdjustment,
}

impl PointTransactionKind {
    /// Whether a credit of this kind counts as earned points for leveling.
    /// Refunds only give back what was spent.
    pub fn counts_toward_level(&self) -> bool {
        matches!(
            self,
            PointTransactionKind::WelcomeBonus | PointTransactionKind::AdminAdjustment
        )
    }
}

impl std::fmt::Display for PointTransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointTransactionKind::WelcomeBonus => write!(f, "welcome_bonus"),
            PointTransactionKind::SweepstakeEntry => write!(f, "sweepstake_entry"),
            PointTransactionKind::SweepstakeRefund => write!(f, "sweepstake_refund"),
            PointTransactionKind::AdminAdjustment => write!(f, "admin_adjustment"),
        }
    }
}

/// Points ledger row. One row per balance change; `amount` is the signed delta.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "point_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub kind: PointTransactionKind,
    pub amount: i64,
    pub balance_after: i64,
    pub related_sweepstake_id: Option<i64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
