use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Draw result. `(sweepstake_id, user_id)` is the natural key so a user can
/// win a given sweepstake at most once; `position` keeps the draw order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sweepstake_winners")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub sweepstake_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i64,
    pub position: i32,
    pub name: String,
    pub avatar_url: Option<String>,
    pub won_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
