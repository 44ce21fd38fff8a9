use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// One row per sweepstake entry. Written once by the entry service, never updated.
/// `name` / `avatar_url` are a snapshot of the user's profile at entry time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sweepstake_participants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub sweepstake_id: i64,
    pub user_id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
    pub entry_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
