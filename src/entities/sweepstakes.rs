use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "sweepstake_status")]
#[serde(rename_all = "snake_case")]
pub enum SweepstakeStatus {
    #[sea_orm(string_value = "upcoming")]
    Upcoming,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "ended")]
    Ended,
    #[sea_orm(string_value = "drawing_complete")]
    DrawingComplete,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl std::fmt::Display for SweepstakeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepstakeStatus::Upcoming => write!(f, "upcoming"),
            SweepstakeStatus::Active => write!(f, "active"),
            SweepstakeStatus::Ended => write!(f, "ended"),
            SweepstakeStatus::DrawingComplete => write!(f, "drawing_complete"),
            SweepstakeStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Sweepstake (prize draw) entity
///
/// - `status` is the stored status. Date-driven transitions
///   (upcoming -> active -> ended) are never written back; read it through
///   `derive_effective_status`.
/// - `participant_count` is a denormalized counter maintained by the entry service.
/// - `end_date >= start_date` is enforced on create and by a table check.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "sweepstakes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning advertiser (users.id)
    pub advertiser_id: i64,
    pub title: String,
    pub description: String,
    pub prize_details: String,
    pub image_url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Cost per entry, >= 0
    pub points_to_enter: i64,
    /// >= 1
    pub number_of_winners: i32,
    pub max_participants: Option<i32>,
    pub status: SweepstakeStatus,
    pub is_drawn: bool,
    pub draw_date: Option<DateTime<Utc>>,
    pub participant_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
