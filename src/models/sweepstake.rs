use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{
    SweepstakeStatus, participant_entity as participants, sweepstake_entity as sweepstakes,
    winner_entity as winners,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSweepstakeRequest {
    #[schema(example = "Weekend spa getaway")]
    pub title: String,
    pub description: String,
    #[schema(example = "Two nights for two, breakfast included")]
    pub prize_details: String,
    pub image_url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[schema(example = 50)]
    pub points_to_enter: i64,
    #[schema(example = 1)]
    pub number_of_winners: i32,
    pub max_participants: Option<i32>,
    /// Admins may create on behalf of an advertiser
    pub advertiser_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SweepstakeQuery {
    pub advertiser_id: Option<i64>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SweepstakeResponse {
    pub id: i64,
    pub advertiser_id: i64,
    pub title: String,
    pub description: String,
    pub prize_details: String,
    pub image_url: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub points_to_enter: i64,
    pub number_of_winners: i32,
    pub max_participants: Option<i32>,
    /// Status as of the request time
    pub status: SweepstakeStatus,
    pub is_drawn: bool,
    pub draw_date: Option<DateTime<Utc>>,
    pub participant_count: i64,
    pub created_at: DateTime<Utc>,
}

impl SweepstakeResponse {
    pub fn new(s: sweepstakes::Model, status: SweepstakeStatus) -> Self {
        Self {
            id: s.id,
            advertiser_id: s.advertiser_id,
            title: s.title,
            description: s.description,
            prize_details: s.prize_details,
            image_url: s.image_url,
            start_date: s.start_date,
            end_date: s.end_date,
            points_to_enter: s.points_to_enter,
            number_of_winners: s.number_of_winners,
            max_participants: s.max_participants,
            status,
            is_drawn: s.is_drawn,
            draw_date: s.draw_date,
            participant_count: s.participant_count,
            created_at: s.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ParticipantResponse {
    pub id: i64,
    pub sweepstake_id: i64,
    pub user_id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
    pub entry_date: DateTime<Utc>,
}

impl From<participants::Model> for ParticipantResponse {
    fn from(p: participants::Model) -> Self {
        Self {
            id: p.id,
            sweepstake_id: p.sweepstake_id,
            user_id: p.user_id,
            name: p.name,
            avatar_url: p.avatar_url,
            entry_date: p.entry_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WinnerResponse {
    pub sweepstake_id: i64,
    pub user_id: i64,
    /// 1-based draw order
    pub position: i32,
    pub name: String,
    pub avatar_url: Option<String>,
    pub won_at: DateTime<Utc>,
}

impl From<winners::Model> for WinnerResponse {
    fn from(w: winners::Model) -> Self {
        Self {
            sweepstake_id: w.sweepstake_id,
            user_id: w.user_id,
            position: w.position,
            name: w.name,
            avatar_url: w.avatar_url,
            won_at: w.won_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelSweepstakeResponse {
    pub sweepstake: SweepstakeResponse,
    /// Participants whose entry cost was returned
    pub refunded_entries: usize,
    pub refunded_points: i64,
}
