//! Storage seam for accounts, the points ledger and sweepstakes.
//!
//! Services never talk to the database directly. They hold an
//! `Arc<dyn RewardsStore>` and open a [`StoreTransaction`] for every
//! read-check-write sequence; a transaction that is dropped without
//! [`StoreTransaction::commit`] is rolled back.

pub mod memory_store;
pub mod sea_orm_store;

pub use memory_store::MemoryStore;
pub use sea_orm_store::SeaOrmStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    PointTransactionKind, SweepstakeStatus, UserRole, participant_entity as participants,
    point_transaction_entity as point_transactions, sweepstake_entity as sweepstakes,
    user_entity as users, winner_entity as winners,
};
use crate::error::AppResult;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSweepstake {
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
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub sweepstake_id: i64,
    pub user_id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
    pub entry_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWinner {
    pub sweepstake_id: i64,
    pub user_id: i64,
    pub position: i32,
    pub name: String,
    pub avatar_url: Option<String>,
    pub won_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPointTransaction {
    pub user_id: i64,
    pub kind: PointTransactionKind,
    pub amount: i64,
    pub balance_after: i64,
    pub related_sweepstake_id: Option<i64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Paging window shared by the list queries
#[derive(Debug, Clone, Copy, Default)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SweepstakeFilter {
    pub advertiser_id: Option<i64>,
    pub window: PageWindow,
}

#[async_trait]
pub trait RewardsStore: Send + Sync {
    async fn get_user(&self, user_id: i64) -> AppResult<Option<users::Model>>;

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<users::Model>>;

    async fn get_sweepstake(&self, sweepstake_id: i64) -> AppResult<Option<sweepstakes::Model>>;

    /// Newest first; returns the page and the total row count
    async fn list_sweepstakes(
        &self,
        filter: SweepstakeFilter,
    ) -> AppResult<(Vec<sweepstakes::Model>, i64)>;

    /// Stored with status `upcoming`, not drawn, zero participants
    async fn create_sweepstake(&self, sweepstake: NewSweepstake) -> AppResult<sweepstakes::Model>;

    /// Entry order
    async fn list_participants(&self, sweepstake_id: i64) -> AppResult<Vec<participants::Model>>;

    /// Draw order
    async fn list_winners(&self, sweepstake_id: i64) -> AppResult<Vec<winners::Model>>;

    /// Newest first; returns the page and the total row count
    async fn list_point_transactions(
        &self,
        user_id: i64,
        window: PageWindow,
    ) -> AppResult<(Vec<point_transactions::Model>, i64)>;

    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>>;
}

/// All-or-nothing unit of work. Reads through `lock_*` hold the row until
/// commit or drop, so checks made on them stay valid for the writes that follow.
#[async_trait]
pub trait StoreTransaction: Send {
    async fn lock_user(&mut self, user_id: i64) -> AppResult<Option<users::Model>>;

    async fn lock_sweepstake(&mut self, sweepstake_id: i64)
    -> AppResult<Option<sweepstakes::Model>>;

    async fn count_user_entries(&mut self, sweepstake_id: i64, user_id: i64) -> AppResult<i64>;

    async fn list_participants(&mut self, sweepstake_id: i64)
    -> AppResult<Vec<participants::Model>>;

    /// Fails with a validation error if the email is taken
    async fn insert_user(&mut self, user: NewUser) -> AppResult<users::Model>;

    async fn set_points(
        &mut self,
        user_id: i64,
        points: i64,
        lifetime_points: i64,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    async fn record_point_transaction(
        &mut self,
        entry: NewPointTransaction,
    ) -> AppResult<point_transactions::Model>;

    async fn insert_participant(
        &mut self,
        participant: NewParticipant,
    ) -> AppResult<participants::Model>;

    async fn set_participant_count(
        &mut self,
        sweepstake_id: i64,
        count: i64,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    async fn set_status(
        &mut self,
        sweepstake_id: i64,
        status: SweepstakeStatus,
        now: DateTime<Utc>,
    ) -> AppResult<()>;

    async fn insert_winners(&mut self, winners: Vec<NewWinner>) -> AppResult<Vec<winners::Model>>;

    /// Flip to `drawing_complete`. Only succeeds if the row is not drawn yet,
    /// otherwise `SweepstakeError::ConcurrencyConflict`.
    async fn mark_drawn(&mut self, sweepstake_id: i64, draw_date: DateTime<Utc>) -> AppResult<()>;

    async fn commit(self: Box<Self>) -> AppResult<()>;
}
