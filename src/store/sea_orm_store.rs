use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::{
    NewParticipant, NewPointTransaction, NewSweepstake, NewUser, NewWinner, PageWindow,
    RewardsStore, StoreTransaction, SweepstakeFilter,
};
use crate::entities::{
    SweepstakeStatus, participant_entity as participants,
    point_transaction_entity as point_transactions, sweepstake_entity as sweepstakes,
    user_entity as users, winner_entity as winners,
};
use crate::error::{AppError, AppResult, SweepstakeError};

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct SeaOrmStore {
    pool: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RewardsStore for SeaOrmStore {
    async fn get_user(&self, user_id: i64) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find_by_id(user_id).one(&self.pool).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::Email.eq(email.to_ascii_lowercase()))
            .one(&self.pool)
            .await?)
    }

    async fn get_sweepstake(&self, sweepstake_id: i64) -> AppResult<Option<sweepstakes::Model>> {
        Ok(sweepstakes::Entity::find_by_id(sweepstake_id)
            .one(&self.pool)
            .await?)
    }

    async fn list_sweepstakes(
        &self,
        filter: SweepstakeFilter,
    ) -> AppResult<(Vec<sweepstakes::Model>, i64)> {
        let mut base_query = sweepstakes::Entity::find();
        if let Some(advertiser_id) = filter.advertiser_id {
            base_query = base_query.filter(sweepstakes::Column::AdvertiserId.eq(advertiser_id));
        }

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by_desc(sweepstakes::Column::CreatedAt)
            .order_by_desc(sweepstakes::Column::Id)
            .limit(filter.window.limit)
            .offset(filter.window.offset)
            .all(&self.pool)
            .await?;

        Ok((items, total))
    }

    async fn create_sweepstake(&self, s: NewSweepstake) -> AppResult<sweepstakes::Model> {
        let model = sweepstakes::ActiveModel {
            advertiser_id: Set(s.advertiser_id),
            title: Set(s.title),
            description: Set(s.description),
            prize_details: Set(s.prize_details),
            image_url: Set(s.image_url),
            start_date: Set(s.start_date),
            end_date: Set(s.end_date),
            points_to_enter: Set(s.points_to_enter),
            number_of_winners: Set(s.number_of_winners),
            max_participants: Set(s.max_participants),
            status: Set(SweepstakeStatus::Upcoming),
            is_drawn: Set(false),
            draw_date: Set(None),
            participant_count: Set(0),
            created_at: Set(s.created_at),
            updated_at: Set(s.created_at),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;
        Ok(model)
    }

    async fn list_participants(&self, sweepstake_id: i64) -> AppResult<Vec<participants::Model>> {
        Ok(participants::Entity::find()
            .filter(participants::Column::SweepstakeId.eq(sweepstake_id))
            .order_by_asc(participants::Column::EntryDate)
            .order_by_asc(participants::Column::Id)
            .all(&self.pool)
            .await?)
    }

    async fn list_winners(&self, sweepstake_id: i64) -> AppResult<Vec<winners::Model>> {
        Ok(winners::Entity::find()
            .filter(winners::Column::SweepstakeId.eq(sweepstake_id))
            .order_by_asc(winners::Column::Position)
            .all(&self.pool)
            .await?)
    }

    async fn list_point_transactions(
        &self,
        user_id: i64,
        window: PageWindow,
    ) -> AppResult<(Vec<point_transactions::Model>, i64)> {
        let base_query =
            point_transactions::Entity::find().filter(point_transactions::Column::UserId.eq(user_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by_desc(point_transactions::Column::CreatedAt)
            .order_by_desc(point_transactions::Column::Id)
            .limit(window.limit)
            .offset(window.offset)
            .all(&self.pool)
            .await?;

        Ok((items, total))
    }

    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let txn = self.pool.begin().await?;
        Ok(Box::new(SeaOrmTransaction { txn }))
    }
}

/// Wraps a sea-orm transaction; dropping it rolls back.
struct SeaOrmTransaction {
    txn: DatabaseTransaction,
}

#[async_trait]
impl StoreTransaction for SeaOrmTransaction {
    async fn lock_user(&mut self, user_id: i64) -> AppResult<Option<users::Model>> {
        Ok(users::Entity::find_by_id(user_id)
            .lock_exclusive()
            .one(&self.txn)
            .await?)
    }

    async fn lock_sweepstake(
        &mut self,
        sweepstake_id: i64,
    ) -> AppResult<Option<sweepstakes::Model>> {
        Ok(sweepstakes::Entity::find_by_id(sweepstake_id)
            .lock_exclusive()
            .one(&self.txn)
            .await?)
    }

    async fn count_user_entries(&mut self, sweepstake_id: i64, user_id: i64) -> AppResult<i64> {
        let count = participants::Entity::find()
            .filter(participants::Column::SweepstakeId.eq(sweepstake_id))
            .filter(participants::Column::UserId.eq(user_id))
            .count(&self.txn)
            .await?;
        Ok(count as i64)
    }

    async fn list_participants(
        &mut self,
        sweepstake_id: i64,
    ) -> AppResult<Vec<participants::Model>> {
        Ok(participants::Entity::find()
            .filter(participants::Column::SweepstakeId.eq(sweepstake_id))
            .order_by_asc(participants::Column::EntryDate)
            .order_by_asc(participants::Column::Id)
            .all(&self.txn)
            .await?)
    }

    async fn insert_user(&mut self, user: NewUser) -> AppResult<users::Model> {
        let email = user.email.to_ascii_lowercase();
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(&self.txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "Email is already registered".to_string(),
            ));
        }

        let model = users::ActiveModel {
            email: Set(email),
            display_name: Set(user.display_name),
            avatar_url: Set(user.avatar_url),
            password_hash: Set(user.password_hash),
            role: Set(user.role),
            points: Set(0),
            lifetime_points: Set(0),
            created_at: Set(user.created_at),
            updated_at: Set(user.created_at),
            ..Default::default()
        }
        .insert(&self.txn)
        .await?;
        Ok(model)
    }

    async fn set_points(
        &mut self,
        user_id: i64,
        points: i64,
        lifetime_points: i64,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = users::Entity::update_many()
            .set(users::ActiveModel {
                points: Set(points),
                lifetime_points: Set(lifetime_points),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(users::Column::Id.eq(user_id))
            .exec(&self.txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        Ok(())
    }

    async fn record_point_transaction(
        &mut self,
        entry: NewPointTransaction,
    ) -> AppResult<point_transactions::Model> {
        let model = point_transactions::ActiveModel {
            user_id: Set(entry.user_id),
            kind: Set(entry.kind),
            amount: Set(entry.amount),
            balance_after: Set(entry.balance_after),
            related_sweepstake_id: Set(entry.related_sweepstake_id),
            description: Set(entry.description),
            created_at: Set(entry.created_at),
            ..Default::default()
        }
        .insert(&self.txn)
        .await?;
        Ok(model)
    }

    async fn insert_participant(
        &mut self,
        participant: NewParticipant,
    ) -> AppResult<participants::Model> {
        let model = participants::ActiveModel {
            sweepstake_id: Set(participant.sweepstake_id),
            user_id: Set(participant.user_id),
            name: Set(participant.name),
            avatar_url: Set(participant.avatar_url),
            entry_date: Set(participant.entry_date),
            ..Default::default()
        }
        .insert(&self.txn)
        .await?;
        Ok(model)
    }

    async fn set_participant_count(
        &mut self,
        sweepstake_id: i64,
        count: i64,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sweepstakes::Entity::update_many()
            .set(sweepstakes::ActiveModel {
                participant_count: Set(count),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(sweepstakes::Column::Id.eq(sweepstake_id))
            .exec(&self.txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Sweepstake not found".to_string()));
        }
        Ok(())
    }

    async fn set_status(
        &mut self,
        sweepstake_id: i64,
        status: SweepstakeStatus,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sweepstakes::Entity::update_many()
            .set(sweepstakes::ActiveModel {
                status: Set(status),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(sweepstakes::Column::Id.eq(sweepstake_id))
            .exec(&self.txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Sweepstake not found".to_string()));
        }
        Ok(())
    }

    async fn insert_winners(
        &mut self,
        new_winners: Vec<NewWinner>,
    ) -> AppResult<Vec<winners::Model>> {
        let mut inserted = Vec::with_capacity(new_winners.len());
        for w in new_winners {
            let model = winners::ActiveModel {
                sweepstake_id: Set(w.sweepstake_id),
                user_id: Set(w.user_id),
                position: Set(w.position),
                name: Set(w.name),
                avatar_url: Set(w.avatar_url),
                won_at: Set(w.won_at),
            }
            .insert(&self.txn)
            .await?;
            inserted.push(model);
        }
        Ok(inserted)
    }

    async fn mark_drawn(&mut self, sweepstake_id: i64, draw_date: DateTime<Utc>) -> AppResult<()> {
        // conditional on is_drawn = false, so only one draw can win
        let result = sweepstakes::Entity::update_many()
            .set(sweepstakes::ActiveModel {
                status: Set(SweepstakeStatus::DrawingComplete),
                is_drawn: Set(true),
                draw_date: Set(Some(draw_date)),
                updated_at: Set(draw_date),
                ..Default::default()
            })
            .filter(sweepstakes::Column::Id.eq(sweepstake_id))
            .filter(sweepstakes::Column::IsDrawn.eq(false))
            .exec(&self.txn)
            .await?;

        if result.rows_affected != 1 {
            log::warn!("Sweepstake {sweepstake_id} was drawn by a concurrent request");
            return Err(SweepstakeError::ConcurrencyConflict.into());
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.txn.commit().await?;
        Ok(())
    }
}
