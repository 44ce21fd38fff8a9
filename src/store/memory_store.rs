use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

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

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: BTreeMap<i64, users::Model>,
    sweepstakes: BTreeMap<i64, sweepstakes::Model>,
    participants: Vec<participants::Model>,
    winners: Vec<winners::Model>,
    point_transactions: Vec<point_transactions::Model>,
    next_user_id: i64,
    next_sweepstake_id: i64,
    next_participant_id: i64,
    next_point_transaction_id: i64,
}

fn page<T: Clone>(items: &[T], window: PageWindow) -> Vec<T> {
    items
        .iter()
        .skip(window.offset as usize)
        .take(window.limit as usize)
        .cloned()
        .collect()
}

impl MemoryState {
    fn find_user_by_email(&self, email: &str) -> Option<users::Model> {
        self.users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned()
    }

    fn participants_of(&self, sweepstake_id: i64) -> Vec<participants::Model> {
        self.participants
            .iter()
            .filter(|p| p.sweepstake_id == sweepstake_id)
            .cloned()
            .collect()
    }

    fn insert_user(&mut self, user: NewUser) -> AppResult<users::Model> {
        if self.find_user_by_email(&user.email).is_some() {
            return Err(AppError::ValidationError(
                "Email is already registered".to_string(),
            ));
        }
        self.next_user_id += 1;
        let model = users::Model {
            id: self.next_user_id,
            email: user.email,
            display_name: user.display_name,
            avatar_url: user.avatar_url,
            password_hash: user.password_hash,
            role: user.role,
            points: 0,
            lifetime_points: 0,
            created_at: user.created_at,
            updated_at: user.created_at,
        };
        self.users.insert(model.id, model.clone());
        Ok(model)
    }

    fn insert_sweepstake(&mut self, s: NewSweepstake) -> sweepstakes::Model {
        self.next_sweepstake_id += 1;
        let model = sweepstakes::Model {
            id: self.next_sweepstake_id,
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
            status: SweepstakeStatus::Upcoming,
            is_drawn: false,
            draw_date: None,
            participant_count: 0,
            created_at: s.created_at,
            updated_at: s.created_at,
        };
        self.sweepstakes.insert(model.id, model.clone());
        model
    }

    fn sweepstake_mut(&mut self, sweepstake_id: i64) -> AppResult<&mut sweepstakes::Model> {
        self.sweepstakes
            .get_mut(&sweepstake_id)
            .ok_or_else(|| AppError::NotFound("Sweepstake not found".to_string()))
    }
}

/// In-process store. Every transaction works on a private copy of the whole
/// state while holding the store lock, and swaps it in on commit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RewardsStore for MemoryStore {
    async fn get_user(&self, user_id: i64) -> AppResult<Option<users::Model>> {
        Ok(self.state.lock().await.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<users::Model>> {
        Ok(self.state.lock().await.find_user_by_email(email))
    }

    async fn get_sweepstake(&self, sweepstake_id: i64) -> AppResult<Option<sweepstakes::Model>> {
        Ok(self.state.lock().await.sweepstakes.get(&sweepstake_id).cloned())
    }

    async fn list_sweepstakes(
        &self,
        filter: SweepstakeFilter,
    ) -> AppResult<(Vec<sweepstakes::Model>, i64)> {
        let state = self.state.lock().await;
        let matching: Vec<sweepstakes::Model> = state
            .sweepstakes
            .values()
            .rev()
            .filter(|s| filter.advertiser_id.is_none_or(|a| s.advertiser_id == a))
            .cloned()
            .collect();
        let total = matching.len() as i64;
        Ok((page(&matching, filter.window), total))
    }

    async fn create_sweepstake(&self, sweepstake: NewSweepstake) -> AppResult<sweepstakes::Model> {
        Ok(self.state.lock().await.insert_sweepstake(sweepstake))
    }

    async fn list_participants(&self, sweepstake_id: i64) -> AppResult<Vec<participants::Model>> {
        Ok(self.state.lock().await.participants_of(sweepstake_id))
    }

    async fn list_winners(&self, sweepstake_id: i64) -> AppResult<Vec<winners::Model>> {
        let state = self.state.lock().await;
        let mut list: Vec<winners::Model> = state
            .winners
            .iter()
            .filter(|w| w.sweepstake_id == sweepstake_id)
            .cloned()
            .collect();
        list.sort_by_key(|w| w.position);
        Ok(list)
    }

    async fn list_point_transactions(
        &self,
        user_id: i64,
        window: PageWindow,
    ) -> AppResult<(Vec<point_transactions::Model>, i64)> {
        let state = self.state.lock().await;
        let matching: Vec<point_transactions::Model> = state
            .point_transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        let total = matching.len() as i64;
        Ok((page(&matching, window), total))
    }

    async fn begin(&self) -> AppResult<Box<dyn StoreTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, working }))
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn lock_user(&mut self, user_id: i64) -> AppResult<Option<users::Model>> {
        Ok(self.working.users.get(&user_id).cloned())
    }

    async fn lock_sweepstake(
        &mut self,
        sweepstake_id: i64,
    ) -> AppResult<Option<sweepstakes::Model>> {
        Ok(self.working.sweepstakes.get(&sweepstake_id).cloned())
    }

    async fn count_user_entries(&mut self, sweepstake_id: i64, user_id: i64) -> AppResult<i64> {
        Ok(self
            .working
            .participants
            .iter()
            .filter(|p| p.sweepstake_id == sweepstake_id && p.user_id == user_id)
            .count() as i64)
    }

    async fn list_participants(
        &mut self,
        sweepstake_id: i64,
    ) -> AppResult<Vec<participants::Model>> {
        Ok(self.working.participants_of(sweepstake_id))
    }

    async fn insert_user(&mut self, user: NewUser) -> AppResult<users::Model> {
        self.working.insert_user(user)
    }

    async fn set_points(
        &mut self,
        user_id: i64,
        points: i64,
        lifetime_points: i64,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let user = self
            .working
            .users
            .get_mut(&user_id)
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        user.points = points;
        user.lifetime_points = lifetime_points;
        user.updated_at = now;
        Ok(())
    }

    async fn record_point_transaction(
        &mut self,
        entry: NewPointTransaction,
    ) -> AppResult<point_transactions::Model> {
        self.working.next_point_transaction_id += 1;
        let model = point_transactions::Model {
            id: self.working.next_point_transaction_id,
            user_id: entry.user_id,
            kind: entry.kind,
            amount: entry.amount,
            balance_after: entry.balance_after,
            related_sweepstake_id: entry.related_sweepstake_id,
            description: entry.description,
            created_at: entry.created_at,
        };
        self.working.point_transactions.push(model.clone());
        Ok(model)
    }

    async fn insert_participant(
        &mut self,
        participant: NewParticipant,
    ) -> AppResult<participants::Model> {
        self.working.next_participant_id += 1;
        let model = participants::Model {
            id: self.working.next_participant_id,
            sweepstake_id: participant.sweepstake_id,
            user_id: participant.user_id,
            name: participant.name,
            avatar_url: participant.avatar_url,
            entry_date: participant.entry_date,
        };
        self.working.participants.push(model.clone());
        Ok(model)
    }

    async fn set_participant_count(
        &mut self,
        sweepstake_id: i64,
        count: i64,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let s = self.working.sweepstake_mut(sweepstake_id)?;
        s.participant_count = count;
        s.updated_at = now;
        Ok(())
    }

    async fn set_status(
        &mut self,
        sweepstake_id: i64,
        status: SweepstakeStatus,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let s = self.working.sweepstake_mut(sweepstake_id)?;
        s.status = status;
        s.updated_at = now;
        Ok(())
    }

    async fn insert_winners(
        &mut self,
        new_winners: Vec<NewWinner>,
    ) -> AppResult<Vec<winners::Model>> {
        let mut inserted = Vec::with_capacity(new_winners.len());
        for w in new_winners {
            let duplicate = self
                .working
                .winners
                .iter()
                .any(|existing| existing.sweepstake_id == w.sweepstake_id && existing.user_id == w.user_id);
            if duplicate {
                return Err(SweepstakeError::ConcurrencyConflict.into());
            }
            let model = winners::Model {
                sweepstake_id: w.sweepstake_id,
                user_id: w.user_id,
                position: w.position,
                name: w.name,
                avatar_url: w.avatar_url,
                won_at: w.won_at,
            };
            self.working.winners.push(model.clone());
            inserted.push(model);
        }
        Ok(inserted)
    }

    async fn mark_drawn(&mut self, sweepstake_id: i64, draw_date: DateTime<Utc>) -> AppResult<()> {
        let s = self.working.sweepstake_mut(sweepstake_id)?;
        if s.is_drawn {
            return Err(SweepstakeError::ConcurrencyConflict.into());
        }
        s.status = SweepstakeStatus::DrawingComplete;
        s.is_drawn = true;
        s.draw_date = Some(draw_date);
        s.updated_at = draw_date;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRole;
    use chrono::Duration;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            display_name: "Ana".to_string(),
            avatar_url: None,
            password_hash: "hash".to_string(),
            role: UserRole::User,
            created_at: Utc::now(),
        }
    }

    fn new_sweepstake(advertiser_id: i64) -> NewSweepstake {
        let now = Utc::now();
        NewSweepstake {
            advertiser_id,
            title: "Coffee for a year".to_string(),
            description: "Daily coffee".to_string(),
            prize_details: "365 vouchers".to_string(),
            image_url: None,
            start_date: now,
            end_date: now + Duration::days(7),
            points_to_enter: 10,
            number_of_winners: 1,
            max_participants: None,
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_writes() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let user = tx.insert_user(new_user("ana@example.com")).await.unwrap();
        tx.set_points(user.id, 40, 40, Utc::now()).await.unwrap();
        tx.commit().await.unwrap();

        let stored = store.get_user(user.id).await.unwrap().unwrap();
        assert_eq!(stored.points, 40);
    }

    #[tokio::test]
    async fn test_dropped_transaction_rolls_back() {
        let store = MemoryStore::new();
        let s = store.create_sweepstake(new_sweepstake(1)).await.unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_user(new_user("ana@example.com")).await.unwrap();
            tx.set_participant_count(s.id, 5, Utc::now()).await.unwrap();
            tx.mark_drawn(s.id, Utc::now()).await.unwrap();
            // dropped without commit
        }

        assert!(store.find_user_by_email("ana@example.com").await.unwrap().is_none());
        let stored = store.get_sweepstake(s.id).await.unwrap().unwrap();
        assert_eq!(stored.participant_count, 0);
        assert!(!stored.is_drawn);
        assert_eq!(stored.status, SweepstakeStatus::Upcoming);
    }

    #[tokio::test]
    async fn test_mark_drawn_twice_conflicts() {
        let store = MemoryStore::new();
        let s = store.create_sweepstake(new_sweepstake(1)).await.unwrap();
        let mut tx = store.begin().await.unwrap();
        tx.mark_drawn(s.id, Utc::now()).await.unwrap();
        let err = tx.mark_drawn(s.id, Utc::now()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Sweepstake(SweepstakeError::ConcurrencyConflict)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_case_insensitive() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.insert_user(new_user("ana@example.com")).await.unwrap();
        assert!(tx.insert_user(new_user("ANA@example.com")).await.is_err());
    }

    #[tokio::test]
    async fn test_list_sweepstakes_newest_first_with_filter() {
        let store = MemoryStore::new();
        store.create_sweepstake(new_sweepstake(1)).await.unwrap();
        store.create_sweepstake(new_sweepstake(2)).await.unwrap();
        let third = store.create_sweepstake(new_sweepstake(1)).await.unwrap();

        let (all, total) = store
            .list_sweepstakes(SweepstakeFilter {
                advertiser_id: None,
                window: PageWindow { offset: 0, limit: 2 },
            })
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, third.id);

        let (mine, total) = store
            .list_sweepstakes(SweepstakeFilter {
                advertiser_id: Some(1),
                window: PageWindow { offset: 0, limit: 20 },
            })
            .await
            .unwrap();
        assert_eq!(total, 2);
        assert!(mine.iter().all(|s| s.advertiser_id == 1));
    }
}
