use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::SweepstakesConfig;
use crate::entities::{
    PointTransactionKind, SweepstakeStatus, UserRole, sweepstake_entity as sweepstakes,
};
use crate::error::{AppError, AppResult, SweepstakeError};
use crate::models::{
    AuthUser, CancelSweepstakeResponse, CreateSweepstakeRequest, PaginatedResponse,
    PaginationParams, ParticipantResponse, SweepstakeQuery, SweepstakeResponse, WinnerResponse,
};
use crate::services::PointsService;
use crate::services::draw_engine::select_winners;
use crate::services::sweepstake_lifecycle::{
    check_draw, check_end_early, check_entry, derive_effective_status, ensure_transition,
};
use crate::store::{
    NewParticipant, NewSweepstake, NewWinner, RewardsStore, StoreTransaction, SweepstakeFilter,
};

const MAX_TITLE_LEN: usize = 200;
const MAX_ENTRY_COST: i64 = 1_000_000;

#[derive(Clone)]
pub struct SweepstakeService {
    store: Arc<dyn RewardsStore>,
    config: SweepstakesConfig,
}

fn not_found() -> AppError {
    AppError::NotFound("Sweepstake not found".to_string())
}

fn respond(s: sweepstakes::Model, now: DateTime<Utc>) -> SweepstakeResponse {
    let status = derive_effective_status(&s, now);
    SweepstakeResponse::new(s, status)
}

impl SweepstakeService {
    pub fn new(store: Arc<dyn RewardsStore>, config: SweepstakesConfig) -> Self {
        Self { store, config }
    }

    /// Publish a new sweepstake. Stored as `upcoming`; callers see the status
    /// its dates imply.
    pub async fn create_sweepstake(
        &self,
        caller: &AuthUser,
        request: CreateSweepstakeRequest,
        now: DateTime<Utc>,
    ) -> AppResult<SweepstakeResponse> {
        let advertiser_id = match (caller.role, request.advertiser_id) {
            (UserRole::User, _) => return Err(AppError::Forbidden),
            (UserRole::Advertiser, Some(id)) if id != caller.user_id => {
                return Err(AppError::Forbidden);
            }
            (UserRole::Advertiser, _) | (UserRole::Admin, None) => caller.user_id,
            (UserRole::Admin, Some(id)) => {
                let owner = self
                    .store
                    .get_user(id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("Advertiser not found".to_string()))?;
                if owner.role != UserRole::Advertiser {
                    return Err(AppError::ValidationError(
                        "Sweepstakes can only be owned by advertisers".to_string(),
                    ));
                }
                owner.id
            }
        };

        validate_create(&request)?;

        let created = self
            .store
            .create_sweepstake(NewSweepstake {
                advertiser_id,
                title: request.title.trim().to_string(),
                description: request.description,
                prize_details: request.prize_details,
                image_url: request.image_url,
                start_date: request.start_date,
                end_date: request.end_date,
                points_to_enter: request.points_to_enter,
                number_of_winners: request.number_of_winners,
                max_participants: request.max_participants,
                created_at: now,
            })
            .await?;

        log::info!(
            "Sweepstake created: id={} advertiser={} start={} end={}",
            created.id,
            advertiser_id,
            created.start_date,
            created.end_date
        );
        Ok(respond(created, now))
    }

    pub async fn get_sweepstake(
        &self,
        sweepstake_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<SweepstakeResponse> {
        let s = self
            .store
            .get_sweepstake(sweepstake_id)
            .await?
            .ok_or_else(not_found)?;
        Ok(respond(s, now))
    }

    pub async fn list_sweepstakes(
        &self,
        query: &SweepstakeQuery,
        now: DateTime<Utc>,
    ) -> AppResult<PaginatedResponse<SweepstakeResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let (rows, total) = self
            .store
            .list_sweepstakes(SweepstakeFilter {
                advertiser_id: query.advertiser_id,
                window: params.window(),
            })
            .await?;
        let items = rows.into_iter().map(|s| respond(s, now)).collect();
        Ok(PaginatedResponse::new(items, &params, total))
    }

    /// Enter a sweepstake, spending its entry cost.
    ///
    /// 1. Reject anonymous callers
    /// 2. Lock the sweepstake row, then the user row
    /// 3. Run the eligibility checks against the locked rows
    /// 4. Debit the entry cost, record the participant, bump the counter
    /// 5. Commit; any failure before this leaves nothing behind
    pub async fn enter_sweepstake(
        &self,
        sweepstake_id: i64,
        caller: Option<AuthUser>,
        now: DateTime<Utc>,
    ) -> AppResult<ParticipantResponse> {
        let caller = caller.ok_or(SweepstakeError::AuthenticationRequired)?;

        let mut tx = self.store.begin().await?;
        let s = tx
            .lock_sweepstake(sweepstake_id)
            .await?
            .ok_or_else(not_found)?;
        let user = tx
            .lock_user(caller.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        check_entry(&s, user.points, now)?;

        if let Some(max) = s.max_participants
            && s.participant_count >= i64::from(max)
        {
            return Err(SweepstakeError::SweepstakeFull.into());
        }
        if !self.config.allow_multiple_entries
            && tx.count_user_entries(s.id, user.id).await? > 0
        {
            return Err(SweepstakeError::AlreadyEntered.into());
        }

        if s.points_to_enter > 0 {
            PointsService::apply_delta(
                tx.as_mut(),
                &user,
                -s.points_to_enter,
                PointTransactionKind::SweepstakeEntry,
                Some(s.id),
                Some(format!("Entry: {}", s.title)),
            )
            .await?;
        }

        let participant = tx
            .insert_participant(NewParticipant {
                sweepstake_id: s.id,
                user_id: user.id,
                name: user.display_name.clone(),
                avatar_url: user.avatar_url.clone(),
                entry_date: now,
            })
            .await?;
        tx.set_participant_count(s.id, s.participant_count + 1, now)
            .await?;
        tx.commit().await?;

        log::info!(
            "Sweepstake entry: sweepstake={} user={} cost={} participants={}",
            s.id,
            user.id,
            s.points_to_enter,
            s.participant_count + 1
        );
        Ok(participant.into())
    }

    /// Draw winners once the sweepstake has ended. Winners and the
    /// `drawing_complete` flip are written in one transaction.
    pub async fn draw_sweepstake(
        &self,
        sweepstake_id: i64,
        caller: &AuthUser,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<WinnerResponse>> {
        let mut tx = self.store.begin().await?;
        let s = self.lock_managed(tx.as_mut(), sweepstake_id, caller).await?;

        check_draw(&s, now)?;

        let pool = tx.list_participants(s.id).await?;
        if pool.is_empty() {
            return Err(SweepstakeError::NoParticipants.into());
        }

        let picked = {
            let mut rng = StdRng::from_entropy();
            select_winners(&pool, s.number_of_winners.max(0) as usize, &mut rng)
        };

        tx.mark_drawn(s.id, now).await?;
        let winners = tx
            .insert_winners(
                picked
                    .into_iter()
                    .enumerate()
                    .map(|(i, p)| NewWinner {
                        sweepstake_id: s.id,
                        user_id: p.user_id,
                        position: i as i32 + 1,
                        name: p.name,
                        avatar_url: p.avatar_url,
                        won_at: now,
                    })
                    .collect(),
            )
            .await?;
        tx.commit().await?;

        log::info!(
            "Sweepstake drawn: id={} participants={} winners={}",
            s.id,
            pool.len(),
            winners.len()
        );
        Ok(winners.into_iter().map(Into::into).collect())
    }

    /// Close entries before the scheduled end date
    pub async fn end_sweepstake_early(
        &self,
        sweepstake_id: i64,
        caller: &AuthUser,
        now: DateTime<Utc>,
    ) -> AppResult<SweepstakeResponse> {
        let mut tx = self.store.begin().await?;
        let s = self.lock_managed(tx.as_mut(), sweepstake_id, caller).await?;

        check_end_early(&s, now)?;
        tx.set_status(s.id, SweepstakeStatus::Ended, now).await?;
        tx.commit().await?;

        log::info!("Sweepstake ended early: id={} by user={}", s.id, caller.user_id);
        Ok(SweepstakeResponse::new(
            sweepstakes::Model {
                status: SweepstakeStatus::Ended,
                updated_at: now,
                ..s
            },
            SweepstakeStatus::Ended,
        ))
    }

    /// Cancel before the draw and give every participant their entry cost back
    pub async fn cancel_sweepstake(
        &self,
        sweepstake_id: i64,
        caller: &AuthUser,
        now: DateTime<Utc>,
    ) -> AppResult<CancelSweepstakeResponse> {
        let mut tx = self.store.begin().await?;
        let s = self.lock_managed(tx.as_mut(), sweepstake_id, caller).await?;

        ensure_transition(derive_effective_status(&s, now), SweepstakeStatus::Cancelled)?;

        let entries = tx.list_participants(s.id).await?;
        let mut refunded_points: i64 = 0;
        if s.points_to_enter > 0 {
            // ascending user id keeps the lock order stable across requests
            let mut tickets: BTreeMap<i64, i64> = BTreeMap::new();
            for entry in &entries {
                *tickets.entry(entry.user_id).or_default() += 1;
            }
            for (user_id, count) in tickets {
                let Some(user) = tx.lock_user(user_id).await? else {
                    log::warn!("Refund skipped, user {user_id} no longer exists");
                    continue;
                };
                let amount = s.points_to_enter.checked_mul(count).ok_or_else(|| {
                    AppError::InternalError(format!("Refund for user {user_id} is out of range"))
                })?;
                PointsService::apply_delta(
                    tx.as_mut(),
                    &user,
                    amount,
                    PointTransactionKind::SweepstakeRefund,
                    Some(s.id),
                    Some(format!("Refund: {} cancelled", s.title)),
                )
                .await?;
                refunded_points = refunded_points.saturating_add(amount);
            }
        }

        tx.set_status(s.id, SweepstakeStatus::Cancelled, now).await?;
        tx.commit().await?;

        log::info!(
            "Sweepstake cancelled: id={} refunded_entries={} refunded_points={}",
            s.id,
            entries.len(),
            refunded_points
        );
        Ok(CancelSweepstakeResponse {
            sweepstake: SweepstakeResponse::new(
                sweepstakes::Model {
                    status: SweepstakeStatus::Cancelled,
                    updated_at: now,
                    ..s
                },
                SweepstakeStatus::Cancelled,
            ),
            refunded_entries: entries.len(),
            refunded_points,
        })
    }

    pub async fn get_participants(&self, sweepstake_id: i64) -> AppResult<Vec<ParticipantResponse>> {
        self.store
            .get_sweepstake(sweepstake_id)
            .await?
            .ok_or_else(not_found)?;
        let list = self.store.list_participants(sweepstake_id).await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    pub async fn get_winners(&self, sweepstake_id: i64) -> AppResult<Vec<WinnerResponse>> {
        self.store
            .get_sweepstake(sweepstake_id)
            .await?
            .ok_or_else(not_found)?;
        let list = self.store.list_winners(sweepstake_id).await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    async fn lock_managed(
        &self,
        tx: &mut dyn StoreTransaction,
        sweepstake_id: i64,
        caller: &AuthUser,
    ) -> AppResult<sweepstakes::Model> {
        let s = tx
            .lock_sweepstake(sweepstake_id)
            .await?
            .ok_or_else(not_found)?;
        if !caller.can_manage(s.advertiser_id) {
            return Err(AppError::Forbidden);
        }
        Ok(s)
    }
}

fn validate_create(request: &CreateSweepstakeRequest) -> AppResult<()> {
    let title = request.title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::ValidationError(format!(
            "Title must be between 1 and {MAX_TITLE_LEN} characters"
        )));
    }
    if request.end_date < request.start_date {
        return Err(AppError::ValidationError(
            "End date must not be before start date".to_string(),
        ));
    }
    if !(0..=MAX_ENTRY_COST).contains(&request.points_to_enter) {
        return Err(AppError::ValidationError(format!(
            "Entry cost must be between 0 and {MAX_ENTRY_COST} points"
        )));
    }
    if request.number_of_winners < 1 {
        return Err(AppError::ValidationError(
            "At least one winner is required".to_string(),
        ));
    }
    if let Some(max) = request.max_participants
        && max < 1
    {
        return Err(AppError::ValidationError(
            "Participant limit must be at least 1".to_string(),
        ));
    }
    Ok(())
}
