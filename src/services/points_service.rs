use std::sync::Arc;

use chrono::Utc;

use crate::entities::{PointTransactionKind, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{
    PaginatedResponse, PaginationParams, PointBalanceResponse, PointHistoryQuery,
    PointTransactionResponse,
};
use crate::store::{NewPointTransaction, RewardsStore, StoreTransaction};

/// Points ledger: balances plus one history row per change
#[derive(Clone)]
pub struct PointsService {
    store: Arc<dyn RewardsStore>,
}

impl PointsService {
    pub fn new(store: Arc<dyn RewardsStore>) -> Self {
        Self { store }
    }

    pub async fn get_balance(&self, user_id: i64) -> AppResult<PointBalanceResponse> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        Ok(PointBalanceResponse {
            user_id: user.id,
            points: user.points,
        })
    }

    /// Apply a signed delta in its own transaction and return the new balance.
    /// A debit larger than the balance fails with `InsufficientFunds`.
    pub async fn adjust_balance(
        &self,
        user_id: i64,
        delta: i64,
        kind: PointTransactionKind,
        description: Option<String>,
    ) -> AppResult<i64> {
        if delta == 0 {
            return Err(AppError::ValidationError(
                "Adjustment must not be zero".to_string(),
            ));
        }

        let mut tx = self.store.begin().await?;
        let user = tx
            .lock_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let updated = Self::apply_delta(tx.as_mut(), &user, delta, kind, None, description).await?;
        tx.commit().await?;

        log::info!(
            "Points adjusted: user={} delta={} kind={} balance={}",
            user_id,
            delta,
            kind,
            updated.points
        );
        Ok(updated.points)
    }

    /// Check-and-write on a caller's open transaction, so the balance change
    /// commits (or rolls back) together with whatever else the caller writes.
    ///
    /// `user` must have been read through `lock_user` on the same transaction.
    pub async fn apply_delta(
        tx: &mut dyn StoreTransaction,
        user: &users::Model,
        delta: i64,
        kind: PointTransactionKind,
        related_sweepstake_id: Option<i64>,
        description: Option<String>,
    ) -> AppResult<users::Model> {
        let points = user.points.checked_add(delta).ok_or_else(|| {
            AppError::ValidationError("Point adjustment is out of range".to_string())
        })?;
        if points < 0 {
            return Err(AppError::InsufficientFunds {
                balance: user.points,
                delta,
            });
        }
        let lifetime_points = if delta > 0 && kind.counts_toward_level() {
            user.lifetime_points.checked_add(delta).ok_or_else(|| {
                AppError::ValidationError("Point adjustment is out of range".to_string())
            })?
        } else {
            user.lifetime_points
        };

        let now = Utc::now();
        tx.set_points(user.id, points, lifetime_points, now).await?;
        tx.record_point_transaction(NewPointTransaction {
            user_id: user.id,
            kind,
            amount: delta,
            balance_after: points,
            related_sweepstake_id,
            description,
            created_at: now,
        })
        .await?;

        Ok(users::Model {
            points,
            lifetime_points,
            updated_at: now,
            ..user.clone()
        })
    }

    pub async fn history(
        &self,
        user_id: i64,
        query: &PointHistoryQuery,
    ) -> AppResult<PaginatedResponse<PointTransactionResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let (rows, total) = self
            .store
            .list_point_transactions(user_id, params.window())
            .await?;
        let items = rows.into_iter().map(Into::into).collect();
        Ok(PaginatedResponse::new(items, &params, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserRole;
    use crate::store::{MemoryStore, NewUser};

    async fn seed_user(store: &Arc<dyn RewardsStore>, points: i64) -> i64 {
        let mut tx = store.begin().await.unwrap();
        let user = tx
            .insert_user(NewUser {
                email: "ledger@example.com".to_string(),
                display_name: "Ledger".to_string(),
                avatar_url: None,
                password_hash: "x".to_string(),
                role: UserRole::User,
                created_at: Utc::now(),
            })
            .await
            .unwrap();
        if points > 0 {
            PointsService::apply_delta(
                tx.as_mut(),
                &user,
                points,
                PointTransactionKind::WelcomeBonus,
                None,
                None,
            )
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();
        user.id
    }

    fn service() -> (PointsService, Arc<dyn RewardsStore>) {
        let store: Arc<dyn RewardsStore> = Arc::new(MemoryStore::new());
        (PointsService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_adjust_balance_credit_and_debit() {
        let (svc, store) = service();
        let user_id = seed_user(&store, 100).await;

        let balance = svc
            .adjust_balance(user_id, 50, PointTransactionKind::AdminAdjustment, None)
            .await
            .unwrap();
        assert_eq!(balance, 150);

        let balance = svc
            .adjust_balance(user_id, -150, PointTransactionKind::AdminAdjustment, None)
            .await
            .unwrap();
        assert_eq!(balance, 0);
        assert_eq!(svc.get_balance(user_id).await.unwrap().points, 0);
    }

    #[tokio::test]
    async fn test_overdraw_rejected_and_balance_kept() {
        let (svc, store) = service();
        let user_id = seed_user(&store, 30).await;

        let err = svc
            .adjust_balance(user_id, -31, PointTransactionKind::AdminAdjustment, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientFunds {
                balance: 30,
                delta: -31
            }
        ));
        assert_eq!(svc.get_balance(user_id).await.unwrap().points, 30);

        let history = svc
            .history(user_id, &PointHistoryQuery::default())
            .await
            .unwrap();
        assert_eq!(history.total, 1);
    }

    #[tokio::test]
    async fn test_out_of_range_credit_rejected_and_balance_kept() {
        let (svc, store) = service();
        let user_id = seed_user(&store, 100).await;

        let err = svc
            .adjust_balance(user_id, i64::MAX, PointTransactionKind::AdminAdjustment, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let balance = svc.get_balance(user_id).await.unwrap();
        assert_eq!(balance.points, 100);
        let user = store.get_user(user_id).await.unwrap().unwrap();
        assert_eq!(user.lifetime_points, 100);

        let history = svc
            .history(user_id, &PointHistoryQuery::default())
            .await
            .unwrap();
        assert_eq!(history.total, 1);
    }

    #[tokio::test]
    async fn test_only_earned_credits_raise_lifetime_points() {
        let (svc, store) = service();
        let user_id = seed_user(&store, 100).await;

        svc.adjust_balance(user_id, -40, PointTransactionKind::SweepstakeEntry, None)
            .await
            .unwrap();
        svc.adjust_balance(user_id, 40, PointTransactionKind::SweepstakeRefund, None)
            .await
            .unwrap();
        svc.adjust_balance(user_id, 25, PointTransactionKind::AdminAdjustment, None)
            .await
            .unwrap();

        let user = store.get_user(user_id).await.unwrap().unwrap();
        assert_eq!(user.points, 125);
        assert_eq!(user.lifetime_points, 125);
    }

    #[tokio::test]
    async fn test_history_is_newest_first_with_running_balance() {
        let (svc, store) = service();
        let user_id = seed_user(&store, 100).await;
        svc.adjust_balance(
            user_id,
            -20,
            PointTransactionKind::AdminAdjustment,
            Some("correction".to_string()),
        )
        .await
        .unwrap();

        let page = svc
            .history(user_id, &PointHistoryQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.data[0].amount, -20);
        assert_eq!(page.data[0].balance_after, 80);
        assert_eq!(page.data[0].description.as_deref(), Some("correction"));
        assert_eq!(page.data[1].kind, PointTransactionKind::WelcomeBonus);
        assert_eq!(page.data[1].balance_after, 100);
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let (svc, _) = service();
        assert!(matches!(
            svc.get_balance(404).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            svc.adjust_balance(404, 5, PointTransactionKind::AdminAdjustment, None)
                .await,
            Err(AppError::NotFound(_))
        ));
    }
}
