use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{PointTransactionKind, point_transaction_entity as point_transactions};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointBalanceResponse {
    pub user_id: i64,
    pub points: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointTransactionResponse {
    pub id: i64,
    pub kind: PointTransactionKind,
    /// Signed change applied to the balance
    pub amount: i64,
    pub balance_after: i64,
    pub related_sweepstake_id: Option<i64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<point_transactions::Model> for PointTransactionResponse {
    fn from(row: point_transactions::Model) -> Self {
        Self {
            id: row.id,
            kind: row.kind,
            amount: row.amount,
            balance_after: row.balance_after,
            related_sweepstake_id: row.related_sweepstake_id,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PointHistoryQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdjustPointsRequest {
    /// Positive credits, negative debits
    #[schema(example = 250)]
    pub delta: i64,
    #[schema(example = "Goodwill credit")]
    pub reason: Option<String>,
}
