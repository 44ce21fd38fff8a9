use crate::entities::PointTransactionKind;
use crate::error::AppError;
use crate::handlers::require_auth;
use crate::models::*;
use crate::services::PointsService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/admin/users/{user_id}/points",
    tag = "admin",
    params(
        ("user_id" = i64, Path, description = "User to credit or debit")
    ),
    request_body = AdjustPointsRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Balance adjusted", body = PointBalanceResponse),
        (status = 400, description = "Debit exceeds balance", body = ApiErrorResponse),
        (status = 403, description = "Admins only", body = ApiErrorResponse),
        (status = 404, description = "User not found", body = ApiErrorResponse)
    )
)]
pub async fn adjust_points(
    points_service: web::Data<PointsService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<AdjustPointsRequest>,
) -> Result<HttpResponse> {
    let caller = match require_auth(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };
    if !caller.is_admin() {
        return Ok(AppError::Forbidden.error_response());
    }

    let user_id = path.into_inner();
    let AdjustPointsRequest { delta, reason } = request.into_inner();
    match points_service
        .adjust_balance(user_id, delta, PointTransactionKind::AdminAdjustment, reason)
        .await
    {
        Ok(points) => {
            let balance = PointBalanceResponse { user_id, points };
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": balance
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin").route("/users/{user_id}/points", web::post().to(adjust_points)),
    );
}
