use crate::handlers::require_auth;
use crate::models::*;
use crate::services::{PointsService, UserService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/user/profile",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Profile with points and level", body = UserProfileResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 404, description = "User not found", body = ApiErrorResponse)
    )
)]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let caller = match require_auth(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };

    match user_service.get_user_profile(caller.user_id).await {
        Ok(profile) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": profile
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user/points",
    tag = "user",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current points balance", body = PointBalanceResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse)
    )
)]
pub async fn get_points(
    points_service: web::Data<PointsService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let caller = match require_auth(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };

    match points_service.get_balance(caller.user_id).await {
        Ok(balance) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": balance
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/user/points/history",
    tag = "user",
    params(PointHistoryQuery),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Ledger rows, newest first"),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse)
    )
)]
pub async fn get_points_history(
    points_service: web::Data<PointsService>,
    req: HttpRequest,
    query: web::Query<PointHistoryQuery>,
) -> Result<HttpResponse> {
    let caller = match require_auth(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };

    match points_service.history(caller.user_id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn user_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/user")
            .route("/profile", web::get().to(get_profile))
            .route("/points", web::get().to(get_points))
            .route("/points/history", web::get().to(get_points_history)),
    );
}
