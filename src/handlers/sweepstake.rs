use crate::handlers::{auth_user, require_auth};
use crate::models::*;
use crate::services::SweepstakeService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/sweepstakes",
    tag = "sweepstakes",
    params(SweepstakeQuery),
    responses(
        (status = 200, description = "Sweepstakes, newest first, with their current status")
    )
)]
pub async fn list_sweepstakes(
    sweepstake_service: web::Data<SweepstakeService>,
    query: web::Query<SweepstakeQuery>,
) -> Result<HttpResponse> {
    match sweepstake_service.list_sweepstakes(&query, Utc::now()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": page
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/sweepstakes",
    tag = "sweepstakes",
    request_body = CreateSweepstakeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Sweepstake created", body = SweepstakeResponse),
        (status = 400, description = "Invalid dates or limits", body = ApiErrorResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorResponse),
        (status = 403, description = "Advertisers and admins only", body = ApiErrorResponse)
    )
)]
pub async fn create_sweepstake(
    sweepstake_service: web::Data<SweepstakeService>,
    req: HttpRequest,
    request: web::Json<CreateSweepstakeRequest>,
) -> Result<HttpResponse> {
    let caller = match require_auth(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };

    match sweepstake_service
        .create_sweepstake(&caller, request.into_inner(), Utc::now())
        .await
    {
        Ok(created) => Ok(HttpResponse::Created().json(json!({
            "success": true,
            "data": created
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/sweepstakes/{id}",
    tag = "sweepstakes",
    params(
        ("id" = i64, Path, description = "Sweepstake id")
    ),
    responses(
        (status = 200, description = "Sweepstake with its current status", body = SweepstakeResponse),
        (status = 404, description = "Not found", body = ApiErrorResponse)
    )
)]
pub async fn get_sweepstake(
    sweepstake_service: web::Data<SweepstakeService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match sweepstake_service
        .get_sweepstake(path.into_inner(), Utc::now())
        .await
    {
        Ok(sweepstake) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": sweepstake
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/sweepstakes/{id}/enter",
    tag = "sweepstakes",
    params(
        ("id" = i64, Path, description = "Sweepstake id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Entry recorded, points deducted", body = ParticipantResponse),
        (status = 400, description = "Not eligible (points, dates, status, capacity)", body = ApiErrorResponse),
        (status = 401, description = "Sign in required", body = ApiErrorResponse),
        (status = 409, description = "Already entered", body = ApiErrorResponse)
    )
)]
pub async fn enter_sweepstake(
    sweepstake_service: web::Data<SweepstakeService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match sweepstake_service
        .enter_sweepstake(path.into_inner(), auth_user(&req), Utc::now())
        .await
    {
        Ok(participant) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": participant
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/sweepstakes/{id}/draw",
    tag = "sweepstakes",
    params(
        ("id" = i64, Path, description = "Sweepstake id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Winners in draw order", body = [WinnerResponse]),
        (status = 400, description = "Not ended, cancelled, or no participants", body = ApiErrorResponse),
        (status = 403, description = "Owner or admin only", body = ApiErrorResponse),
        (status = 409, description = "Already drawn", body = ApiErrorResponse)
    )
)]
pub async fn draw_sweepstake(
    sweepstake_service: web::Data<SweepstakeService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let caller = match require_auth(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };

    match sweepstake_service
        .draw_sweepstake(path.into_inner(), &caller, Utc::now())
        .await
    {
        Ok(winners) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": winners
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/sweepstakes/{id}/end",
    tag = "sweepstakes",
    params(
        ("id" = i64, Path, description = "Sweepstake id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Entries closed", body = SweepstakeResponse),
        (status = 400, description = "Not active", body = ApiErrorResponse),
        (status = 403, description = "Owner or admin only", body = ApiErrorResponse)
    )
)]
pub async fn end_sweepstake(
    sweepstake_service: web::Data<SweepstakeService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let caller = match require_auth(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };

    match sweepstake_service
        .end_sweepstake_early(path.into_inner(), &caller, Utc::now())
        .await
    {
        Ok(sweepstake) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": sweepstake
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/sweepstakes/{id}/cancel",
    tag = "sweepstakes",
    params(
        ("id" = i64, Path, description = "Sweepstake id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Cancelled, entry costs refunded", body = CancelSweepstakeResponse),
        (status = 400, description = "Already drawn or cancelled", body = ApiErrorResponse),
        (status = 403, description = "Owner or admin only", body = ApiErrorResponse)
    )
)]
pub async fn cancel_sweepstake(
    sweepstake_service: web::Data<SweepstakeService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let caller = match require_auth(&req) {
        Ok(caller) => caller,
        Err(e) => return Ok(e.error_response()),
    };

    match sweepstake_service
        .cancel_sweepstake(path.into_inner(), &caller, Utc::now())
        .await
    {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": result
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/sweepstakes/{id}/participants",
    tag = "sweepstakes",
    params(
        ("id" = i64, Path, description = "Sweepstake id")
    ),
    responses(
        (status = 200, description = "Entries in entry order", body = [ParticipantResponse]),
        (status = 404, description = "Not found", body = ApiErrorResponse)
    )
)]
pub async fn get_participants(
    sweepstake_service: web::Data<SweepstakeService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match sweepstake_service.get_participants(path.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/sweepstakes/{id}/winners",
    tag = "sweepstakes",
    params(
        ("id" = i64, Path, description = "Sweepstake id")
    ),
    responses(
        (status = 200, description = "Winners in draw order, empty before the draw", body = [WinnerResponse]),
        (status = 404, description = "Not found", body = ApiErrorResponse)
    )
)]
pub async fn get_winners(
    sweepstake_service: web::Data<SweepstakeService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match sweepstake_service.get_winners(path.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": list
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn sweepstake_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/sweepstakes")
            .route("", web::get().to(list_sweepstakes))
            .route("", web::post().to(create_sweepstake))
            .route("/{id}", web::get().to(get_sweepstake))
            .route("/{id}/enter", web::post().to(enter_sweepstake))
            .route("/{id}/draw", web::post().to(draw_sweepstake))
            .route("/{id}/end", web::post().to(end_sweepstake))
            .route("/{id}/cancel", web::post().to(cancel_sweepstake))
            .route("/{id}/participants", web::get().to(get_participants))
            .route("/{id}/winners", web::get().to(get_winners)),
    );
}
