use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{PointTransactionKind, SweepstakeStatus, UserRole};
use crate::handlers;
use crate::models::*;
use crate::utils::LevelInfo;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::user::get_profile,
        handlers::user::get_points,
        handlers::user::get_points_history,
        handlers::sweepstake::list_sweepstakes,
        handlers::sweepstake::create_sweepstake,
        handlers::sweepstake::get_sweepstake,
        handlers::sweepstake::enter_sweepstake,
        handlers::sweepstake::draw_sweepstake,
        handlers::sweepstake::end_sweepstake,
        handlers::sweepstake::cancel_sweepstake,
        handlers::sweepstake::get_participants,
        handlers::sweepstake::get_winners,
        handlers::admin::adjust_points,
    ),
    components(
        schemas(
            UserRole,
            AccountType,
            RegisterRequest,
            LoginRequest,
            RefreshTokenRequest,
            UserResponse,
            AuthResponse,
            UserProfileResponse,
            LevelInfo,
            PointTransactionKind,
            PointBalanceResponse,
            PointTransactionResponse,
            AdjustPointsRequest,
            SweepstakeStatus,
            CreateSweepstakeRequest,
            SweepstakeResponse,
            ParticipantResponse,
            WinnerResponse,
            CancelSweepstakeResponse,
            ApiError,
            ApiErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Sign up, sign in and token refresh"),
        (name = "user", description = "Profile and points ledger"),
        (name = "sweepstakes", description = "Sweepstake lifecycle, entries and draws"),
        (name = "admin", description = "Operator tools"),
    ),
    info(
        title = "Ofertivo Rewards API",
        version = "0.1.0",
        description = "Points ledger and sweepstakes REST API"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_sweepstake_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/sweepstakes/{id}/enter"));
        assert!(doc.paths.paths.contains_key("/admin/users/{user_id}/points"));
    }
}
