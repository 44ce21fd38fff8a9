use std::sync::Arc;

use actix_web::dev::Service;
use actix_web::http::StatusCode;
use actix_web::{App, ResponseError, test};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use ofertivo_backend::{
    AppServices, Config, middlewares::AuthMiddleware, store::MemoryStore, utils::JwtService,
};

const CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 0

[database]
url = "memory://"
max_connections = 1

[jwt]
secret = "integration-secret"
access_token_expires_in = 600
refresh_token_expires_in = 3600
"#;

macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

macro_rules! register {
    ($app:expr, $email:expr, $account_type:expr) => {{
        let (status, body) = call!(
            $app,
            test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(json!({
                    "email": $email,
                    "password": "Password123",
                    "display_name": $email.split('@').next().unwrap(),
                    "account_type": $account_type,
                }))
        );
        assert_eq!(status, StatusCode::OK, "register failed: {body}");
        body["data"]["access_token"].as_str().unwrap().to_string()
    }};
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

#[actix_web::test]
async fn test_sweepstake_flow_over_http() {
    let config = Config::from_toml_str(CONFIG).unwrap();
    let jwt = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );
    let services = AppServices::new(Arc::new(MemoryStore::new()), &config, jwt.clone());
    let app = test::init_service(
        App::new()
            .wrap(AuthMiddleware::new(jwt))
            .configure(|cfg| services.configure(cfg)),
    )
    .await;

    let shop = register!(app, "shop@example.com", "advertiser");
    let ana = register!(app, "ana@example.com", "user");

    // publish a sweepstake that is already open
    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/sweepstakes")
            .insert_header(bearer(&shop))
            .set_json(json!({
                "title": "Coffee for a year",
                "description": "One coffee a day",
                "prize_details": "365 vouchers",
                "start_date": (Utc::now() - Duration::minutes(5)).to_rfc3339(),
                "end_date": (Utc::now() + Duration::hours(1)).to_rfc3339(),
                "points_to_enter": 60,
                "number_of_winners": 1,
            }))
    );
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "active");
    let id = body["data"]["id"].as_i64().unwrap();

    // anonymous browsing works, anonymous entry does not
    let (status, body) = call!(app, test::TestRequest::get().uri("/api/v1/sweepstakes"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 1);

    let (status, body) = call!(
        app,
        test::TestRequest::post().uri(&format!("/api/v1/sweepstakes/{id}/enter"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTHENTICATION_REQUIRED");

    // welcome bonus (100) covers one entry
    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/sweepstakes/{id}/enter"))
            .insert_header(bearer(&ana))
    );
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/sweepstakes/{id}/enter"))
            .insert_header(bearer(&ana))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_POINTS");

    let (_, body) = call!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/user/points")
            .insert_header(bearer(&ana))
    );
    assert_eq!(body["data"]["points"], 40);

    let (_, body) = call!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/user/points/history")
            .insert_header(bearer(&ana))
    );
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["data"][0]["kind"], "sweepstake_entry");

    // only the owner may run the draw, and only once entries are closed
    let (status, _) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/sweepstakes/{id}/draw"))
            .insert_header(bearer(&ana))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/sweepstakes/{id}/draw"))
            .insert_header(bearer(&shop))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "SWEEPSTAKE_NOT_ENDED");

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/sweepstakes/{id}/end"))
            .insert_header(bearer(&shop))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "ended");

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/sweepstakes/{id}/draw"))
            .insert_header(bearer(&shop))
    );
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "ana");

    let (status, body) = call!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/sweepstakes/{id}/draw"))
            .insert_header(bearer(&shop))
    );
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "ALREADY_DRAWN");

    let (_, body) = call!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/sweepstakes/{id}/winners"))
    );
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = call!(app, test::TestRequest::get().uri(&format!("/api/v1/sweepstakes/{id}")));
    assert_eq!(body["data"]["status"], "drawing_complete");
    assert_eq!(body["data"]["participant_count"], 1);
}

#[actix_web::test]
async fn test_protected_routes_reject_bad_tokens() {
    let config = Config::from_toml_str(CONFIG).unwrap();
    let jwt = JwtService::new("integration-secret", 600, 3600);
    let services = AppServices::new(Arc::new(MemoryStore::new()), &config, jwt.clone());
    let app = test::init_service(
        App::new()
            .wrap(AuthMiddleware::new(jwt))
            .configure(|cfg| services.configure(cfg)),
    )
    .await;

    let missing = test::TestRequest::get()
        .uri("/api/v1/user/profile")
        .to_request();
    let status = match app.call(missing).await {
        Ok(resp) => resp.status(),
        Err(e) => e.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // a bad token is rejected even where a token is optional
    let forged = test::TestRequest::get()
        .uri("/api/v1/sweepstakes")
        .insert_header(bearer("not-a-jwt"))
        .to_request();
    let status = match app.call(forged).await {
        Ok(resp) => resp.status(),
        Err(e) => e.as_response_error().status_code(),
    };
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
