use actix_web::{App, HttpServer, middleware::Logger};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use ofertivo_backend::{
    AppServices,
    config::Config,
    database::connect_store,
    middlewares::{AuthMiddleware, create_cors},
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration file");
    config.validate().expect("Invalid configuration");

    let store = connect_store(&config.database)
        .await
        .expect("Failed to open the rewards store");

    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    let services = AppServices::new(store, &config, jwt_service.clone());

    log::info!(
        "Starting HTTP server at {}:{} (multiple entries allowed: {})",
        config.server.host,
        config.server.port,
        config.sweepstakes.allow_multiple_entries
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(create_cors())
            .configure(swagger_config)
            .configure(|cfg| services.configure(cfg))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
