use std::sync::Arc;

use actix_web::web;

use crate::config::Config;
use crate::handlers;
use crate::services::{AuthService, PointsService, SweepstakeService, UserService};
use crate::store::RewardsStore;
use crate::utils::JwtService;

/// Services shared by every worker
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub user: UserService,
    pub points: PointsService,
    pub sweepstakes: SweepstakeService,
}

impl AppServices {
    pub fn new(store: Arc<dyn RewardsStore>, config: &Config, jwt_service: JwtService) -> Self {
        Self {
            auth: AuthService::new(
                store.clone(),
                jwt_service,
                config.auth.clone(),
                config.points.clone(),
            ),
            user: UserService::new(store.clone()),
            points: PointsService::new(store.clone()),
            sweepstakes: SweepstakeService::new(store, config.sweepstakes.clone()),
        }
    }

    /// Register service data and mount the API under `/api/v1`
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.user.clone()))
            .app_data(web::Data::new(self.points.clone()))
            .app_data(web::Data::new(self.sweepstakes.clone()))
            .service(web::scope("/api/v1").configure(handlers::api_config));
    }
}
