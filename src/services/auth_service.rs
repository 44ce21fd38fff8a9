use std::sync::Arc;

use chrono::Utc;

use crate::config::{AuthConfig, PointsConfig};
use crate::entities::{PointTransactionKind, UserRole, user_entity as users};
use crate::error::{AppError, AppResult};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::services::PointsService;
use crate::store::{NewUser, RewardsStore};
use crate::utils::*;

const MAX_DISPLAY_NAME_LEN: usize = 60;

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn RewardsStore>,
    jwt_service: JwtService,
    auth_config: AuthConfig,
    points_config: PointsConfig,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn RewardsStore>,
        jwt_service: JwtService,
        auth_config: AuthConfig,
        points_config: PointsConfig,
    ) -> Self {
        Self {
            store,
            jwt_service,
            auth_config,
            points_config,
        }
    }

    /// Create an account and credit the welcome bonus in the same transaction
    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password, &email)?;

        let display_name = request.display_name.trim().to_string();
        if display_name.is_empty() || display_name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(AppError::ValidationError(format!(
                "Display name must be between 1 and {MAX_DISPLAY_NAME_LEN} characters"
            )));
        }

        let is_admin = self
            .auth_config
            .admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(&email));
        let role = if is_admin {
            UserRole::Admin
        } else {
            request.account_type.unwrap_or_default().into()
        };

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();

        let mut tx = self.store.begin().await?;
        let mut user = tx
            .insert_user(NewUser {
                email,
                display_name,
                avatar_url: request.avatar_url,
                password_hash,
                role,
                created_at: now,
            })
            .await?;

        let bonus = self.points_config.welcome_bonus;
        if bonus > 0 {
            user = PointsService::apply_delta(
                tx.as_mut(),
                &user,
                bonus,
                PointTransactionKind::WelcomeBonus,
                None,
                Some("Welcome bonus".to_string()),
            )
            .await?;
        }
        tx.commit().await?;

        log::info!(
            "User registered: id={} role={} welcome_bonus={}",
            user.id,
            user.role,
            bonus
        );
        self.issue_tokens(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);

        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }

        self.issue_tokens(user)
    }

    /// Exchange a refresh token for a new token pair. The role is re-read so
    /// promotions take effect without signing in again.
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user = self
            .store
            .get_user(claims.user_id()?)
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        self.issue_tokens(user)
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(user.id, user.role)?;
        let refresh_token = self.jwt_service.generate_refresh_token(user.id, user.role)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountType;
    use crate::store::MemoryStore;

    fn service(admin_emails: Vec<String>) -> (AuthService, Arc<dyn RewardsStore>) {
        let store: Arc<dyn RewardsStore> = Arc::new(MemoryStore::new());
        let svc = AuthService::new(
            store.clone(),
            JwtService::new("test-secret", 3600, 7200),
            AuthConfig { admin_emails },
            PointsConfig { welcome_bonus: 100 },
        );
        (svc, store)
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "Password123".to_string(),
            display_name: "Ana".to_string(),
            avatar_url: None,
            account_type: None,
        }
    }

    #[tokio::test]
    async fn test_register_credits_welcome_bonus() {
        let (svc, store) = service(vec![]);
        let auth = svc.register(register_request("Ana@Example.com")).await.unwrap();

        assert_eq!(auth.user.email, "ana@example.com");
        assert_eq!(auth.user.role, UserRole::User);
        assert_eq!(auth.user.points, 100);

        let user = store.get_user(auth.user.id).await.unwrap().unwrap();
        assert_eq!(user.lifetime_points, 100);
        let (ledger, total) = store
            .list_point_transactions(user.id, crate::store::PageWindow { offset: 0, limit: 5 })
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(ledger[0].kind, PointTransactionKind::WelcomeBonus);
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates_and_bad_input() {
        let (svc, _) = service(vec![]);
        svc.register(register_request("ana@example.com")).await.unwrap();

        assert!(matches!(
            svc.register(register_request("ANA@example.com")).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(svc.register(register_request("not-an-email")).await.is_err());

        let mut weak = register_request("ben@example.com");
        weak.password = "password".to_string();
        assert!(svc.register(weak).await.is_err());

        let mut blank = register_request("cai@example.com");
        blank.display_name = "   ".to_string();
        assert!(svc.register(blank).await.is_err());
    }

    #[tokio::test]
    async fn test_roles_at_registration() {
        let (svc, _) = service(vec!["root@example.com".to_string()]);

        let mut shop = register_request("shop@example.com");
        shop.account_type = Some(AccountType::Advertiser);
        assert_eq!(
            svc.register(shop).await.unwrap().user.role,
            UserRole::Advertiser
        );

        let admin = svc.register(register_request("Root@example.com")).await.unwrap();
        assert_eq!(admin.user.role, UserRole::Admin);
    }

    #[tokio::test]
    async fn test_login_and_refresh() {
        let (svc, _) = service(vec![]);
        svc.register(register_request("ana@example.com")).await.unwrap();

        let mut login = LoginRequest {
            email: " ANA@example.com".to_string(),
            password: "Password123".to_string(),
        };
        let auth = svc.login(login).await.unwrap();
        assert_eq!(auth.expires_in, 3600);

        let refreshed = svc.refresh_token(&auth.refresh_token).await.unwrap();
        assert_eq!(refreshed.user.id, auth.user.id);
        assert!(svc.refresh_token(&auth.access_token).await.is_err());

        login = LoginRequest {
            email: "ana@example.com".to_string(),
            password: "Wrong12345".to_string(),
        };
        assert!(matches!(svc.login(login).await, Err(AppError::AuthError(_))));
    }
}
