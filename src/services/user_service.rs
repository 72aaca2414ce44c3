// services/user_service.rs - Registration, login and profile edits

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, AuthError, TokenIssuer};
use crate::database::models::{User, UserSummary};
use crate::database::{StoreError, UserStore};
use crate::error::ApiError;
use crate::services::validation::{is_valid_email, ValidationErrors, MIN_PASSWORD_LEN};

pub const INVALID_CREDENTIALS: &str = "Invalid username or password";
pub const USERNAME_TAKEN: &str = "Username already exist";

#[derive(Debug, Error)]
pub enum UserError {
    #[error("{}", .0.message())]
    Validation(ValidationErrors),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User {0} no longer exists")]
    UnknownAccount(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(errors) => errors.into(),
            UserError::InvalidCredentials => ApiError::bad_request(INVALID_CREDENTIALS),
            UserError::UnknownAccount(username) => {
                ApiError::unauthorized(format!("User {} no longer exists", username))
            }
            UserError::Hashing(msg) => {
                tracing::error!("{}", msg);
                ApiError::internal_server_error("Failed to process password")
            }
            UserError::Auth(e) => e.into(),
            UserError::Store(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    tokens: TokenIssuer,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenIssuer) -> Self {
        Self { users, tokens }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<UserSummary, UserError> {
        let mut errors = ValidationErrors::new();

        let username = required(&mut errors, "username", "Username", &request.username);
        let name = required(&mut errors, "name", "Name", &request.name);
        let email = required(&mut errors, "email", "Email", &request.email);
        if let Some(email) = &email {
            if !is_valid_email(email) {
                errors.add("email", "Email is not valid");
            }
        }
        check_new_password(
            &mut errors,
            "password",
            request.password.as_deref(),
            request.confirm_password.as_deref(),
        );

        if let Some(username) = &username {
            if self.users.find_user(username).await?.is_some() {
                errors.add("username", USERNAME_TAKEN);
            }
        }

        let (Some(username), Some(name), Some(email), Some(password)) =
            (username, name, email, request.password)
        else {
            return Err(UserError::Validation(errors));
        };
        if !errors.is_empty() {
            return Err(UserError::Validation(errors));
        }

        let now = Utc::now();
        let user = User {
            username,
            name,
            email,
            password_hash: hash_password(&password).map_err(UserError::Hashing)?,
            created_at: now,
            updated_at: now,
        };

        match self.users.create_user(&user).await {
            Ok(()) => {}
            Err(StoreError::AlreadyExists(_)) => {
                // Lost a race with a concurrent registration
                let mut errors = ValidationErrors::new();
                errors.add("username", USERNAME_TAKEN);
                return Err(UserError::Validation(errors));
            }
            Err(e) => return Err(e.into()),
        }

        info!("Registered user {}", user.username);
        Ok(UserSummary::from(&user))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, UserError> {
        let (Some(username), Some(password)) = (request.username, request.password) else {
            return Err(UserError::InvalidCredentials);
        };

        let Some(user) = self.users.find_user(username.trim()).await? else {
            warn!("Login attempt for unknown user {}", username);
            return Err(UserError::InvalidCredentials);
        };
        if !verify_password(&password, &user.password_hash) {
            warn!("Wrong password for user {}", user.username);
            return Err(UserError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(&user.username)?;
        info!("User {} logged in", user.username);

        Ok(LoginResponse {
            access_token,
            token_type: "bearer".to_string(),
            expires_in: self.tokens.expiry_seconds(),
        })
    }

    /// Edit the profile of `username`; omitted fields keep their value.
    pub async fn edit(&self, username: &str, request: EditRequest) -> Result<UserSummary, UserError> {
        let mut user = self
            .users
            .find_user(username)
            .await?
            .ok_or_else(|| UserError::UnknownAccount(username.to_string()))?;

        let mut errors = ValidationErrors::new();
        if let Some(name) = &request.name {
            if name.trim().is_empty() {
                errors.add("name", "Name must not be empty");
            }
        }
        if let Some(email) = &request.email {
            if !is_valid_email(email.trim()) {
                errors.add("email", "Email is not valid");
            }
        }
        if request.new_password.is_some() || request.confirm_password.is_some() {
            check_new_password(
                &mut errors,
                "new_password",
                request.new_password.as_deref(),
                request.confirm_password.as_deref(),
            );
        }
        if !errors.is_empty() {
            return Err(UserError::Validation(errors));
        }

        if let Some(name) = request.name {
            user.name = name.trim().to_string();
        }
        if let Some(email) = request.email {
            user.email = email.trim().to_string();
        }
        if let Some(password) = request.new_password {
            user.password_hash = hash_password(&password).map_err(UserError::Hashing)?;
        }
        user.updated_at = Utc::now();

        self.users.save_user(&user).await?;
        info!("Updated profile of {}", user.username);
        Ok(UserSummary::from(&user))
    }
}

fn required(errors: &mut ValidationErrors, field: &str, label: &str, value: &Option<String>) -> Option<String> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Some(v.to_string()),
        None => {
            errors.add(field, format!("{} is required", label));
            None
        }
    }
}

fn check_new_password(
    errors: &mut ValidationErrors,
    field: &str,
    password: Option<&str>,
    confirm: Option<&str>,
) {
    match password.filter(|p| !p.is_empty()) {
        None => errors.add(field, "Password is required"),
        Some(p) => {
            if p.chars().count() < MIN_PASSWORD_LEN {
                errors.add(field, format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
            }
            if confirm != Some(p) {
                errors.add("confirm_password", "Password confirmation does not match");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryStore::new()), TokenIssuer::new("test-secret", 1).unwrap())
    }

    fn alice() -> RegisterRequest {
        RegisterRequest {
            username: Some("alice".into()),
            name: Some("Alice".into()),
            email: Some("alice@example.com".into()),
            password: Some("secret123".into()),
            confirm_password: Some("secret123".into()),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let service = service();
        let summary = service.register(alice()).await.unwrap();
        assert_eq!(summary.username, "alice");
        assert_eq!(summary.email, "alice@example.com");

        let login = service
            .login(LoginRequest { username: Some("alice".into()), password: Some("secret123".into()) })
            .await
            .unwrap();
        assert_eq!(login.token_type, "bearer");
        assert_eq!(login.expires_in, 3600);
        assert_eq!(service.tokens.verify(&login.access_token).unwrap().sub, "alice");
    }

    #[tokio::test]
    async fn duplicate_username_is_a_validation_error() {
        let service = service();
        service.register(alice()).await.unwrap();

        let Err(UserError::Validation(errors)) = service.register(alice()).await else {
            panic!("expected validation error");
        };
        assert_eq!(errors.field_map()["username"], USERNAME_TAKEN);
    }

    #[tokio::test]
    async fn register_aggregates_violations() {
        let request = RegisterRequest {
            username: None,
            name: Some("".into()),
            email: Some("not-an-email".into()),
            password: Some("123".into()),
            confirm_password: Some("1234".into()),
        };

        let Err(UserError::Validation(errors)) = service().register(request).await else {
            panic!("expected validation error");
        };
        for field in ["username", "name", "email", "password", "confirm_password"] {
            assert!(errors.has_field(field), "missing {}", field);
        }
    }

    #[tokio::test]
    async fn bad_credentials_look_the_same() {
        let service = service();
        service.register(alice()).await.unwrap();

        for (username, password) in [("alice", "wrong-pass"), ("nobody", "secret123")] {
            let result = service
                .login(LoginRequest { username: Some(username.into()), password: Some(password.into()) })
                .await;
            assert!(matches!(result, Err(UserError::InvalidCredentials)));
        }
    }

    #[tokio::test]
    async fn edit_keeps_omitted_fields() {
        let service = service();
        service.register(alice()).await.unwrap();

        let summary = service
            .edit("alice", EditRequest { name: Some("Alice B.".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(summary.name, "Alice B.");
        assert_eq!(summary.email, "alice@example.com");

        let rejected = service
            .edit(
                "alice",
                EditRequest {
                    new_password: Some("newpass1".into()),
                    confirm_password: Some("other".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(rejected, Err(UserError::Validation(_))));

        service
            .edit(
                "alice",
                EditRequest {
                    new_password: Some("newpass1".into()),
                    confirm_password: Some("newpass1".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(service
            .login(LoginRequest { username: Some("alice".into()), password: Some("newpass1".into()) })
            .await
            .is_ok());
    }
}
