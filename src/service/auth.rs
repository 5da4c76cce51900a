use crate::credentials::SharedHasher;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::user::{LoginRequest, NewUser, RegisterRequest, UserProfile};
use crate::session::{SessionStore, SessionUser};
use tracing::{info, warn};

pub struct AuthService<'a, R: UserRepository + ?Sized> {
    repository: &'a R,
    hasher: &'a SharedHasher,
    sessions: &'a dyn SessionStore,
}

impl<'a, R: UserRepository + ?Sized> AuthService<'a, R> {
    pub fn new(repository: &'a R, hasher: &'a SharedHasher, sessions: &'a dyn SessionStore) -> Self {
        AuthService {
            repository,
            hasher,
            sessions,
        }
    }

    /// Creates the account and opens a session for it, returning the token.
    /// Nothing is written unless every field check passes.
    pub async fn register(&self, request: RegisterRequest) -> Result<String, AppError> {
        let registration = request.into_registration()?;

        if self.repository.get_user_by_username(&registration.username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        let hasher = self.hasher.clone();
        let password = registration.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

        let user = NewUser {
            first_name: registration.first_name,
            last_name: registration.last_name,
            email: registration.email,
            username: registration.username,
            password_hash,
        };
        let user_id = self.repository.create_user(&user).await?;
        info!(user_id, username = %user.username, "user registered");

        self.sessions
            .create(SessionUser {
                user_id,
                username: user.username,
            })
            .await
    }

    pub async fn login(&self, request: LoginRequest) -> Result<String, AppError> {
        let (username, password) = request.into_credentials()?;

        let Some(user) = self.repository.get_user_by_username(&username).await? else {
            let hasher = self.hasher.clone();
            tokio::task::spawn_blocking(move || hasher.verify_decoy(&password)).await?;
            warn!(username = %username, "login failed: unknown username");
            return Err(AppError::InvalidCredentials);
        };

        let hasher = self.hasher.clone();
        let stored_hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash)).await??;
        if !verified {
            warn!(user_id = user.id, "login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        info!(user_id = user.id, "user logged in");
        self.sessions
            .create(SessionUser {
                user_id: user.id,
                username: user.username,
            })
            .await
    }

    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.sessions.destroy(token).await
    }

    pub async fn profile(&self, user_id: i64) -> Result<UserProfile, AppError> {
        self.repository
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
