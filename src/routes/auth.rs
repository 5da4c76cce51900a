use crate::auth::{CurrentUser, SessionCookies};
use crate::credentials::SharedHasher;
use crate::database::sqlite_repository::SqliteRepository;
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::response::MessageResponse;
use crate::models::user::{LoginRequest, RegisterRequest, UserProfile};
use crate::service::auth::AuthService;
use crate::session::SharedSessionStore;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::SqlitePool;
use tracing::info;

/// Swaps whatever session the client held for the freshly opened one.
async fn replace_session<R: UserRepository + ?Sized>(service: &AuthService<'_, R>, cookies: &SessionCookies<'_>, token: String) -> Result<(), AppError> {
    if let Some(previous) = cookies.token() {
        service.logout(&previous).await?;
    }
    cookies.open(token);
    Ok(())
}

/// Create an account and sign in as it
#[openapi(tag = "Auth")]
#[post("/register", data = "<payload>")]
pub async fn register(
    pool: &State<SqlitePool>,
    hasher: &State<SharedHasher>,
    sessions: &State<SharedSessionStore>,
    cookies: SessionCookies<'_>,
    payload: Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let service = AuthService::new(&repo, hasher.inner(), sessions.inner().as_ref());

    let token = service.register(payload.into_inner()).await?;
    replace_session(&service, &cookies, token).await?;

    Ok(Json(MessageResponse::ok("Registration successful")))
}

/// Sign in with username and password
#[openapi(tag = "Auth")]
#[post("/login", data = "<payload>")]
pub async fn login(
    pool: &State<SqlitePool>,
    hasher: &State<SharedHasher>,
    sessions: &State<SharedSessionStore>,
    cookies: SessionCookies<'_>,
    payload: Json<LoginRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let service = AuthService::new(&repo, hasher.inner(), sessions.inner().as_ref());

    let token = service.login(payload.into_inner()).await?;
    replace_session(&service, &cookies, token).await?;

    Ok(Json(MessageResponse::ok("Login successful")))
}

/// End the current session
#[openapi(tag = "Auth")]
#[post("/logout")]
pub async fn logout(
    pool: &State<SqlitePool>,
    hasher: &State<SharedHasher>,
    sessions: &State<SharedSessionStore>,
    current_user: CurrentUser,
    cookies: SessionCookies<'_>,
) -> Result<Json<MessageResponse>, AppError> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let service = AuthService::new(&repo, hasher.inner(), sessions.inner().as_ref());

    if let Some(token) = cookies.token() {
        service.logout(&token).await?;
    }
    cookies.clear();
    info!(user_id = current_user.id, "user logged out");

    Ok(Json(MessageResponse::ok("Logged out successfully")))
}

/// Profile of the signed-in user
#[openapi(tag = "Auth")]
#[get("/user")]
pub async fn current_user_profile(
    pool: &State<SqlitePool>,
    hasher: &State<SharedHasher>,
    sessions: &State<SharedSessionStore>,
    current_user: CurrentUser,
) -> Result<Json<UserProfile>, AppError> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let service = AuthService::new(&repo, hasher.inner(), sessions.inner().as_ref());

    Ok(Json(service.profile(current_user.id).await?))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![register, login, logout, current_user_profile]
}
