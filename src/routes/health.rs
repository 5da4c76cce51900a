use crate::models::health::HealthResponse;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use sqlx::SqlitePool;
use tracing::warn;

/// Liveness plus a database round trip
#[openapi(tag = "Health")]
#[get("/")]
pub async fn healthcheck(pool: &State<SqlitePool>) -> Json<HealthResponse> {
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(pool.inner()).await {
        Ok(_) => "ok",
        Err(e) => {
            warn!(error = %e, "health check could not reach the database");
            "unavailable"
        }
    };

    Json(HealthResponse { status: "ok", database })
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![healthcheck]
}
