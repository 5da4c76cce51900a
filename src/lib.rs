mod auth;
mod config;
mod credentials;
mod database;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod service;
mod session;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;

use crate::credentials::{Argon2Hasher, SharedHasher};
use crate::db::stage_db;
use crate::middleware::RequestLogger;
use crate::routes as app_routes;
use crate::session::{InMemorySessionStore, SharedSessionStore};
use rocket::fairing::AdHoc;
use rocket::{Build, Rocket, catchers, http::Method};
use rocket_cors::{AllowedOrigins, CorsOptions};
use rocket_okapi::swagger_ui::{SwaggerUIConfig, make_swagger_ui};
use rocket_okapi::{get_openapi_route, okapi::merge::marge_spec_list};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(log_level: &str, json_format: bool) {
    // RUST_LOG takes precedence over logging.level, e.g.
    //   RUST_LOG=task_tracker::service=debug,info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_line_number(true);

    // Tests build many rockets in one process; only the first install wins.
    let _ = if json_format { subscriber.json().try_init() } else { subscriber.try_init() };
}

/// Private cookies are only as good as the key; outside the debug profile a
/// generated key would not survive restarts, so ignition fails without one.
fn stage_secret_key_check() -> AdHoc {
    AdHoc::try_on_ignite("Secret Key Check", |rocket| async move {
        let profile = rocket.figment().profile().clone();
        // Rocket's built-in default serializes as zeroed bytes; a configured key is a string.
        let configured = rocket.figment().find_value("secret_key").map(|v| v.as_str().is_some()).unwrap_or(false);
        if profile != rocket::Config::DEBUG_PROFILE && !configured {
            tracing::error!(
                profile = %profile,
                "ROCKET_SECRET_KEY is required outside the debug profile. Generate one with: openssl rand -base64 32"
            );
            return Err(rocket);
        }
        Ok(rocket)
    })
}

fn build_cors(cors_config: &config::CorsConfig) -> Result<CorsOptions, String> {
    let is_wildcard = cors_config.allowed_origins.len() == 1 && cors_config.allowed_origins[0] == "*";

    if is_wildcard && cors_config.allow_credentials {
        return Err("Cannot use wildcard origins (*) with credentials enabled. Either set specific origins or disable credentials.".to_string());
    }

    let allowed_origins = if cors_config.allowed_origins.is_empty() {
        AllowedOrigins::some_exact::<&str>(&[])
    } else if is_wildcard {
        AllowedOrigins::all()
    } else {
        AllowedOrigins::some_exact(&cors_config.allowed_origins.iter().map(String::as_str).collect::<Vec<_>>())
    };

    Ok(CorsOptions {
        allowed_origins,
        allowed_methods: vec![Method::Get, Method::Post, Method::Put, Method::Delete, Method::Options]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: rocket_cors::AllowedHeaders::some(&["Content-Type", "Accept"]),
        allow_credentials: cors_config.allow_credentials,
        ..Default::default()
    })
}

fn stage_cors(cors_config: config::CorsConfig) -> AdHoc {
    AdHoc::try_on_ignite("CORS", |rocket| async move {
        let cors = build_cors(&cors_config).and_then(|options| options.to_cors().map_err(|e| e.to_string()));
        match cors {
            Ok(cors) => Ok(rocket.attach(cors)),
            Err(e) => {
                tracing::error!("Invalid CORS configuration: {}", e);
                Err(rocket)
            }
        }
    })
}

fn stage_hasher(password_config: config::PasswordConfig) -> AdHoc {
    AdHoc::try_on_ignite("Credential Hasher", |rocket| async move {
        match Argon2Hasher::new(&password_config) {
            Ok(hasher) => Ok(rocket.manage::<SharedHasher>(Arc::new(hasher))),
            Err(e) => {
                tracing::error!(error = ?e, "Failed to configure password hashing");
                Err(rocket)
            }
        }
    })
}

fn stage_sessions(session_config: config::SessionConfig) -> AdHoc {
    AdHoc::on_ignite("Session Store", move |rocket| {
        let store = Arc::new(InMemorySessionStore::new(session_config.ttl()));
        store.clone().spawn_cleanup_task(std::time::Duration::from_secs(session_config.cleanup_interval_seconds.max(1)));

        Box::pin(async move { rocket.manage::<SharedSessionStore>(store) })
    })
}

fn get_swagger_config(openapi_url: &str) -> SwaggerUIConfig {
    SwaggerUIConfig {
        url: openapi_url.to_string(),
        ..Default::default()
    }
}

fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return config::DEFAULT_API_BASE_PATH.to_string();
    }

    let mut normalized = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    };

    while normalized.ends_with('/') && normalized.len() > 1 {
        normalized.pop();
    }

    normalized
}

fn join_base_path(base_path: &str, path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    let suffix = path.trim_start_matches('/');

    match (base.is_empty(), suffix.is_empty()) {
        (true, _) => format!("/{}", suffix),
        (false, true) => base.to_string(),
        (false, false) => format!("{}/{}", base, suffix),
    }
}

struct RouteSpec {
    path: &'static str,
    routes: Vec<rocket::Route>,
    openapi: rocket_okapi::okapi::openapi3::OpenApi,
}

fn collect_route_specs() -> Vec<RouteSpec> {
    let (auth_routes, auth_openapi) = app_routes::auth::routes();
    let (task_routes, task_openapi) = app_routes::task::routes();
    let (health_routes, health_openapi) = app_routes::health::routes();

    vec![
        RouteSpec {
            path: "",
            routes: auth_routes,
            openapi: auth_openapi,
        },
        RouteSpec {
            path: "/tasks",
            routes: task_routes,
            openapi: task_openapi,
        },
        RouteSpec {
            path: "/health",
            routes: health_routes,
            openapi: health_openapi,
        },
    ]
}

fn mount_api_routes(mut rocket: Rocket<Build>, base_path: &str, enable_swagger: bool) -> Rocket<Build> {
    let mut openapi_list = Vec::new();
    for spec in collect_route_specs() {
        rocket = rocket.mount(join_base_path(base_path, spec.path), spec.routes);
        openapi_list.push((spec.path, spec.openapi));
    }

    if !enable_swagger {
        return rocket;
    }

    match marge_spec_list(&openapi_list) {
        Ok(openapi_docs) => {
            let settings = rocket_okapi::settings::OpenApiSettings::default();
            rocket = rocket.mount(base_path, vec![get_openapi_route(openapi_docs, &settings)]);

            let docs_path = join_base_path(base_path, "docs");
            let openapi_url = join_base_path(base_path, "openapi.json");
            rocket.mount(docs_path, make_swagger_ui(&get_swagger_config(&openapi_url)))
        }
        Err(err) => {
            tracing::error!("Could not merge OpenAPI spec, API docs disabled: {}", err);
            rocket
        }
    }
}

pub fn build_rocket(config: Config) -> Rocket<Build> {
    init_tracing(&config.logging.level, config.logging.json_format);

    let figment = rocket::Config::figment()
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port));

    let base_path = normalize_base_path(&config.api.base_path);
    let enable_swagger = config.api.enable_swagger;

    let rocket = rocket::custom(figment)
        .attach(stage_secret_key_check())
        .attach(stage_cors(config.cors.clone()))
        .attach(RequestLogger)
        .attach(stage_db(config.database.clone()))
        .attach(stage_hasher(config.password.clone()))
        .attach(stage_sessions(config.session.clone()))
        .manage(config);

    mount_api_routes(rocket, &base_path, enable_swagger).register(
        "/",
        catchers![
            app_routes::error::bad_request,
            app_routes::error::unauthorized,
            app_routes::error::forbidden,
            app_routes::error::not_found,
            app_routes::error::unprocessable_entity,
            app_routes::error::internal_error
        ],
    )
}
