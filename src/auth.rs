use crate::config::{Config, SessionConfig};
use crate::error::app_error::AppError;
use crate::session::{SessionUser, SharedSessionStore};
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::outcome::Outcome;
use rocket::request::{FromRequest, Outcome as RequestOutcome, Request};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::{Object, Responses, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket_okapi::request::{OpenApiFromRequest, RequestHeaderInput};
use serde::Serialize;

pub const SESSION_COOKIE: &str = "task_session";

#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

impl CurrentUser {
    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            user_id: self.id,
            username: self.username.clone(),
        }
    }
}

impl From<SessionUser> for CurrentUser {
    fn from(user: SessionUser) -> Self {
        CurrentUser {
            id: user.user_id,
            username: user.username,
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for CurrentUser {
    type Error = AppError;

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, Self::Error> {
        let Some(token) = req.cookies().get_private(SESSION_COOKIE).map(|c| c.value().to_string()) else {
            return Outcome::Error((Status::Unauthorized, AppError::Unauthorized));
        };

        let Some(sessions) = req.rocket().state::<SharedSessionStore>() else {
            return Outcome::Error((Status::InternalServerError, AppError::internal("Session store is not configured")));
        };

        match sessions.resolve(&token).await {
            Some(user) => {
                let current_user = CurrentUser::from(user);
                req.local_cache(|| Some(current_user.clone()));
                Outcome::Success(current_user)
            }
            None => Outcome::Error((Status::Unauthorized, AppError::Unauthorized)),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for CurrentUser {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        let security_scheme = SecurityScheme {
            description: Some("Session cookie set by POST /api/login or POST /api/register.".to_string()),
            data: SecuritySchemeData::ApiKey {
                name: SESSION_COOKIE.to_string(),
                location: "cookie".to_string(),
            },
            extensions: Object::default(),
        };

        let mut security_req = SecurityRequirement::new();
        security_req.insert("cookieAuth".to_string(), Vec::new());

        Ok(RequestHeaderInput::Security("cookieAuth".to_string(), security_scheme, security_req))
    }

    fn get_responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response};
        let mut responses = Responses::default();
        responses.responses.insert(
            "401".to_string(),
            RefOr::Object(Response {
                description: "Unauthorized - no valid session".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}

pub(crate) fn session_cookie(token: String, session: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(session.secure_cookie)
        .max_age(rocket::time::Duration::hours(session.ttl_hours))
        .build()
}

/// Reads and writes the session cookie for the current request.
pub struct SessionCookies<'r> {
    jar: &'r CookieJar<'r>,
    session: SessionConfig,
}

impl SessionCookies<'_> {
    /// Token of the session this client currently holds, if any.
    pub fn token(&self) -> Option<String> {
        self.jar.get_private(SESSION_COOKIE).map(|c| c.value().to_string())
    }

    pub fn open(&self, token: String) {
        self.jar.add_private(session_cookie(token, &self.session));
    }

    pub fn clear(&self) {
        self.jar.remove_private(Cookie::build(SESSION_COOKIE).path("/").build());
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SessionCookies<'r> {
    type Error = ();

    async fn from_request(req: &'r Request<'_>) -> RequestOutcome<Self, ()> {
        let session = req.rocket().state::<Config>().map(|c| c.session.clone()).unwrap_or_default();
        Outcome::Success(SessionCookies { jar: req.cookies(), session })
    }
}

impl<'a> OpenApiFromRequest<'a> for SessionCookies<'a> {
    fn from_request_input(_gen: &mut OpenApiGenerator, _name: String, _required: bool) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(RequestHeaderInput::None)
    }
}
