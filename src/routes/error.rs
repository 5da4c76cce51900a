use rocket::serde::Serialize;
use rocket::serde::json::Json;
use rocket::{Request, catch};

/// Same shape as the body written for [`crate::error::app_error::AppError`].
#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorBody {
    pub error: String,
}

fn body(message: &str) -> Json<ErrorBody> {
    Json(ErrorBody { error: message.to_string() })
}

#[catch(400)]
pub fn bad_request(_: &Request) -> Json<ErrorBody> {
    body("Bad request")
}

#[catch(401)]
pub fn unauthorized(_: &Request) -> Json<ErrorBody> {
    body("Not authenticated")
}

#[catch(403)]
pub fn forbidden(_: &Request) -> Json<ErrorBody> {
    body("Forbidden")
}

#[catch(404)]
pub fn not_found(_: &Request) -> Json<ErrorBody> {
    body("Not found")
}

// Malformed JSON bodies and unparsable path ids land here.
#[catch(422)]
pub fn unprocessable_entity(_: &Request) -> Json<ErrorBody> {
    body("Invalid request")
}

#[catch(500)]
pub fn internal_error(_: &Request) -> Json<ErrorBody> {
    body("Internal server error")
}
