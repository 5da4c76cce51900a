pub mod health;
pub mod response;
pub mod task;
pub mod user;

/// Treats a missing, empty or whitespace-only field as absent.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Passwords are taken as typed; only a missing or empty value is absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
