//! Small response helpers.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// A `302 Found` redirect to `location`.
///
/// axum's `Redirect` only offers 303, 307 and 308; browsers and providers
/// expect a plain 302 here.
#[must_use]
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
