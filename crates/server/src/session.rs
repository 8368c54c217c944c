// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Credential extraction for the server.
//!
//! The actor is identified by `Authorization: Bearer <user id>`. The
//! extractor only reads the header; resolving the id against the directory
//! is the workflow service's job, so a missing header is not rejected here.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, warn};

use complaint_desk_api::ApiError;

use crate::HttpError;

/// The bearer credential of a request, if one was sent.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(
///     Credential(credential): Credential,
/// ) -> Result<Json<Response>, HttpError> {
///     let actor = service.authenticate(credential.as_deref())?;
///     ...
/// }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 401 if an `Authorization` header is present but is not
/// valid `Bearer <token>` text.
pub struct Credential(pub Option<String>);

impl<S: Send + Sync> FromRequestParts<S> for Credential {
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get("Authorization") else {
            debug!("No Authorization header");
            return Ok(Self(None));
        };

        let header: &str = header.to_str().map_err(|_| {
            warn!("Invalid Authorization header encoding");
            unauthenticated("Authorization header is not valid text")
        })?;

        let token: &str = header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Authorization header does not start with 'Bearer '");
            unauthenticated("Expected 'Bearer <user id>'")
        })?;

        Ok(Self(Some(token.trim().to_string())))
    }
}

fn unauthenticated(reason: &str) -> HttpError {
    HttpError::from(ApiError::Unauthenticated {
        reason: reason.to_string(),
    })
}
