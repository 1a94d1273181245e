use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{validate_jwt, Actor};
use crate::database::UserStore;
use crate::error::ApiError;
use crate::state::AppState;

/// The actor a request runs as; `None` for anonymous requests
#[derive(Clone, Debug, Default)]
pub struct CurrentActor(pub Option<Actor>);

impl CurrentActor {
    pub fn get(&self) -> Option<&Actor> {
        self.0.as_ref()
    }

    /// The actor, or 401 for anonymous requests
    pub fn require(&self) -> Result<&Actor, ApiError> {
        self.0
            .as_ref()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentActor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<CurrentActor>().cloned().unwrap_or_default())
    }
}

/// Resolves the bearer token, if any, into a `CurrentActor`.
///
/// Role and level are reloaded from the user record on every request. A
/// missing header is anonymous; a bad token or unknown user is 401.
pub async fn actor_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let actor = match extract_jwt_from_headers(request.headers())? {
        None => None,
        Some(token) => {
            let claims = validate_jwt(&token).map_err(|e| {
                tracing::debug!("Rejected token: {}", e);
                ApiError::unauthorized(e.to_string())
            })?;

            let user = state
                .store
                .find_user(claims.sub)
                .await?
                .ok_or_else(|| ApiError::unauthorized("Unknown user"))?;

            let actor = user
                .to_actor()
                .ok_or_else(|| ApiError::unauthorized("User has no usable role"))?;
            Some(actor)
        }
    };

    request.extensions_mut().insert(CurrentActor(actor));
    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    let Some(auth_header) = headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        Some(_) => Err(ApiError::unauthorized("Empty JWT token")),
        None => Err(ApiError::unauthorized("Authorization header must use Bearer token format")),
    }
}
