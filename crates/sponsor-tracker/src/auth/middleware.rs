use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthError, TokenKeys};
use crate::error::ApiError;

/// Rejects requests without a valid bearer token and attaches the caller
/// identity as a request extension for downstream handlers.
pub async fn require_user(
    State(keys): State<Arc<TokenKeys>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let outcome = match header {
        None => Err(AuthError::MissingCredentials),
        Some(value) => match value.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => {
                keys.verify(token.trim())
            }
            _ => Err(AuthError::InvalidToken("expected a bearer token".to_string())),
        },
    };

    match outcome {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!(error = %err, "authentication denied");
            ApiError::from(err).into_response()
        }
    }
}
