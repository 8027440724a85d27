// --- File: crates/odmark_attendance/src/auth.rs ---

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use odmark_common::services::{BoxFuture, BoxedError, Identity, IdentityProvider};
use odmark_config::AuthConfig;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

// The state this auth middleware has access to: the identity provider
// that resolves bearer tokens.
#[derive(Clone)]
pub struct AuthState {
    pub provider: Arc<dyn IdentityProvider<Error = BoxedError>>,
}

/// Axum middleware resolving the caller's identity.
///
/// Expects a `Authorization: Bearer <token>` header, resolves it through
/// the identity provider and inserts the resulting [`Identity`] as a
/// request extension for handlers to extract.
pub async fn identity_middleware(
    State(auth_state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) => match auth_state.provider.verify_token(token).await {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                next.run(req).await
            }
            Err(e) => {
                warn!(error = %e, "rejected request with invalid bearer token");
                (
                    StatusCode::UNAUTHORIZED,
                    "Unauthorized: invalid credentials.".to_string(),
                )
                    .into_response()
            }
        },
        None => (
            StatusCode::UNAUTHORIZED,
            "Unauthorized: missing bearer token.".to_string(),
        )
            .into_response(),
    }
}

#[derive(Error, Debug)]
pub enum StaticTokenError {
    #[error("unknown token")]
    UnknownToken,
}

/// Identity provider backed by the static token table in the config file.
///
/// A deployment against a real identity service replaces this with a
/// provider that verifies tokens remotely; the trait seam is the same.
pub struct StaticTokenProvider {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenProvider {
    pub fn new(config: &AuthConfig) -> Self {
        let tokens = config
            .static_tokens
            .iter()
            .map(|entry| {
                (
                    entry.token.clone(),
                    Identity {
                        email: entry.email.clone(),
                        display_name: entry.display_name.clone(),
                    },
                )
            })
            .collect();
        Self { tokens }
    }
}

impl IdentityProvider for StaticTokenProvider {
    type Error = BoxedError;

    fn verify_token(&self, token: &str) -> BoxFuture<'_, Identity, Self::Error> {
        let identity = self.tokens.get(token).cloned();
        Box::pin(async move {
            identity.ok_or_else(|| BoxedError(Box::new(StaticTokenError::UnknownToken)))
        })
    }
}
