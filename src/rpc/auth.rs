//! Simple HMAC token-based auth middleware.
//! Add header `x-auth-token: <hex-hmac>` where hex-hmac = HMAC_SHA256(secret, path).
//! Disabled by default; local devnets rarely need it.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use tracing::warn;

pub type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct AuthConfig {
    pub enabled: bool,
    pub secret: Arc<Vec<u8>>,
}

impl AuthConfig {
    pub fn disabled() -> Self {
        Self { enabled: false, secret: Arc::new(vec![]) }
    }

    pub fn new(secret: Vec<u8>) -> Self {
        Self { enabled: true, secret: Arc::new(secret) }
    }

    /// Compute the expected token for a request path (hex HMAC-SHA256).
    pub fn token_for(&self, path: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("hmac accepts any key size");
        mac.update(path.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Validate the `x-auth-token` header against the HMAC of the request path.
pub async fn require_hmac(
    State(auth): State<Arc<AuthConfig>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !auth.enabled {
        return Ok(next.run(req).await);
    }

    let token = req
        .headers()
        .get("x-auth-token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if token.is_empty() {
        warn!("missing auth header");
        return Err(StatusCode::UNAUTHORIZED);
    }
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("");
    if auth.token_for(path) != token {
        warn!("invalid auth token");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}
