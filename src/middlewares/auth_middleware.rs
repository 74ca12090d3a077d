use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::model::user::Role;
use crate::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};

/// Per-layer auth state: which roles may pass. An empty role list means any
/// authenticated caller.
pub struct AuthState {
    pub jwt_utils: Arc<JwtTokenUtilsImpl>,
    pub allowed_roles: &'static [Role],
}

impl AuthState {
    pub fn any_role(jwt_utils: Arc<JwtTokenUtilsImpl>) -> Arc<Self> {
        Arc::new(AuthState {
            jwt_utils,
            allowed_roles: &[],
        })
    }

    pub fn roles(jwt_utils: Arc<JwtTokenUtilsImpl>, allowed_roles: &'static [Role]) -> Arc<Self> {
        Arc::new(AuthState {
            jwt_utils,
            allowed_roles,
        })
    }
}

/// Bearer token gate. Missing/malformed/invalid/expired tokens get 401; a
/// valid token with the wrong role gets 403. Claims land in request
/// extensions for the handlers.
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = state
        .jwt_utils
        .extract_token_from_header(auth_header)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let claims = state
        .jwt_utils
        .validate_token(&token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    if !state.allowed_roles.is_empty() && !state.allowed_roles.contains(&claims.role) {
        return Err(StatusCode::FORBIDDEN);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
