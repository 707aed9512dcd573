use crate::state::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Who issued a request, as far as logs are concerned: the last four
/// characters of the presented token.
#[derive(Clone, Debug)]
pub struct Caller {
    label: String,
}

impl Caller {
    fn from_token(token: &str) -> Self {
        let tail: Vec<char> = token.chars().rev().take(4).collect();
        let tail: String = tail.into_iter().rev().collect();
        Self { label: format!("token:{tail}") }
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

fn presented_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);
    let api_key = || headers.get("x-api-key").and_then(|h| h.to_str().ok());
    bearer.or_else(api_key).map(str::to_string)
}

pub async fn require_auth(State(app): State<AppState>, mut req: Request<Body>, next: Next) -> Response {
    if !app.auth.is_enabled() {
        return next.run(req).await;
    }

    match presented_token(req.headers()) {
        Some(token) if app.auth.matches(&token) => {
            req.extensions_mut().insert(Caller::from_token(&token));
            next.run(req).await
        }
        _ => (StatusCode::UNAUTHORIZED, "unauthorized").into_response(),
    }
}
