//! Session bootstrap middleware.
//!
//! Runs in front of every route. Requests arriving without a session
//! cookie get a freshly minted token attached to the response, so the
//! next call carries a verifiable session. The current request is not
//! retroactively authenticated; `GET /session` exists so clients can
//! obtain a cookie before calling the optimize endpoint.

use axum::extract::{Request, State};
use axum::http::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use axum::middleware::Next;
use axum::response::Response;

use crate::config::Environment;
use crate::http::server::AppState;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session_token";

/// Extract the session token from the Cookie header(s), if present.
pub fn session_cookie_value(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE).then(|| value.to_string())
        })
}

/// Render the Set-Cookie value for a session token.
///
/// http-only and strict same-site always; the secure flag only in
/// production so plain-http local development keeps working.
pub fn format_session_cookie(token: &str, environment: Environment, max_age_secs: u64) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Max-Age={max_age_secs}; Path=/; HttpOnly; SameSite=Strict"
    );
    if environment.is_production() {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Middleware: mint a session cookie for first-time visitors.
pub async fn session_bootstrap(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let has_session = session_cookie_value(request.headers()).is_some();

    let mut response = next.run(request).await;

    if !has_session {
        let token = state.signer.create_token();
        let cookie =
            format_session_cookie(&token, state.environment, state.cookie_max_age_secs);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
                tracing::debug!("session cookie minted");
            }
            Err(error) => {
                // Tokens are base64url, so this should be unreachable.
                tracing::error!(error = %error, "failed to encode session cookie");
            }
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_cookie_extracted() {
        let headers = headers_with_cookie("session_token=abc.def");
        assert_eq!(session_cookie_value(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_cookie_extracted_among_others() {
        let headers = headers_with_cookie("theme=dark; session_token=tok; lang=en");
        assert_eq!(session_cookie_value(&headers).as_deref(), Some("tok"));
    }

    #[test]
    fn test_missing_cookie() {
        assert_eq!(session_cookie_value(&HeaderMap::new()), None);

        let headers = headers_with_cookie("other=value");
        assert_eq!(session_cookie_value(&headers), None);
    }

    #[test]
    fn test_cookie_format_development() {
        let cookie = format_session_cookie("tok", Environment::Development, 86_400);
        assert_eq!(
            cookie,
            "session_token=tok; Max-Age=86400; Path=/; HttpOnly; SameSite=Strict"
        );
    }

    #[test]
    fn test_cookie_format_production_adds_secure() {
        let cookie = format_session_cookie("tok", Environment::Production, 86_400);
        assert!(cookie.ends_with("; Secure"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
    }
}
