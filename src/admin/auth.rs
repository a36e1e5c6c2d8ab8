//! Back-office authentication: password hashes and the session cookie.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

use super::queries;

pub const SESSION_COOKIE: &str = "admin_session";

/// Lowercase hex SHA-256 of the password
pub fn hash_password(plain: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plain.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    hash_password(plain).eq_ignore_ascii_case(stored_hash.trim())
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(token: Uuid) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax")
}

/// `Set-Cookie` value that expires the session cookie
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

/// Session token from the request's `Cookie` headers, if present and well formed
pub fn read_session_cookie(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, token)| Uuid::parse_str(token.trim()).ok())
}

/// Authenticated administrator, extracted from the session cookie
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: Uuid,
    pub admin_id: Uuid,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let token = read_session_cookie(&parts.headers).ok_or(AppError::Unauthorized)?;

        let session = queries::find_session(&state.db, token)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(AdminSession {
            token: session.token,
            admin_id: session.admin_id,
            username: session.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_hash_password_is_hex_sha256() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_password() {
        let stored = hash_password("s3cret");
        assert!(verify_password("s3cret", &stored));
        assert!(verify_password("s3cret", &stored.to_uppercase()));
        assert!(!verify_password("S3cret", &stored));
    }

    #[test]
    fn test_read_session_cookie_among_others() {
        let token = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {SESSION_COOKIE}={token}; lang=es")).unwrap(),
        );
        assert_eq!(read_session_cookie(&headers), Some(token));
    }

    #[test]
    fn test_read_session_cookie_missing_or_malformed() {
        let mut headers = HeaderMap::new();
        assert_eq!(read_session_cookie(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("admin_session=not-a-uuid"),
        );
        assert_eq!(read_session_cookie(&headers), None);
    }

    #[test]
    fn test_session_cookie_round_trip() {
        let token = Uuid::new_v4();
        let set_cookie = session_cookie(token);
        let pair = set_cookie.split(';').next().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(pair).unwrap());
        assert_eq!(read_session_cookie(&headers), Some(token));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
