//! Explicit authentication state shared by the route guard and the HTTP backend.

use std::sync::{Arc, RwLock};

use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    #[allow(dead_code)]
    exp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Missing,
    Valid,
    Expired,
    /// Not a JWT, or a JWT without `exp`; the backend remains the judge.
    Opaque,
}

/// Session token holder.
///
/// Cloning is cheap and every clone observes the same state: the GUI keeps
/// one handle for the guard while the backend worker keeps another for
/// request authorization.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    token: Arc<RwLock<Option<String>>>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.sign_in(token);
        session
    }

    pub fn sign_in(&self, token: impl Into<String>) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.into());
        info!("session: signed in");
    }

    pub fn sign_out(&self) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        if guard.take().is_some() {
            info!("session: signed out");
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn status(&self) -> TokenStatus {
        match self.token() {
            None => TokenStatus::Missing,
            Some(token) => token_status(&token),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.status(), TokenStatus::Valid | TokenStatus::Opaque)
    }
}

fn token_status(token: &str) -> TokenStatus {
    if token.trim().is_empty() {
        return TokenStatus::Missing;
    }

    // The signing key lives on the server; only `exp` is checked here.
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = true;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    match decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(_) => TokenStatus::Valid,
        Err(err) => match err.kind() {
            ErrorKind::ExpiredSignature => TokenStatus::Expired,
            other => {
                debug!("session: token is not a readable jwt: {other:?}");
                TokenStatus::Opaque
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[derive(Serialize)]
    struct Claims {
        sub: String,
        exp: u64,
    }

    fn token_expiring_in(offset_secs: i64) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_secs() as i64;
        let claims = Claims {
            sub: "doctor".to_string(),
            exp: (now + offset_secs) as u64,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .expect("encode")
    }

    #[test]
    fn empty_session_is_not_authenticated() {
        let session = AuthSession::new();
        assert_eq!(session.status(), TokenStatus::Missing);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn unexpired_jwt_is_valid_and_expired_jwt_is_rejected() {
        let session = AuthSession::with_token(token_expiring_in(3600));
        assert_eq!(session.status(), TokenStatus::Valid);
        assert!(session.is_authenticated());

        session.sign_in(token_expiring_in(-3600));
        assert_eq!(session.status(), TokenStatus::Expired);
        assert!(!session.is_authenticated());
    }

    #[test]
    fn opaque_tokens_are_left_to_the_server() {
        let session = AuthSession::with_token("not-a-jwt");
        assert_eq!(session.status(), TokenStatus::Opaque);
        assert!(session.is_authenticated());
    }

    #[test]
    fn clones_share_state_and_sign_out_clears_it() {
        let session = AuthSession::with_token("abc");
        let worker_handle = session.clone();
        session.sign_out();
        assert_eq!(worker_handle.token(), None);
        assert!(!worker_handle.is_authenticated());
    }
}
