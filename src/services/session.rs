use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when establishing a session
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Malformed Authorization header")]
    MalformedHeader,

    #[error("Invalid access token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by a backend-issued access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// An authenticated caller
///
/// Every backend call takes a `Session` explicitly; row level security on the
/// backend is evaluated against its access token. A session lives as long as
/// the request it was extracted from.
#[derive(Clone)]
pub struct Session {
    user_id: Uuid,
    email: Option<String>,
    access_token: String,
}

impl Session {
    pub fn new(user_id: Uuid, email: Option<String>, access_token: String) -> Self {
        Self {
            user_id,
            email,
            access_token,
        }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Verifies HS256 access tokens signed with the project's JWT secret
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    /// Audience the backend stamps on tokens of signed-in users
    pub const AUDIENCE: &'static str = "authenticated";

    pub fn new(jwt_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[Self::AUDIENCE]);

        Self {
            key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Verify a raw access token and open a session for its subject
    pub fn verify(&self, token: &str) -> Result<Session, SessionError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(Session::new(data.claims.sub, data.claims.email, token.to_string()))
    }

    /// Verify the value of an `Authorization: Bearer <token>` header
    pub fn from_authorization_header(&self, header: Option<&str>) -> Result<Session, SessionError> {
        let header = header.ok_or(SessionError::MissingToken)?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(SessionError::MalformedHeader)?;

        self.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-jwt-secret";

    fn token(claims: serde_json::Value, secret: &str) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn valid_claims(user_id: Uuid) -> serde_json::Value {
        json!({
            "sub": user_id,
            "aud": "authenticated",
            "exp": chrono::Utc::now().timestamp() + 3600,
            "role": "authenticated",
            "email": "walker@example.com",
        })
    }

    #[test]
    fn test_verify_valid_token() {
        let user_id = Uuid::new_v4();
        let verifier = SessionVerifier::new(SECRET);

        let session = verifier
            .from_authorization_header(Some(&format!("Bearer {}", token(valid_claims(user_id), SECRET))))
            .unwrap();

        assert_eq!(session.user_id(), user_id);
        assert_eq!(session.email(), Some("walker@example.com"));
    }

    #[test]
    fn test_rejects_wrong_secret() {
        let verifier = SessionVerifier::new(SECRET);
        let result = verifier.verify(&token(valid_claims(Uuid::new_v4()), "other-secret"));
        assert!(matches!(result, Err(SessionError::InvalidToken(_))));
    }

    #[test]
    fn test_rejects_expired_token() {
        let mut claims = valid_claims(Uuid::new_v4());
        claims["exp"] = json!(chrono::Utc::now().timestamp() - 3600);

        let verifier = SessionVerifier::new(SECRET);
        assert!(verifier.verify(&token(claims, SECRET)).is_err());
    }

    #[test]
    fn test_rejects_anonymous_audience() {
        let mut claims = valid_claims(Uuid::new_v4());
        claims["aud"] = json!("anon");

        let verifier = SessionVerifier::new(SECRET);
        assert!(verifier.verify(&token(claims, SECRET)).is_err());
    }

    #[test]
    fn test_header_shapes() {
        let verifier = SessionVerifier::new(SECRET);
        assert!(matches!(verifier.from_authorization_header(None), Err(SessionError::MissingToken)));
        assert!(matches!(
            verifier.from_authorization_header(Some("Basic abc")),
            Err(SessionError::MalformedHeader)
        ));
        assert!(matches!(
            verifier.from_authorization_header(Some("Bearer   ")),
            Err(SessionError::MalformedHeader)
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new(Uuid::nil(), None, "secret-token".to_string());
        assert!(!format!("{:?}", session).contains("secret-token"));
    }
}
