use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Credential Hashing
// =============================================================================

/// Hash a password for storage.
///
/// The normalized email acts as a per-user salt and the server-side pepper
/// (environment variable, never stored) protects against rainbow tables if
/// the database leaks.
///
/// `hash = SHA256(email ":" password ":" pepper)`, hex encoded
pub fn hash_password(email: &str, password: &str, pepper: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hasher.update(b":");
    hasher.update(pepper.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a password against a stored hash
pub fn verify_password(email: &str, password: &str, pepper: &str, stored_hash: &str) -> bool {
    // Compare through HMAC verification to keep the comparison constant-time
    let computed = hash_password(email, password, pepper);
    let mut mac = match HmacSha256::new_from_slice(pepper.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(computed.as_bytes());
    let tag = mac.finalize().into_bytes();

    let mut expected = match HmacSha256::new_from_slice(pepper.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    expected.update(stored_hash.as_bytes());
    expected.verify_slice(&tag).is_ok()
}

// =============================================================================
// Session Tokens
// =============================================================================

/// Sign a payload with HMAC-SHA256, returning the hex signature
fn sign_payload(payload: &str, secret: &str) -> Option<String> {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return None;
        }
    };
    mac.update(payload.as_bytes());
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verify an HMAC-SHA256 hex signature over a payload
pub fn verify_hmac(payload: &str, signature: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };
    mac.update(payload.as_bytes());

    let sig_bytes = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Invalid hex signature format");
            return false;
        }
    };

    mac.verify_slice(&sig_bytes).is_ok()
}

/// Issue a stateless session token: `uid.expires_at.signature`.
///
/// The uid is a UUID and the expiry a Unix timestamp, so the last `.`
/// always separates the signature.
pub fn issue_session_token(uid: &str, expires_at: i64, secret: &str) -> Option<String> {
    let payload = format!("{uid}.{expires_at}");
    let signature = sign_payload(&payload, secret)?;
    Some(format!("{payload}.{signature}"))
}

/// Verify a session token and return the uid it was issued to.
/// Returns None for malformed, tampered, or expired tokens.
pub fn verify_session_token(token: &str, secret: &str, now: i64) -> Option<String> {
    let (payload, signature) = token.rsplit_once('.')?;
    let (uid, expires_at) = payload.rsplit_once('.')?;
    let expires_at: i64 = expires_at.parse().ok()?;

    if !verify_hmac(payload, signature, secret) {
        return None;
    }
    if expires_at <= now {
        return None;
    }

    Some(uid.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-session-secret";

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("ahmed@example.com", "correct horse", "pepper");
        assert!(verify_password("ahmed@example.com", "correct horse", "pepper", &hash));
        assert!(!verify_password("ahmed@example.com", "wrong", "pepper", &hash));
        assert!(!verify_password("other@example.com", "correct horse", "pepper", &hash));
        assert!(!verify_password("ahmed@example.com", "correct horse", "other", &hash));
    }

    #[test]
    fn test_token_roundtrip() {
        let uid = "0192d3a4-0000-7000-8000-000000000001";
        let token = issue_session_token(uid, 4_102_444_800, SECRET).unwrap();
        assert_eq!(
            verify_session_token(&token, SECRET, 1_000_000),
            Some(uid.to_string())
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_session_token("uid-1", 1_000, SECRET).unwrap();
        assert_eq!(verify_session_token(&token, SECRET, 1_000), None);
        assert_eq!(verify_session_token(&token, SECRET, 2_000), None);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let token = issue_session_token("uid-1", 4_102_444_800, SECRET).unwrap();
        let forged = token.replace("uid-1", "uid-2");
        assert_eq!(verify_session_token(&forged, SECRET, 0), None);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_session_token("uid-1", 4_102_444_800, SECRET).unwrap();
        assert_eq!(verify_session_token(&token, "other-secret", 0), None);
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert_eq!(verify_session_token("", SECRET, 0), None);
        assert_eq!(verify_session_token("no-dots-here", SECRET, 0), None);
        assert_eq!(verify_session_token("a.b.c", SECRET, 0), None);
    }
}
