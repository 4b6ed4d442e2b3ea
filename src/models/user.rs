use serde::{Deserialize, Serialize};

use crate::constants::ADMIN_ROLE;

/// User profile document stored in redb, keyed by uid.
/// Uses Unix timestamps for compact storage with bincode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    /// Normalized (trimmed, lowercased) email
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub avatar_url: Option<String>,
    /// Peppered SHA-256 of the credentials, hex encoded
    pub password_hash: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Role document, keyed by uid. Written out-of-band; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleRecord {
    pub role: String,
}

impl RoleRecord {
    pub fn grants_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// User profile as exposed by the API (no credentials)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: i64,
}

impl Profile {
    pub fn from_record(id: String, record: &UserRecord) -> Self {
        Self {
            id,
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            birth_date: record.birth_date.clone(),
            avatar_url: record.avatar_url.clone(),
            created_at: record.created_at,
        }
    }
}

/// Normalize an email address for storage and index lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal shape check for an email address
pub fn validate_email(email: &str) -> bool {
    let email = email.trim();
    if email.len() < 5 || email.len() > 254 {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ahmed@example.com"));
        assert!(validate_email("  a@b.co  "));

        assert!(!validate_email("no-at-sign.com"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("user@nodot"));
        assert!(!validate_email("user@.com"));
        assert!(!validate_email("a@b"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ahmed@Example.COM "), "ahmed@example.com");
    }

    #[test]
    fn test_role_grants_admin_exact_literal_only() {
        let admin = RoleRecord { role: "admin".to_string() };
        assert!(admin.grants_admin());

        let editor = RoleRecord { role: "editor".to_string() };
        assert!(!editor.grants_admin());

        let cased = RoleRecord { role: "Admin".to_string() };
        assert!(!cased.grants_admin());
    }
}
