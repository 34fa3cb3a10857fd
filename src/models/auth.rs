use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of a password grant against the identity backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token grant returned by the identity backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: Option<i64>,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl TokenResponse {
    /// Convert the grant into a session, deriving the expiry from `expires_in`
    /// when the backend omits `expires_at`.
    pub fn into_session(self, now: i64) -> Session {
        let expires_at = self.expires_at.unwrap_or(now + self.expires_in);
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type,
            expires_at,
            user: self.user,
        }
    }
}

/// Identity record owned by the identity backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

/// An active authentication grant. Replaced wholesale, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Unix seconds
    pub expires_at: i64,
    pub user: User,
}

impl Session {
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at <= now + margin_secs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEventKind {
    #[allow(dead_code)]
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    #[allow(dead_code)]
    UserUpdated,
}

impl std::fmt::Display for AuthEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthEventKind::InitialSession => write!(f, "INITIAL_SESSION"),
            AuthEventKind::SignedIn => write!(f, "SIGNED_IN"),
            AuthEventKind::SignedOut => write!(f, "SIGNED_OUT"),
            AuthEventKind::TokenRefreshed => write!(f, "TOKEN_REFRESHED"),
            AuthEventKind::UserUpdated => write!(f, "USER_UPDATED"),
        }
    }
}

/// Change notification posted by the identity backend
#[derive(Debug, Clone)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub session: Option<Session>,
}

/// Row of the `profiles` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub employee_id: String,
    pub role: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Row of the `user_credentials` table, name column only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub name: Option<String>,
}

pub const UNKNOWN_NAME: &str = "Unknown";

/// Employee profile shown on the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub employee_id: String,
    pub role: String,
    pub name: String,
    pub profile_pic: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Merge the profile row with the display name from the credentials table.
    pub fn from_records(record: ProfileRecord, credentials: Option<CredentialRecord>) -> Self {
        let name = credentials
            .and_then(|c| c.name)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());

        Profile {
            employee_id: record.employee_id,
            role: record.role,
            name,
            profile_pic: None,
            created_at: record.created_at,
        }
    }

    /// Roles allowed through the admin login tab
    pub fn is_admin(&self) -> bool {
        matches!(self.role.as_str(), "admin" | "superadmin" | "superadmin-it")
    }

    pub fn role_label(&self) -> &str {
        match self.role.as_str() {
            "employee" => "Employee",
            "admin" => "Admin",
            "superadmin" => "Superadmin",
            "superadmin-it" => "Superadmin IT",
            other => other,
        }
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }

    pub fn initials(&self) -> String {
        self.name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(|c| c.to_uppercase())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProfileRecord {
        ProfileRecord {
            employee_id: "EMP1".to_string(),
            role: "employee".to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_profile_merges_name() {
        let profile = Profile::from_records(
            record(),
            Some(CredentialRecord { name: Some("A. Smith".to_string()) }),
        );
        assert_eq!(profile.employee_id, "EMP1");
        assert_eq!(profile.role, "employee");
        assert_eq!(profile.name, "A. Smith");
        assert!(profile.profile_pic.is_none());
    }

    #[test]
    fn test_profile_name_defaults_to_unknown() {
        assert_eq!(Profile::from_records(record(), None).name, UNKNOWN_NAME);
        let blank = Some(CredentialRecord { name: Some("  ".to_string()) });
        assert_eq!(Profile::from_records(record(), blank).name, UNKNOWN_NAME);
        let missing = Some(CredentialRecord { name: None });
        assert_eq!(Profile::from_records(record(), missing).name, UNKNOWN_NAME);
    }

    #[test]
    fn test_initials_and_first_name() {
        let mut profile = Profile::from_records(record(), None);
        profile.name = "john van smith".to_string();
        assert_eq!(profile.initials(), "JVS");
        assert_eq!(profile.first_name(), "john");
    }

    #[test]
    fn test_admin_roles() {
        let mut profile = Profile::from_records(record(), None);
        assert!(!profile.is_admin());
        for role in ["admin", "superadmin", "superadmin-it"] {
            profile.role = role.to_string();
            assert!(profile.is_admin());
        }
        profile.role = "contractor".to_string();
        assert_eq!(profile.role_label(), "contractor");
    }

    #[test]
    fn test_token_response_into_session() {
        let json = serde_json::json!({
            "access_token": "at",
            "refresh_token": "rt",
            "expires_in": 3600,
            "user": { "id": "00000000-0000-0000-0000-000000000001", "email": "EMP1@company.com" }
        });
        let response: TokenResponse = serde_json::from_value(json).unwrap();
        let session = response.into_session(1_000);

        assert_eq!(session.expires_at, 4_600);
        assert_eq!(session.token_type, "bearer");
        assert_eq!(session.user.id, Uuid::from_u128(1));
        assert!(!session.expires_within(1_000, 30));
        assert!(session.expires_within(4_580, 30));
    }

    #[test]
    fn test_profile_record_parses_backend_timestamp() {
        let json = serde_json::json!({
            "employee_id": "EMP1",
            "role": "admin",
            "created_at": "2024-06-20T10:00:00.123456+00:00"
        });
        let record: ProfileRecord = serde_json::from_value(json).unwrap();
        assert!(record.created_at.is_some());
    }
}
