use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Mitra,
    Admin,
}

impl Role {
    /// Parse the role column; `None` marks an unknown role string, which the
    /// router surfaces as the invalid-role screen instead of a dashboard.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "user" => Some(Role::User),
            "mitra" => Some(Role::Mitra),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Mitra => "mitra",
            Role::Admin => "admin",
        }
    }
}

/// Row of `profiles`, keyed 1:1 to the store's auth identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Profile {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

/// Customer extension row (`user_profiles`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: Uuid,
    #[serde(default)]
    pub balance: i64,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Partner extension row (`mitra_profiles`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MitraProfile {
    pub mitra_id: Uuid,
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub is_active: bool,
    pub description: Option<String>,
    #[serde(default)]
    pub service_types: Option<Vec<String>>,
    pub profile_image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_known_strings_only() {
        assert_eq!(Role::parse("user"), Some(Role::User));
        assert_eq!(Role::parse("mitra"), Some(Role::Mitra));
        assert_eq!(Role::parse("admin"), Some(Role::Admin));
        assert_eq!(Role::parse("superadmin"), None);
        assert_eq!(Role::parse(""), None);
    }
}
