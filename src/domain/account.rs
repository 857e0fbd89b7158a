// src/domain/account.rs
//
// Account-side entities: roles, viewing profiles and the plan reference
// table. Users themselves live behind the auth repository capability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role. Anything the store hands back that is not "admin" is
/// treated as a regular user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn parse(value: &str) -> Role {
        match value {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// A viewing profile under a user account.
///
/// A user without any profile gets one named "Profile 1" provisioned
/// lazily the first time a profile-scoped write needs it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub avatar_url: String,
    pub is_kid: bool,
    pub created_at: DateTime<Utc>,
}

pub const DEFAULT_PROFILE_NAME: &str = "Profile 1";

/// A subscription plan row (small reference table, seeded once if empty).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: i64,
    pub name: String,
    pub price_month: f64,
    pub duration_days: i64,
    pub max_profiles: i64,
    pub max_quality: String,
}
