use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Roles a user account can hold. Stored lowercase in Mongo and in JWT claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Farmer,
    Delivery,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Farmer => "farmer",
            Role::Delivery => "delivery",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            "farmer" => Some(Role::Farmer),
            "delivery" => Some(Role::Delivery),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Approval state of a user's custom referral code request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeRequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub reset_token: Option<String>,
    #[serde(default)]
    pub reset_expires: Option<bson::DateTime>,
    /// Reward-point balance accrued via referrals.
    #[serde(default)]
    pub coins: i64,
    /// Unique per-user share code, generated lazily or at registration.
    #[serde(default)]
    pub referral_code: Option<String>,
    /// Back-reference to the referrer. Immutable once set.
    #[serde(default)]
    pub referred_by: Option<ObjectId>,
    #[serde(default)]
    pub requested_code: Option<String>,
    #[serde(default)]
    pub requested_code_status: Option<CodeRequestStatus>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl User {
    pub fn new(name: String, email: String, role: Role) -> Self {
        User {
            id: None,
            name,
            email,
            phone: None,
            password_hash: String::new(),
            role,
            address: None,
            is_active: true,
            avatar: None,
            reset_token: None,
            reset_expires: None,
            coins: 0,
            referral_code: None,
            referred_by: None,
            requested_code: None,
            requested_code_status: None,
            created_at: None,
            updated_at: None,
        }
    }
}
