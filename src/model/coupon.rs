use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Unique, stored uppercased.
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Percentage discount in [0, 100].
    pub discount_percent: f64,
    pub is_active: bool,
    #[serde(default)]
    pub expires_at: Option<bson::DateTime>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
