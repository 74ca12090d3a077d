use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Immutable record of a referral grant: who referred whom and the reward
/// amounts credited at that moment. Never recomputed later.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub code: String,
    pub referrer: ObjectId,
    pub referred: ObjectId,
    pub reward_referrer: i64,
    pub reward_referred: i64,
    pub created_at: Option<String>,
}
