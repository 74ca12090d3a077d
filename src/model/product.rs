use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Vegetables,
    Fruits,
    Milk,
    Crops,
    Others,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Vegetables => "Vegetables",
            Category::Fruits => "Fruits",
            Category::Milk => "Milk",
            Category::Crops => "Crops",
            Category::Others => "Others",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub price: f64,
    /// Promotional price. Callers treat `discount_price ?? price` as the
    /// effective unit price; the schema does not enforce it is <= price.
    #[serde(default)]
    pub discount_price: Option<f64>,
    #[serde(default)]
    pub stock: i64,
    pub category: Category,
    /// Publication tri-state: unpublished -> pending -> published | declined.
    /// Admin-created products publish immediately, farmer submissions wait
    /// for review.
    pub is_published: bool,
    #[serde(default)]
    pub publish_requested: bool,
    #[serde(default)]
    pub is_declined: bool,
    #[serde(default)]
    pub created_by: Option<ObjectId>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Product {
    /// Unit price snapshotted onto order items at placement time.
    pub fn effective_price(&self) -> f64 {
        self.discount_price.unwrap_or(self.price)
    }
}
