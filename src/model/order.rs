use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Order lifecycle states. Transitions are enforced through
/// [`OrderStatus::can_transition_to`] rather than allowing arbitrary
/// overwrites of the stored status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Placed,
    Confirmed,
    #[serde(rename = "Out for delivery")]
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::OutForDelivery => "Out for delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<OrderStatus> {
        match s {
            "Placed" => Some(OrderStatus::Placed),
            "Confirmed" => Some(OrderStatus::Confirmed),
            "Out for delivery" => Some(OrderStatus::OutForDelivery),
            "Delivered" => Some(OrderStatus::Delivered),
            "Cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Legal forward edges of the lifecycle. Delivered and Cancelled are
    /// terminal; writing the current status again is an idempotent no-op
    /// (assignment already moves an order to "Out for delivery", so a
    /// subsequent pickup confirmation must not fail).
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        if *self == next {
            return true;
        }
        matches!(
            (*self, next),
            (Placed, Confirmed)
                | (Placed, OutForDelivery)
                | (Placed, Cancelled)
                | (Confirmed, OutForDelivery)
                | (Confirmed, Cancelled)
                | (OutForDelivery, Delivered)
                | (OutForDelivery, Cancelled)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of a product line at placement time. Later price changes on the
/// product do not affect persisted orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: ObjectId,
    pub title: String,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user: ObjectId,
    pub items: Vec<OrderItem>,
    pub total: f64,
    #[serde(default)]
    pub discount_total: f64,
    pub final_total: f64,
    pub address: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub assigned_to: Option<ObjectId>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
