use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Email, Product};

/// Lifecycle of an order.
///
/// ```text
/// PENDING ──> ACCEPTED ──> DELIVERING ──> DELIVERED
///    │            │             │
///    └────────────┴─────────────┴──> REJECTED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    Delivering,
    Delivered,
}

/// A status change that is not an edge of the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot move order from {from} to {to}")]
pub struct InvalidTransition {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Rejected,
        OrderStatus::Delivering,
        OrderStatus::Delivered,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Accepted => "ACCEPTED",
            OrderStatus::Rejected => "REJECTED",
            OrderStatus::Delivering => "DELIVERING",
            OrderStatus::Delivered => "DELIVERED",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Rejected | OrderStatus::Delivered)
    }

    pub fn can_transition_to(self, requested: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, requested),
            (Pending, Accepted)
                | (Pending, Rejected)
                | (Accepted, Delivering)
                | (Accepted, Rejected)
                | (Delivering, Delivered)
                | (Delivering, Rejected)
        )
    }

    /// The status after applying `requested`, if that edge exists.
    pub fn next(self, requested: OrderStatus) -> Result<OrderStatus, InvalidTransition> {
        if self.can_transition_to(requested) {
            Ok(requested)
        } else {
            Err(InvalidTransition {
                from: self,
                to: requested,
            })
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "UPI")]
    Upi,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
}

/// One product reference in an order. Not a copy of the product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Purchaser identity captured at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchaser {
    pub name: String,
    pub email: Email,
    pub contact_number: String,
}

/// Manual payment: method plus the customer-supplied transaction reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub payment_method: PaymentMethod,
    pub reference_number: u64,
}

/// Represents a customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub line_items: Vec<LineItem>,
    /// Whole rupees.
    pub total_cost: u64,
    #[serde(flatten)]
    pub payment: PaymentDetails,
    #[serde(flatten)]
    pub purchaser: Purchaser,
    pub address: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Case-insensitive substring match over name, email, contact number, id and status.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.purchaser.name.to_lowercase().contains(&term)
            || self.purchaser.email.as_str().contains(&term)
            || self.purchaser.contact_number.to_lowercase().contains(&term)
            || self.id.to_lowercase().contains(&term)
            || self.status.as_str().to_lowercase().contains(&term)
    }
}

/// Payload for creating a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    #[serde(alias = "products")]
    pub line_items: Vec<LineItem>,
    pub total_cost: u64,
    #[serde(flatten)]
    pub payment: PaymentDetails,
    #[serde(flatten)]
    pub purchaser: Purchaser,
    pub address: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Answer to a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// A line item joined with its product, `None` once the product is deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLineItem {
    pub product_id: String,
    pub quantity: u32,
    pub product: Option<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<ResolvedLineItem>,
}
