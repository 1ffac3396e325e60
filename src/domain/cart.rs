use serde::{Deserialize, Serialize};

use super::{LineItem, OrderCreate, PaymentDetails, Product, Purchaser};

/// A product line in the cart. Title, cost and cover are copied for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub title: String,
    pub cost: u64,
    pub image: Option<String>,
    pub quantity: u32,
}

/// Client-side shopping cart. Never persisted; checkout turns it into an
/// [`OrderCreate`] and the ledger takes over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds one unit, creating the line on first add.
    pub fn add(&mut self, product: &Product) {
        if let Some(item) = self.items.iter_mut().find(|item| item.product_id == product.id) {
            item.quantity = item.quantity.saturating_add(1);
            return;
        }
        self.items.push(CartItem {
            product_id: product.id.clone(),
            title: product.title.clone(),
            cost: product.cost,
            image: product.cover_image().map(str::to_string),
            quantity: 1,
        });
    }

    /// Sets the quantity of a line; zero removes it.
    pub fn update_quantity(&mut self, product_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(product_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.product_id == product_id) {
            item.quantity = quantity;
        }
    }

    pub fn remove(&mut self, product_id: &str) {
        self.items.retain(|item| item.product_id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of cost × quantity. Saturates at `u64::MAX`; the ledger rejects
    /// such a total when it re-prices the order.
    pub fn total(&self) -> u64 {
        self.items.iter().fold(0u64, |total, item| {
            total.saturating_add(item.cost.saturating_mul(u64::from(item.quantity)))
        })
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        self.items
            .iter()
            .map(|item| LineItem::new(item.product_id.clone(), item.quantity))
            .collect()
    }

    /// Builds the order payload. The cart stays intact so a failed
    /// submission can be retried.
    pub fn checkout(
        &self,
        purchaser: Purchaser,
        payment: PaymentDetails,
        address: impl Into<String>,
        user_id: Option<String>,
    ) -> OrderCreate {
        OrderCreate {
            line_items: self.line_items(),
            total_cost: self.total(),
            payment,
            purchaser,
            address: address.into(),
            user_id,
        }
    }
}
