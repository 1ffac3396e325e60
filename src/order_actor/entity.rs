use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderStatus, StatusChange};
use super::actions::OrderAction;
use super::error::OrderError;

impl Entity for Order {
    type Id = String;
    type CreatePayload = OrderCreate;
    type Patch = (); // placed orders are immutable apart from status
    type Action = OrderAction;
    type ActionResult = StatusChange;
    type Error = OrderError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Order from creation parameters.
    ///
    /// # Notes
    /// The order always starts at `PENDING`, whatever the caller sent.
    fn from_create(id: String, params: OrderCreate) -> Result<Self, OrderError> {
        validate(&params)?;
        Ok(Self {
            id,
            line_items: params.line_items,
            total_cost: params.total_cost,
            payment: params.payment,
            purchaser: params.purchaser,
            address: params.address,
            status: OrderStatus::Pending,
            user_id: params.user_id,
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), OrderError> {
        Ok(())
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<StatusChange, OrderError> {
        match action {
            OrderAction::TransitionTo(requested) => {
                let from = self.status;
                self.status = from.next(requested)?;
                Ok(StatusChange { from, to: self.status })
            }
        }
    }
}

pub(crate) fn validate(params: &OrderCreate) -> Result<(), OrderError> {
    if params.line_items.is_empty() {
        return Err(OrderError::ValidationError("order has no line items".to_string()));
    }
    if let Some(item) = params.line_items.iter().find(|item| item.quantity == 0) {
        return Err(OrderError::ValidationError(format!(
            "quantity for {} must be at least 1",
            item.product_id
        )));
    }
    let required = [
        ("name", params.purchaser.name.as_str()),
        ("email", params.purchaser.email.as_str()),
        ("contact number", params.purchaser.contact_number.as_str()),
        ("address", params.address.as_str()),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(OrderError::ValidationError(format!("{} is required", field)));
        }
    }
    Ok(())
}
