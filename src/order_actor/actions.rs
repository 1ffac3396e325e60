use crate::domain::OrderStatus;

/// Custom actions for Order entities.
///
/// Status is the only field that changes after an order is placed, and it
/// only changes through these actions.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
    /// Moves the order along the lifecycle.
    ///
    /// # Errors
    /// Fails with `InvalidTransition` when the edge does not exist.
    TransitionTo(OrderStatus),
}
