use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::access::AccessPolicy;
use crate::actor_framework::ResourceClient;
use crate::clients::{ProductClient, UserClient};
use crate::domain::{Email, Order, OrderCreate, OrderDetails, OrderStatus, ResolvedLineItem, StatusChange};
use crate::order_actor::{entity::validate, OrderAction, OrderError};
use crate::product_actor::ProductError;
use crate::user_actor::UserError;

/// Client for the order ledger.
///
/// Order creation is orchestrated here: the payload is checked, every line
/// item is priced against the catalog and the submitted total must match
/// before anything reaches the ledger.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    product_client: ProductClient,
    user_client: UserClient,
    policy: Arc<AccessPolicy>,
}

impl_client_methods!(OrderClient, Order, OrderError, order);

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        product_client: ProductClient,
        user_client: UserClient,
        policy: Arc<AccessPolicy>,
    ) -> Self {
        Self {
            inner,
            product_client,
            user_client,
            policy,
        }
    }

    #[instrument(skip(self, order), fields(email = %order.purchaser.email, items = order.line_items.len()))]
    pub async fn create_order(&self, order: OrderCreate) -> Result<String, OrderError> {
        info!("Processing create_order request");
        validate(&order)?;

        // Step 1: price every line item against the catalog
        let computed = self.price(&order).await?;
        if computed != order.total_cost {
            error!(submitted = order.total_cost, computed, "Order total mismatch");
            return Err(OrderError::TotalMismatch {
                submitted: order.total_cost,
                computed,
            });
        }

        // Step 2: the user reference is kept even when it does not resolve
        if let Some(user_id) = &order.user_id {
            match self.user_client.get_user(user_id.clone()).await {
                Ok(user) => debug!(user_name = %user.name, "User reference resolved"),
                Err(UserError::NotFound(_)) => warn!(user_id = %user_id, "Order references unknown user"),
                Err(e) => warn!(error = %e, "User lookup failed, keeping reference"),
            }
        }

        // Step 3: insert into the ledger
        let id = self.inner.create(order).await?;
        info!(order_id = %id, "Order created successfully");
        Ok(id)
    }

    async fn price(&self, order: &OrderCreate) -> Result<u64, OrderError> {
        let mut total: u64 = 0;
        for item in &order.line_items {
            let product = match self.product_client.get_product(item.product_id.clone()).await {
                Ok(product) => product,
                Err(ProductError::NotFound(id)) => {
                    error!(product_id = %id, "Product not found");
                    return Err(OrderError::InvalidProduct(id));
                }
                Err(e) => {
                    error!(error = %e, "Product lookup failed");
                    return Err(OrderError::Catalog(e));
                }
            };
            total = product
                .cost
                .checked_mul(u64::from(item.quantity))
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| OrderError::ValidationError("order total overflows".to_string()))?;
        }
        Ok(total)
    }

    /// Orders placed with `email`, in storage order.
    #[instrument(skip(self))]
    pub async fn list_orders_by_email(&self, email: &Email) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let email = email.clone();
        Ok(self.inner.list(move |order: &Order| order.purchaser.email == email).await?)
    }

    /// Every order, newest first. Allow-listed requesters only.
    #[instrument(skip(self))]
    pub async fn list_all_orders(&self, requester: &Email) -> Result<Vec<Order>, OrderError> {
        self.policy.authorize(requester)?;
        let orders = newest_first(self.all_orders().await?);
        info!(order_count = orders.len(), "Listed orders");
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn search_orders(&self, requester: &Email, term: String) -> Result<Vec<Order>, OrderError> {
        self.policy.authorize(requester)?;
        let orders = self.inner.list(move |order: &Order| order.matches_search(&term)).await?;
        Ok(newest_first(orders))
    }

    /// Moves the order along its lifecycle. Illegal edges leave it untouched.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, id: String, status: OrderStatus) -> Result<StatusChange, OrderError> {
        debug!("Sending request");
        let change = self.inner.perform_action(id, OrderAction::TransitionTo(status)).await?;
        info!(from = %change.from, to = %change.to, "Order status updated");
        Ok(change)
    }

    /// The order with each line item joined to its product. Products deleted
    /// since checkout come back as `None`.
    #[instrument(skip(self))]
    pub async fn order_details(&self, id: String) -> Result<OrderDetails, OrderError> {
        let order = self.get_order(id).await?;
        let mut items = Vec::with_capacity(order.line_items.len());
        for item in &order.line_items {
            let product = match self.product_client.get_product(item.product_id.clone()).await {
                Ok(product) => Some(product),
                Err(ProductError::NotFound(_)) => None,
                Err(e) => return Err(OrderError::Catalog(e)),
            };
            items.push(ResolvedLineItem {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                product,
            });
        }
        Ok(OrderDetails { order, items })
    }
}

/// Reverses storage order, then stable-sorts on `created_at` so orders
/// created in the same instant still come out newest first.
fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.reverse();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}
