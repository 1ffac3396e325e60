use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::actor_framework::{ResourceActor, ResourceClient};
use crate::clients::{AdminClient, OrderClient, ProductClient, UserClient};
use crate::config::StorefrontConfig;
use crate::domain::{Order, Product, User};
use crate::images::{ImageStore, NoopImageStore};

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("actor task failed: {0}")]
    ActorTaskFailed(String),
}

/// Sequential ids such as `product_1`, `product_2`.
fn sequential_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || {
        let id = counter.fetch_add(1, Ordering::SeqCst);
        format!("{}_{}", prefix, id)
    }
}

/// The storefront: one actor per collection plus the clients wired on top.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct StorefrontSystem {
    pub product_client: ProductClient,
    pub user_client: UserClient,
    pub order_client: OrderClient,
    pub admin_client: AdminClient,
    products: ResourceClient<Product>,
    users: ResourceClient<User>,
    orders: ResourceClient<Order>,
    handles: Vec<JoinHandle<()>>,
}

impl StorefrontSystem {
    pub fn new(config: &StorefrontConfig) -> Self {
        Self::with_image_store(config, Arc::new(NoopImageStore))
    }

    pub fn with_image_store(config: &StorefrontConfig, images: Arc<dyn ImageStore>) -> Self {
        let policy = Arc::new(config.access_policy());
        if !policy.is_configured() {
            warn!("Admin allow-list is empty, privileged operations will be denied");
        }
        let buffer = config.channel_buffer;
        let timeout = config.store_timeout;

        // 1. Catalog
        let (product_actor, products) = ResourceActor::<Product>::new(buffer, timeout, sequential_ids("product"));
        let product_handle = tokio::spawn(product_actor.run());
        let product_client = ProductClient::new(products.clone(), images);

        // 2. User directory
        let (user_actor, users) = ResourceActor::<User>::new(buffer, timeout, sequential_ids("user"));
        let user_handle = tokio::spawn(user_actor.run());
        let user_client = UserClient::new(users.clone(), policy.clone());

        // 3. Order ledger, priced against the catalog
        let (order_actor, orders) = ResourceActor::<Order>::new(buffer, timeout, sequential_ids("order"));
        let order_handle = tokio::spawn(order_actor.run());
        let order_client = OrderClient::new(
            orders.clone(),
            product_client.clone(),
            user_client.clone(),
            policy.clone(),
        );

        let admin_client = AdminClient::new(
            product_client.clone(),
            order_client.clone(),
            user_client.clone(),
            policy,
        );

        info!(buffer, timeout_ms = timeout.as_millis() as u64, "Storefront system started");
        Self {
            product_client,
            user_client,
            order_client,
            admin_client,
            products,
            users,
            orders,
            handles: vec![product_handle, user_handle, order_handle],
        }
    }

    /// Stops every actor once its queued requests are served. Clients still
    /// held elsewhere get `ActorCommunicationError` afterwards.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");
        if let Err(e) = self.products.shutdown().await {
            warn!(error = %e, "Catalog actor already stopped");
        }
        if let Err(e) = self.users.shutdown().await {
            warn!(error = %e, "User actor already stopped");
        }
        if let Err(e) = self.orders.shutdown().await {
            warn!(error = %e, "Order actor already stopped");
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::ActorTaskFailed(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
