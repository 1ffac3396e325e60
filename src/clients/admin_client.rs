use std::sync::Arc;

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::access::{AccessError, AccessPolicy};
use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::domain::{Email, Order, OrderStatus, Product, ProductCreate, ProductPatch, StatusChange, User};
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::user_actor::UserError;

/// Errors surfaced by the admin facade.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdminError {
    #[error(transparent)]
    AccessDenied(#[from] AccessError),
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    User(#[from] UserError),
}

/// Privileged operations. Every call checks the requester against the
/// allow-list before touching a store.
#[derive(Clone)]
pub struct AdminClient {
    products: ProductClient,
    orders: OrderClient,
    users: UserClient,
    policy: Arc<AccessPolicy>,
}

impl AdminClient {
    pub fn new(products: ProductClient, orders: OrderClient, users: UserClient, policy: Arc<AccessPolicy>) -> Self {
        Self {
            products,
            orders,
            users,
            policy,
        }
    }

    pub fn is_admin(&self, email: &Email) -> bool {
        self.policy.is_authorized(email)
    }

    fn authorize(&self, requester: &Email) -> Result<(), AdminError> {
        self.policy.authorize(requester).map_err(|e| {
            warn!(error = %e, "Admin request rejected");
            AdminError::from(e)
        })
    }

    #[instrument(skip(self, product), fields(title = %product.title))]
    pub async fn create_product(&self, requester: &Email, product: ProductCreate) -> Result<String, AdminError> {
        self.authorize(requester)?;
        Ok(self.products.create_product(product).await?)
    }

    #[instrument(skip(self, patch))]
    pub async fn update_product(
        &self,
        requester: &Email,
        id: String,
        patch: ProductPatch,
    ) -> Result<Product, AdminError> {
        self.authorize(requester)?;
        Ok(self.products.update_product(id, patch).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, requester: &Email, id: String) -> Result<(), AdminError> {
        self.authorize(requester)?;
        Ok(self.products.delete_product(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn update_order_status(
        &self,
        requester: &Email,
        id: String,
        status: OrderStatus,
    ) -> Result<StatusChange, AdminError> {
        self.authorize(requester)?;
        let change = self.orders.update_order_status(id, status).await?;
        info!(admin = %requester, "Order status changed by admin");
        Ok(change)
    }

    pub async fn list_all_orders(&self, requester: &Email) -> Result<Vec<Order>, AdminError> {
        self.authorize(requester)?;
        Ok(self.orders.list_all_orders(requester).await?)
    }

    pub async fn list_all_users(&self, requester: &Email) -> Result<Vec<User>, AdminError> {
        self.authorize(requester)?;
        Ok(self.users.list_all_users(requester).await?)
    }

    #[instrument(skip(self))]
    pub async fn search_orders(&self, requester: &Email, term: String) -> Result<Vec<Order>, AdminError> {
        self.authorize(requester)?;
        Ok(self.orders.search_orders(requester, term).await?)
    }

    #[instrument(skip(self))]
    pub async fn search_users(&self, requester: &Email, term: String) -> Result<Vec<User>, AdminError> {
        self.authorize(requester)?;
        Ok(self.users.search_users(requester, term).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::{ResourceActor, DEFAULT_TIMEOUT};
    use crate::images::NoopImageStore;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn counter_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
        let counter = Arc::new(AtomicU64::new(1));
        move || format!("{}_{}", prefix, counter.fetch_add(1, Ordering::SeqCst))
    }

    fn start(allow_list: &str) -> (AdminClient, ProductClient) {
        let (admin, products, _) = start_with_users(allow_list);
        (admin, products)
    }

    fn start_with_users(allow_list: &str) -> (AdminClient, ProductClient, UserClient) {
        let policy = Arc::new(AccessPolicy::from_allow_list(allow_list));
        let (product_actor, product_inner) =
            ResourceActor::<Product>::new(16, DEFAULT_TIMEOUT, counter_ids("product"));
        let (user_actor, user_inner) = ResourceActor::<User>::new(16, DEFAULT_TIMEOUT, counter_ids("user"));
        let (order_actor, order_inner) = ResourceActor::<Order>::new(16, DEFAULT_TIMEOUT, counter_ids("order"));
        tokio::spawn(product_actor.run());
        tokio::spawn(user_actor.run());
        tokio::spawn(order_actor.run());

        let products = ProductClient::new(product_inner, Arc::new(NoopImageStore));
        let users = UserClient::new(user_inner, policy.clone());
        let orders = OrderClient::new(order_inner, products.clone(), users.clone(), policy.clone());
        (AdminClient::new(products.clone(), orders, users.clone(), policy), products, users)
    }

    fn wiper() -> ProductCreate {
        ProductCreate {
            title: "Wiper Blade".to_string(),
            description: "Pair".to_string(),
            images: vec!["https://img/wiper.png".to_string()],
            cost: 450,
            category: "Car Accessories".to_string(),
            tyre_size: None,
            tyre_model: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_non_admin_cannot_mutate_catalog() {
        let (admin, products) = start("owner@shop.in");
        let ann = Email::new("ann@x.com");

        let result = admin.create_product(&ann, wiper()).await;
        assert_eq!(result, Err(AdminError::AccessDenied(AccessError::Denied(ann.clone()))));
        assert!(products.list_products().await.unwrap().is_empty());

        let id = admin.create_product(&Email::new("OWNER@shop.in"), wiper()).await.unwrap();
        assert_eq!(
            admin.delete_product(&ann, id.clone()).await,
            Err(AdminError::AccessDenied(AccessError::Denied(ann)))
        );
        assert!(products.get_product(id).await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_mutations_reach_the_catalog() {
        let (admin, products) = start("owner@shop.in");
        let owner = Email::new("owner@shop.in");
        let id = admin.create_product(&owner, wiper()).await.unwrap();

        let patch = ProductPatch {
            cost: Some(500),
            ..ProductPatch::default()
        };
        let updated = admin.update_product(&owner, id.clone(), patch).await.unwrap();
        assert_eq!(updated.cost, 500);

        admin.delete_product(&owner, id.clone()).await.unwrap();
        assert_eq!(
            admin.delete_product(&owner, id.clone()).await,
            Err(AdminError::Product(ProductError::NotFound(id.clone())))
        );
        assert!(products.get_product(id).await.is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_policy_denies_admin() {
        let (admin, _) = start("");
        let owner = Email::new("owner@shop.in");
        assert!(!admin.is_admin(&owner));
        assert_eq!(
            admin.list_all_users(&owner).await,
            Err(AdminError::AccessDenied(AccessError::NotConfigured))
        );
        assert_eq!(
            admin.update_order_status(&owner, "order_1".to_string(), OrderStatus::Accepted).await,
            Err(AdminError::AccessDenied(AccessError::NotConfigured))
        );
    }

    #[tokio::test]
    async fn test_search_is_admin_only() {
        let (admin, _, users) = start_with_users("owner@shop.in");
        users.upsert_on_first_login("Ann", &Email::new("ann@x.com")).await.unwrap();
        users.upsert_on_first_login("Bob", &Email::new("bob@x.com")).await.unwrap();

        let owner = Email::new("owner@shop.in");
        let found = admin.search_users(&owner, "ann".to_string()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, Email::new("ann@x.com"));
        assert!(admin.search_orders(&owner, "ann".to_string()).await.unwrap().is_empty());

        let ann = Email::new("ann@x.com");
        assert_eq!(
            admin.search_users(&ann, "bob".to_string()).await,
            Err(AdminError::AccessDenied(AccessError::Denied(ann.clone())))
        );
        assert_eq!(
            admin.search_orders(&ann, "bob".to_string()).await,
            Err(AdminError::AccessDenied(AccessError::Denied(ann)))
        );
    }

    #[tokio::test]
    async fn test_is_admin_normalizes_email() {
        let (admin, _) = start("owner@shop.in");
        assert!(admin.is_admin(&Email::new(" Owner@Shop.IN ")));
        assert!(!admin.is_admin(&Email::new("ann@x.com")));
    }
}
