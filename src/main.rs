use std::error::Error;

use tracing::{error, info, Instrument};

use storefront::app_system::{setup_tracing, StorefrontSystem};
use storefront::config::StorefrontConfig;
use storefront::domain::{
    Cart, Email, OrderStatus, PaymentDetails, PaymentMethod, ProductCreate, Purchaser, TyreFilter, TYRE_CATEGORY,
};

fn tyre(title: &str, size: &str, models: &[&str], cost: u64) -> ProductCreate {
    ProductCreate {
        title: title.to_string(),
        description: "Tubeless radial".to_string(),
        images: vec![format!("https://cdn.example.com/{}.png", title.replace(' ', "-"))],
        cost,
        category: TYRE_CATEGORY.to_string(),
        tyre_size: Some(size.to_string()),
        tyre_model: models.iter().map(|m| m.to_string()).collect(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = StorefrontConfig::from_env()?;
    setup_tracing(&config.log_filter);

    info!("Starting storefront");
    let system = StorefrontSystem::new(&config);

    // Use the first allow-listed address as the acting admin
    let admin = config
        .admin_emails
        .split(',')
        .map(Email::new)
        .find(|email| !email.is_empty())
        .unwrap_or_else(|| Email::new("owner@example.com"));

    let span = tracing::info_span!("catalog_setup");
    let tyre_ids = async {
        let mut ids = Vec::new();
        for payload in [
            tyre("Tyre X", "195/65R15", &["Civic"], 3200),
            tyre("Tyre Y", "205/55R16", &["Accord", "City"], 4100),
        ] {
            match system.admin_client.create_product(&admin, payload).await {
                Ok(id) => ids.push(id),
                Err(e) => error!(error = %e, "Product creation failed"),
            }
        }
        ids
    }
    .instrument(span)
    .await;

    let listing = system.product_client.list_tyres(TyreFilter::default().model("Civic")).await?;
    info!(
        matches = listing.tyres.len(),
        sizes = ?listing.unique_sizes,
        "Tyres fitting a Civic"
    );

    let customer = Email::new("alice@example.com");
    let span = tracing::info_span!("first_login");
    let user_id = async {
        let created = system.user_client.upsert_on_first_login("Alice", &customer).await?;
        let user = system
            .user_client
            .find_by_email(&customer)
            .await?
            .ok_or_else(|| "user missing after upsert".to_string())?;
        if created.is_some() && system.user_client.needs_phone_completion(user.id.clone()).await? {
            system.user_client.set_phone(user.id.clone(), "9876543210".to_string()).await?;
        }
        Ok::<_, Box<dyn Error>>(user.id)
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("order_processing");
    let order_result = async {
        let mut cart = Cart::new();
        for id in &tyre_ids {
            let product = system.product_client.get_product(id.clone()).await?;
            cart.add(&product);
        }
        if let Some(first) = tyre_ids.first() {
            cart.update_quantity(first, 4);
        }
        let payload = cart.checkout(
            Purchaser {
                name: "Alice".to_string(),
                email: customer.clone(),
                contact_number: "9876543210".to_string(),
            },
            PaymentDetails {
                payment_method: PaymentMethod::Upi,
                reference_number: 412345678901,
            },
            "12 Market Road, Jamnagar",
            Some(user_id),
        );
        let order_id = system.order_client.create_order(payload).await?;
        cart.clear();
        Ok::<_, Box<dyn Error>>(order_id)
    }
    .instrument(span)
    .await;

    match order_result {
        Ok(order_id) => {
            info!(order_id = %order_id, "Order processed successfully");
            let change = system
                .admin_client
                .update_order_status(&admin, order_id, OrderStatus::Accepted)
                .await;
            match change {
                Ok(change) => info!(from = %change.from, to = %change.to, "Order accepted"),
                Err(e) => error!(error = %e, "Status update failed"),
            }
        }
        Err(e) => error!(error = %e, "Order processing failed"),
    }

    let mine = system.order_client.list_orders_by_email(&customer).await?;
    info!(order_count = mine.len(), "Orders for customer");

    system.shutdown().await?;
    info!("Storefront stopped");
    Ok(())
}
