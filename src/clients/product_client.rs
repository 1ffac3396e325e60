use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{
    distinct_categories, Product, ProductCreate, ProductPatch, TyreFilter, TyreListing, ALL_CATEGORIES,
};
use crate::images::{delete_best_effort, ImageStore};
use crate::product_actor::ProductError;

/// Client for the catalog store.
///
/// Product mutations here are unguarded; privileged callers go through
/// [`AdminClient`](super::AdminClient).
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
    images: Arc<dyn ImageStore>,
}

impl_client_methods!(ProductClient, Product, ProductError, product);

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>, images: Arc<dyn ImageStore>) -> Self {
        Self { inner, images }
    }

    #[instrument(skip(self, product), fields(title = %product.title, category = %product.category))]
    pub async fn create_product(&self, product: ProductCreate) -> Result<String, ProductError> {
        debug!("Sending request");
        let id = self.inner.create(product).await?;
        info!(product_id = %id, "Product created");
        Ok(id)
    }

    /// Patches a product. Images dropped by the patch are removed from the
    /// file host afterwards, best-effort.
    #[instrument(skip(self, patch))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        let previous = self.get_product(id.clone()).await?;
        let updated = self.inner.update(id, patch).await?;
        info!("Product updated");

        let dropped: Vec<String> = previous
            .images
            .into_iter()
            .filter(|uri| !updated.images.contains(uri))
            .collect();
        delete_best_effort(self.images.as_ref(), &dropped).await;
        Ok(updated)
    }

    /// Permanently deletes a product. Unknown ids are `NotFound`. Orders that
    /// reference the product are left as they are.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: String) -> Result<(), ProductError> {
        debug!("Sending request");
        let removed = self.inner.delete(id).await?;
        info!(title = %removed.title, "Product deleted");
        delete_best_effort(self.images.as_ref(), &removed.images).await;
        Ok(())
    }

    /// Every product in storage order. No pagination.
    pub async fn list_products(&self) -> Result<Vec<Product>, ProductError> {
        self.all_products().await
    }

    #[instrument(skip(self))]
    pub async fn list_tyres(&self, filter: TyreFilter) -> Result<TyreListing, ProductError> {
        debug!("Sending request");
        let tyres = self.inner.list(|product: &Product| product.is_tyre()).await?;
        let listing = filter.apply(tyres);
        info!(
            tyre_count = listing.tyres.len(),
            size_count = listing.unique_sizes.len(),
            model_count = listing.unique_models.len(),
            "Listed tyres"
        );
        Ok(listing)
    }

    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<String>, ProductError> {
        let products = self.all_products().await?;
        Ok(distinct_categories(&products))
    }

    /// Products in `category`; `None` or `"All"` returns the whole catalog.
    #[instrument(skip(self))]
    pub async fn list_by_category(&self, category: Option<String>) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        match category.filter(|c| c != ALL_CATEGORIES) {
            Some(category) => Ok(self.inner.list(move |product: &Product| product.category == category).await?),
            None => self.all_products().await,
        }
    }

    #[instrument(skip(self))]
    pub async fn search_products(&self, term: String) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        Ok(self.inner.list(move |product: &Product| product.matches_search(&term)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::{ResourceActor, DEFAULT_TIMEOUT};
    use crate::domain::TYRE_CATEGORY;
    use crate::images::ImageStoreError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingImageStore {
        deleted: Mutex<Vec<String>>,
        fail: bool,
    }

    #[async_trait]
    impl ImageStore for RecordingImageStore {
        async fn delete_files(&self, uris: &[String]) -> Result<(), ImageStoreError> {
            if self.fail {
                return Err(ImageStoreError::Request("host offline".to_string()));
            }
            self.deleted.lock().unwrap().extend(uris.iter().cloned());
            Ok(())
        }
    }

    fn start(images: Arc<dyn ImageStore>) -> ProductClient {
        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("product_{}", counter.fetch_add(1, Ordering::SeqCst));
        let (actor, inner) = ResourceActor::<Product>::new(16, DEFAULT_TIMEOUT, next_id);
        tokio::spawn(actor.run());
        ProductClient::new(inner, images)
    }

    fn tyre(title: &str, size: &str, models: &[&str]) -> ProductCreate {
        ProductCreate {
            title: title.to_string(),
            description: "Radial".to_string(),
            images: vec![format!("https://img/{}.png", title)],
            cost: 3000,
            category: TYRE_CATEGORY.to_string(),
            tyre_size: Some(size.to_string()),
            tyre_model: models.iter().map(|m| m.to_string()).collect(),
        }
    }

    fn item(title: &str, category: &str, cost: u64) -> ProductCreate {
        ProductCreate {
            title: title.to_string(),
            description: String::new(),
            images: vec![format!("https://img/{}.png", title), "https://img/side.png".to_string()],
            cost,
            category: category.to_string(),
            tyre_size: None,
            tyre_model: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_created_product_round_trips() {
        let client = start(Arc::new(RecordingImageStore::default()));
        let payload = item("Seat Cover", "Car Accessories", 1200);
        let id = client.create_product(payload.clone()).await.unwrap();

        let product = client.get_product(id.clone()).await.unwrap();
        assert_eq!(product.id, id);
        assert_eq!(product.title, payload.title);
        assert_eq!(product.description, payload.description);
        assert_eq!(product.images, payload.images);
        assert_eq!(product.cost, payload.cost);
        assert_eq!(product.category, payload.category);
        assert_eq!(product.cover_image(), Some("https://img/Seat Cover.png"));
    }

    #[tokio::test]
    async fn test_invalid_product_is_not_stored() {
        let client = start(Arc::new(RecordingImageStore::default()));
        let mut payload = item("Wiper", "Car Accessories", 300);
        payload.tyre_model = vec!["Civic".to_string()];

        let result = client.create_product(payload).await;
        assert!(matches!(result, Err(ProductError::ValidationError(_))));
        assert!(client.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_changes_only_patched_field() {
        let client = start(Arc::new(RecordingImageStore::default()));
        let id = client.create_product(item("Grease", "Lubricants", 150)).await.unwrap();
        let before = client.get_product(id.clone()).await.unwrap();

        let patch = ProductPatch {
            title: Some("Lithium Grease".to_string()),
            ..ProductPatch::default()
        };
        let after = client.update_product(id, patch).await.unwrap();

        assert_eq!(after.title, "Lithium Grease");
        assert_eq!(Product { title: before.title.clone(), ..after }, before);
    }

    #[tokio::test]
    async fn test_update_unknown_product_is_not_found() {
        let client = start(Arc::new(RecordingImageStore::default()));
        let result = client.update_product("product_9".to_string(), ProductPatch::default()).await;
        assert_eq!(result, Err(ProductError::NotFound("product_9".to_string())));
    }

    #[tokio::test]
    async fn test_delete_removes_product_and_images() {
        let images = Arc::new(RecordingImageStore::default());
        let client = start(images.clone());
        let id = client.create_product(item("Air Filter", "Filters", 350)).await.unwrap();

        client.delete_product(id.clone()).await.unwrap();

        assert_eq!(client.get_product(id.clone()).await, Err(ProductError::NotFound(id.clone())));
        assert_eq!(client.delete_product(id.clone()).await, Err(ProductError::NotFound(id)));
        assert_eq!(
            *images.deleted.lock().unwrap(),
            vec!["https://img/Air Filter.png".to_string(), "https://img/side.png".to_string()]
        );
    }

    #[tokio::test]
    async fn test_replacing_images_deletes_only_dropped_ones() {
        let images = Arc::new(RecordingImageStore::default());
        let client = start(images.clone());
        let id = client.create_product(item("Mat", "Car Accessories", 500)).await.unwrap();

        let patch = ProductPatch {
            images: Some(vec!["https://img/side.png".to_string()]),
            ..ProductPatch::default()
        };
        client.update_product(id, patch).await.unwrap();

        assert_eq!(*images.deleted.lock().unwrap(), vec!["https://img/Mat.png".to_string()]);
    }

    #[tokio::test]
    async fn test_image_cleanup_failure_does_not_fail_delete() {
        let images = Arc::new(RecordingImageStore {
            fail: true,
            ..RecordingImageStore::default()
        });
        let client = start(images);
        let id = client.create_product(item("Horn", "Car Accessories", 700)).await.unwrap();

        assert_eq!(client.delete_product(id.clone()).await, Ok(()));
        assert!(client.get_product(id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_tyres_matches_category_subset() {
        let client = start(Arc::new(RecordingImageStore::default()));
        let civic = client.create_product(tyre("Tyre X", "195/65R15", &["Civic"])).await.unwrap();
        client.create_product(item("Engine Oil", "Lubricants", 900)).await.unwrap();
        let accord = client.create_product(tyre("Tyre Y", "205/55R16", &["Accord", "City"])).await.unwrap();

        let all = client.list_tyres(TyreFilter::default()).await.unwrap();
        let expected: Vec<Product> = client
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .filter(|p| p.category == TYRE_CATEGORY)
            .collect();
        assert_eq!(all.tyres, expected);

        let by_model = client.list_tyres(TyreFilter::default().model("Civic")).await.unwrap();
        assert_eq!(by_model.tyres.len(), 1);
        assert_eq!(by_model.tyres[0].id, civic);

        let by_size = client.list_tyres(TyreFilter::default().size("205/55R16")).await.unwrap();
        assert_eq!(by_size.tyres.len(), 1);
        assert_eq!(by_size.tyres[0].id, accord);
        assert_eq!(by_size.unique_models, vec!["Accord", "City"]);

        let none = client.list_tyres(TyreFilter::default().model("Innova")).await.unwrap();
        assert!(none.tyres.is_empty());
    }

    #[tokio::test]
    async fn test_every_size_facet_works_as_a_filter() {
        let client = start(Arc::new(RecordingImageStore::default()));
        client.create_product(tyre("Tyre X", " 195/65R15 ", &["Civic"])).await.unwrap();
        client.create_product(tyre("Tyre Y", "205/55R16\t", &["Accord"])).await.unwrap();

        let listing = client.list_tyres(TyreFilter::default()).await.unwrap();
        assert_eq!(listing.unique_sizes, vec!["195/65R15", "205/55R16"]);

        for size in listing.unique_sizes {
            let narrowed = client.list_tyres(TyreFilter::default().size(size.clone())).await.unwrap();
            assert_eq!(narrowed.tyres.len(), 1, "size facet {:?} matched nothing", size);
            assert_eq!(narrowed.unique_sizes, vec![size]);
        }
    }

    #[tokio::test]
    async fn test_categories_and_category_listing() {
        let client = start(Arc::new(RecordingImageStore::default()));
        client.create_product(item("Engine Oil", "Lubricants", 900)).await.unwrap();
        client.create_product(tyre("Tyre X", "195/65R15", &["Civic"])).await.unwrap();
        client.create_product(item("Gear Oil", "Lubricants", 450)).await.unwrap();

        assert_eq!(client.list_categories().await.unwrap(), vec!["Lubricants", "Tyres"]);

        let lubricants = client.list_by_category(Some("Lubricants".to_string())).await.unwrap();
        assert_eq!(lubricants.len(), 2);

        let everything = client.list_by_category(Some(ALL_CATEGORIES.to_string())).await.unwrap();
        assert_eq!(everything.len(), 3);
        assert_eq!(client.list_by_category(None).await.unwrap().len(), 3);

        let found = client.search_products("gear".to_string()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Gear Oil");
    }
}
