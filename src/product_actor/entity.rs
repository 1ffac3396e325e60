use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch, TYRE_CATEGORY};
use super::error::ProductError;

impl Entity for Product {
    type Id = String;
    type CreatePayload = ProductCreate;
    type Patch = ProductPatch;
    type Action = ();
    type ActionResult = ();
    type Error = ProductError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Builds and validates a new product.
    ///
    /// # Errors
    /// `ValidationError` when the title, category or images are missing, or the
    /// tyre attributes do not agree with the category.
    fn from_create(id: String, payload: ProductCreate) -> Result<Self, ProductError> {
        let product = Self {
            id,
            title: payload.title,
            description: payload.description,
            images: payload.images,
            cost: payload.cost,
            category: payload.category,
            tyre_size: normalize_size(payload.tyre_size),
            tyre_model: distinct_models(payload.tyre_model),
        };
        product.validate()?;
        Ok(product)
    }

    /// Merges the supplied fields over the current ones and re-validates the
    /// merged record. Omitted fields keep their values.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
        if let Some(cost) = patch.cost {
            self.cost = cost;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(tyre_size) = patch.tyre_size {
            self.tyre_size = normalize_size(tyre_size);
        }
        if let Some(tyre_model) = patch.tyre_model {
            self.tyre_model = distinct_models(tyre_model);
        }
        self.validate()
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), ProductError> {
        Ok(())
    }
}

impl Product {
    fn validate(&self) -> Result<(), ProductError> {
        if self.title.trim().is_empty() {
            return Err(invalid("title is required"));
        }
        if self.category.trim().is_empty() {
            return Err(invalid("category is required"));
        }
        if self.images.is_empty() {
            return Err(invalid("at least one image is required"));
        }
        if self.images.iter().any(|uri| uri.trim().is_empty()) {
            return Err(invalid("image URIs must not be blank"));
        }

        let has_size = self.tyre_size.as_deref().is_some_and(|s| !s.trim().is_empty());
        if self.is_tyre() {
            if !has_size {
                return Err(invalid("tyre size is required for tyres"));
            }
            if self.tyre_model.is_empty() {
                return Err(invalid("at least one tyre model is required for tyres"));
            }
        } else if self.tyre_size.is_some() || !self.tyre_model.is_empty() {
            return Err(invalid(&format!(
                "tyre attributes are only allowed in category {}",
                TYRE_CATEGORY
            )));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ProductError {
    ProductError::ValidationError(reason.to_string())
}

/// Trims the size so stored values compare equal to trimmed filter input.
/// A blank size counts as absent.
fn normalize_size(size: Option<String>) -> Option<String> {
    size.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Drops blank and repeated model names, keeping first-seen order.
fn distinct_models(models: Vec<String>) -> Vec<String> {
    let mut distinct: Vec<String> = Vec::with_capacity(models.len());
    for model in models {
        let model = model.trim().to_string();
        if !model.is_empty() && !distinct.contains(&model) {
            distinct.push(model);
        }
    }
    distinct
}
