use serde::{Deserialize, Deserializer, Serialize};

/// Category that carries tyre size and model attributes.
pub const TYRE_CATEGORY: &str = "Tyres";

/// Category selector meaning "no narrowing".
pub const ALL_CATEGORIES: &str = "All";

/// A sellable catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Image URIs; the first one is the cover.
    pub images: Vec<String>,
    /// Whole rupees.
    pub cost: u64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tyre_size: Option<String>,
    /// Vehicle models the tyre fits. Order carries no meaning.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tyre_model: Vec<String>,
}

impl Product {
    pub fn is_tyre(&self) -> bool {
        self.category == TYRE_CATEGORY
    }

    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn fits_model(&self, model: &str) -> bool {
        self.tyre_model.iter().any(|m| m == model)
    }

    /// Case-insensitive substring match over title and category.
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term) || self.category.to_lowercase().contains(&term)
    }
}

/// Payload for creating a new product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub title: String,
    pub description: String,
    pub images: Vec<String>,
    pub cost: u64,
    pub category: String,
    #[serde(default)]
    pub tyre_size: Option<String>,
    #[serde(default)]
    pub tyre_model: Vec<String>,
}

/// Partial update. `None` leaves a field unchanged.
///
/// `tyre_size` is doubly optional so a patch can clear it: `Some(None)`
/// (JSON `"tyreSize": null`) removes the size, an absent key keeps it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub cost: Option<u64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub tyre_size: Option<Option<String>>,
    #[serde(default)]
    pub tyre_model: Option<Vec<String>>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Tyre facet filter. Blank values do not narrow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TyreFilter {
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

/// Tyres left after filtering plus the facet values seen among them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TyreListing {
    pub tyres: Vec<Product>,
    pub unique_sizes: Vec<String>,
    pub unique_models: Vec<String>,
}

impl TyreFilter {
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    fn active(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn matches(&self, product: &Product) -> bool {
        if !product.is_tyre() {
            return false;
        }
        if let Some(size) = Self::active(&self.size) {
            if product.tyre_size.as_deref() != Some(size) {
                return false;
            }
        }
        match Self::active(&self.model) {
            Some(model) => product.fits_model(model),
            None => true,
        }
    }

    /// Narrows `products` (kept in their given order) and collects the
    /// distinct sizes and models of the result in first-seen order.
    pub fn apply(&self, products: Vec<Product>) -> TyreListing {
        let tyres: Vec<Product> = products.into_iter().filter(|p| self.matches(p)).collect();

        let mut unique_sizes: Vec<String> = Vec::new();
        let mut unique_models: Vec<String> = Vec::new();
        for tyre in &tyres {
            if let Some(size) = &tyre.tyre_size {
                if !unique_sizes.contains(size) {
                    unique_sizes.push(size.clone());
                }
            }
            for model in &tyre.tyre_model {
                if !unique_models.contains(model) {
                    unique_models.push(model.clone());
                }
            }
        }

        TyreListing {
            tyres,
            unique_sizes,
            unique_models,
        }
    }
}

/// Distinct categories in first-seen order.
pub fn distinct_categories<'a>(products: impl IntoIterator<Item = &'a Product>) -> Vec<String> {
    let mut categories: Vec<String> = Vec::new();
    for product in products {
        if !categories.contains(&product.category) {
            categories.push(product.category.clone());
        }
    }
    categories
}
