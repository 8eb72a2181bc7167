use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::actor_framework::{FrameworkError, Query, ResourceClient};
use crate::domain::{Product, RatingPolicy, Review, User};
use crate::product_actor::{ProductAction, ProductActionResult, ProductCreate, ProductError, ProductUpdate, ReviewInput};

pub const PAGE_SIZE: usize = 8;
pub const TOP_PRODUCTS: usize = 3;

/// One page of the catalog listing.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: usize,
    pub pages: usize,
}

/// Parses `pageNumber`. Missing, non-numeric and zero all mean page 1.
pub fn page_number(raw: Option<&str>) -> usize {
    raw.and_then(|p| p.trim().parse::<usize>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

/// Normalizes the search keyword. The storefront sends the literal
/// `"undefined"` when the search box is empty.
pub fn search_keyword(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|k| !k.is_empty() && *k != "undefined")
        .map(str::to_lowercase)
}

/// Case-insensitive substring match on the product name (full scan).
fn name_matches(keyword: Option<String>) -> Query<Product> {
    match keyword {
        Some(keyword) => Query::all().filter(move |p: &Product| p.name.to_lowercase().contains(&keyword)),
        None => Query::all(),
    }
}

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
    rating_policy: RatingPolicy,
}

impl_client_methods!(ProductClient, Product, ProductError, product);

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>, rating_policy: RatingPolicy) -> Self {
        Self { inner, rating_policy }
    }

    /// `keyword` is expected already normalized by [`search_keyword`].
    #[instrument(skip(self))]
    pub async fn list_products(&self, keyword: Option<String>, page: usize) -> Result<ProductPage, ProductError> {
        debug!("Sending request");
        let count = self.inner.count(name_matches(keyword.clone())).await?;
        let products = self
            .inner
            .find(
                name_matches(keyword)
                    .skip(PAGE_SIZE.saturating_mul(page.saturating_sub(1)))
                    .limit(PAGE_SIZE),
            )
            .await?;

        let pages = count.div_ceil(PAGE_SIZE);
        debug!(count, pages, returned = products.len(), "Listed products");
        Ok(ProductPage { products, page, pages })
    }

    /// Highest `rating` first.
    #[instrument(skip(self))]
    pub async fn top_products(&self) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        let products = self
            .inner
            .find(
                Query::all()
                    .sort_by(|a: &Product, b: &Product| b.rating.total_cmp(&a.rating))
                    .limit(TOP_PRODUCTS),
            )
            .await?;
        if products.is_empty() {
            return Err(ProductError::CatalogEmpty);
        }
        Ok(products)
    }

    /// Creates a placeholder product owned by `owner`.
    #[instrument(skip(self))]
    pub async fn create_sample_product(&self, owner: Uuid) -> Result<Product, ProductError> {
        debug!("Sending request");
        let product = self
            .inner
            .create(ProductCreate::placeholder(owner))
            .await
            .map_err(|e| match e {
                FrameworkError::ActorClosed | FrameworkError::ActorDropped => ProductError::from(e),
                other => ProductError::CreationFailed(other.to_string()),
            })?;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self, update))]
    pub async fn update_product(&self, id: Uuid, update: ProductUpdate) -> Result<Product, ProductError> {
        debug!("Sending request");
        let product = self.inner.update(id, update).await?;
        info!(product_name = %product.name, "Product updated");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ProductError> {
        debug!("Sending request");
        let removed = self.inner.delete(id).await?;
        info!(product_name = %removed.name, "Product removed");
        Ok(())
    }

    /// Adds `author`'s review. The duplicate check, append and aggregate
    /// recomputation happen in one action on the product actor.
    #[instrument(skip(self, author, input), fields(user_id = %author.id))]
    pub async fn add_review(&self, id: Uuid, author: &User, input: ReviewInput) -> Result<ProductActionResult, ProductError> {
        debug!("Sending request");
        let review = Review {
            id: Uuid::new_v4(),
            user: author.id,
            name: author.name.clone(),
            rating: input.rating()?,
            comment: input.comment,
            created_at: Utc::now(),
        };
        let action = ProductAction::AddReview {
            review,
            policy: self.rating_policy,
        };
        self.inner.perform_action(id, action).await.map_err(|e| {
            warn!(error = %e, "Review rejected");
            ProductError::from(e)
        })
    }
}
