use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::actions::{ProductAction, ProductActionResult};
use super::{ProductCreate, ProductError, ProductUpdate};
use crate::actor_framework::Entity;
use crate::domain::Product;

impl Entity for Product {
    type Id = Uuid;
    type CreatePayload = ProductCreate;
    type Patch = ProductUpdate;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    const COLLECTION: &'static str = "products";

    fn id(&self) -> &Uuid {
        &self.id
    }

    /// Creates a new Product with no reviews.
    fn from_create(id: Uuid, payload: ProductCreate) -> Result<Self, ProductError> {
        let now = Utc::now();
        Ok(Self {
            id,
            user: payload.owner,
            name: payload.name,
            image: payload.image,
            brand: payload.brand,
            category: payload.category,
            description: payload.description,
            reviews: Vec::new(),
            rating: 0.0,
            num_reviews: 0,
            price: payload.price,
            count_in_stock: payload.count_in_stock,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrites every editable field. Reviews and aggregates are untouched.
    fn on_update(&mut self, patch: ProductUpdate) -> Result<(), ProductError> {
        self.name = patch.name;
        self.price = patch.price;
        self.description = patch.description;
        self.image = patch.image;
        self.brand = patch.brand;
        self.category = patch.category;
        self.count_in_stock = patch.count_in_stock;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Handles product-specific actions.
    ///
    /// # Errors
    /// `AddReview` fails with `AlreadyReviewed` when the author has already
    /// reviewed this product.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::AddReview { review, policy } => {
                if self.reviews.iter().any(|r| r.user == review.user) {
                    return Err(ProductError::AlreadyReviewed);
                }

                self.reviews.push(review);
                self.num_reviews = self.reviews.len() as u32;
                self.rating = policy.aggregate(&self.reviews);
                self.updated_at = Utc::now();

                info!(product_id = %self.id, num_reviews = self.num_reviews, rating = self.rating, "Review added");
                Ok(ProductActionResult::AddReview {
                    num_reviews: self.num_reviews,
                    rating: self.rating,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RatingPolicy, Review};

    fn product() -> Product {
        Product::from_create(Uuid::new_v4(), ProductCreate::placeholder(Uuid::new_v4())).unwrap()
    }

    fn review(user: Uuid, rating: f64) -> Review {
        Review {
            id: Uuid::new_v4(),
            user,
            name: "Reviewer".into(),
            rating,
            comment: "Nice".into(),
            created_at: Utc::now(),
        }
    }

    fn add(product: &mut Product, user: Uuid, rating: f64, policy: RatingPolicy) -> Result<ProductActionResult, ProductError> {
        product.handle_action(ProductAction::AddReview {
            review: review(user, rating),
            policy,
        })
    }

    #[test]
    fn placeholder_product_has_sample_values() {
        let product = product();
        assert_eq!(product.name, "Sample name");
        assert_eq!(product.image, "/images/sample.jpg");
        assert_eq!(product.num_reviews, 0);
        assert!(product.reviews.is_empty());
    }

    #[test]
    fn reviews_accumulate_rating_as_sum() {
        let mut product = product();
        let ratings = [5.0, 3.0, 4.0];
        for (n, rating) in ratings.iter().enumerate() {
            let result = add(&mut product, Uuid::new_v4(), *rating, RatingPolicy::Sum).unwrap();
            let ProductActionResult::AddReview { num_reviews, .. } = result;
            assert_eq!(num_reviews as usize, n + 1);
        }
        assert_eq!(product.num_reviews as usize, product.reviews.len());
        assert_eq!(product.rating, 12.0);
    }

    #[test]
    fn mean_policy_averages_ratings() {
        let mut product = product();
        add(&mut product, Uuid::new_v4(), 5.0, RatingPolicy::Mean).unwrap();
        add(&mut product, Uuid::new_v4(), 2.0, RatingPolicy::Mean).unwrap();
        assert_eq!(product.rating, 3.5);
    }

    #[test]
    fn second_review_by_same_user_is_rejected() {
        let mut product = product();
        let author = Uuid::new_v4();
        add(&mut product, author, 4.0, RatingPolicy::Sum).unwrap();

        let err = add(&mut product, author, 1.0, RatingPolicy::Sum).unwrap_err();
        assert_eq!(err, ProductError::AlreadyReviewed);
        assert_eq!(product.num_reviews, 1);
        assert_eq!(product.rating, 4.0);
    }

    #[test]
    fn update_overwrites_fields_without_validation() {
        let mut product = product();
        product
            .on_update(ProductUpdate {
                name: "Widget".into(),
                price: -3.5,
                description: "d".into(),
                image: "/images/w.jpg".into(),
                brand: "b".into(),
                category: "c".into(),
                count_in_stock: -1,
            })
            .unwrap();
        assert_eq!(product.name, "Widget");
        assert_eq!(product.price, -3.5);
        assert_eq!(product.count_in_stock, -1);
    }
}
