use crate::domain::{RatingPolicy, Review};

/// Custom actions for Product documents.
///
/// These run inside the product actor, so the whole read-modify-write is
/// atomic with respect to other requests on the catalog.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Appends a review and recomputes `num_reviews` and `rating`.
    ///
    /// # Errors
    /// Fails with `AlreadyReviewed` if the review's author already has a
    /// review on this product.
    AddReview { review: Review, policy: RatingPolicy },
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    AddReview { num_reviews: u32, rating: f64 },
}
