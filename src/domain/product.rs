use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A customer review, owned by exactly one [`Product`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user: Uuid,
    /// Author's display name at the time of writing.
    pub name: String,
    pub rating: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Represents a product in the catalog.
///
/// `rating` is an aggregate over `reviews` maintained by the review action;
/// see [`RatingPolicy`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Admin who created the product.
    pub user: Uuid,
    pub name: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    pub reviews: Vec<Review>,
    pub rating: f64,
    pub num_reviews: u32,
    pub price: f64,
    pub count_in_stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// How `Product::rating` is derived from the review ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RatingPolicy {
    /// Sum of all ratings.
    #[default]
    Sum,
    /// Arithmetic mean of all ratings.
    Mean,
}

impl RatingPolicy {
    pub fn aggregate(self, reviews: &[Review]) -> f64 {
        let sum: f64 = reviews.iter().map(|r| r.rating).sum();
        match self {
            RatingPolicy::Sum => sum,
            RatingPolicy::Mean if reviews.is_empty() => 0.0,
            RatingPolicy::Mean => sum / reviews.len() as f64,
        }
    }
}

impl std::str::FromStr for RatingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(RatingPolicy::Sum),
            "mean" | "average" => Ok(RatingPolicy::Mean),
            other => Err(format!("unknown rating policy '{other}', expected 'sum' or 'mean'")),
        }
    }
}
