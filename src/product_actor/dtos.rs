use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::ProductError;

/// Payload for creating a product document.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub owner: Uuid,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub count_in_stock: i64,
    pub description: String,
}

impl ProductCreate {
    /// Fixed sample values; the admin fills in the real ones with an update.
    pub fn placeholder(owner: Uuid) -> Self {
        Self {
            owner,
            name: "Sample name".to_string(),
            price: 0.0,
            image: "/images/sample.jpg".to_string(),
            brand: "Sample brand".to_string(),
            category: "Sample category".to_string(),
            count_in_stock: 0,
            description: "Sample description".to_string(),
        }
    }
}

/// Full overwrite of the editable product fields. Values are not range
/// checked: negative prices and stock are stored as given.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image: String,
    pub brand: String,
    pub category: String,
    pub count_in_stock: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    #[serde(default)]
    pub rating: Value,
    #[serde(default)]
    pub comment: String,
}

impl ReviewInput {
    /// Accepts a JSON number or a numeric string.
    pub fn rating(&self) -> Result<f64, ProductError> {
        let rating = match &self.rating {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        rating
            .filter(|r| r.is_finite())
            .ok_or_else(|| ProductError::InvalidRating(self.rating.to_string()))
    }
}
