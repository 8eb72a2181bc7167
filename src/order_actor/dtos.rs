use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{OrderCreate, OrderItem, PaymentResult, ShippingAddress};

/// Checkout request body. Totals are computed by the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub items_price: f64,
    pub tax_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
}

impl OrderInput {
    pub fn into_create(self, user: Uuid) -> OrderCreate {
        OrderCreate {
            user,
            order_items: self.order_items,
            shipping_address: self.shipping_address,
            payment_method: self.payment_method,
            items_price: self.items_price,
            tax_price: self.tax_price,
            shipping_price: self.shipping_price,
            total_price: self.total_price,
        }
    }
}

/// Payment gateway callback body, as sent by the PayPal button.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PaymentInput {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub update_time: String,
    #[serde(default)]
    pub payer: Option<Payer>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Payer {
    #[serde(default)]
    pub email_address: String,
}

impl From<PaymentInput> for PaymentResult {
    fn from(input: PaymentInput) -> Self {
        Self {
            id: input.id,
            status: input.status,
            update_time: input.update_time,
            email_address: input.payer.map(|p| p.email_address).unwrap_or_default(),
        }
    }
}
