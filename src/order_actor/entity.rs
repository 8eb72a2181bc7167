use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::{OrderAction, OrderError};
use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate};

impl Entity for Order {
    type Id = Uuid;
    type CreatePayload = OrderCreate;
    type Patch = (); // orders are only changed through actions
    type Action = OrderAction;
    type ActionResult = Order;
    type Error = OrderError;

    const COLLECTION: &'static str = "orders";

    fn id(&self) -> &Uuid {
        &self.id
    }

    /// Creates a new, unpaid and undelivered Order.
    ///
    /// # Notes
    /// Totals are taken from the payload as-is; nothing is checked against
    /// the catalog.
    fn from_create(id: Uuid, payload: OrderCreate) -> Result<Self, OrderError> {
        if payload.order_items.is_empty() {
            return Err(OrderError::NoItems);
        }
        let now = Utc::now();
        Ok(Self {
            id,
            user: payload.user,
            order_items: payload.order_items,
            shipping_address: payload.shipping_address,
            payment_method: payload.payment_method,
            payment_result: None,
            items_price: payload.items_price,
            tax_price: payload.tax_price,
            shipping_price: payload.shipping_price,
            total_price: payload.total_price,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    // Orders only change through `handle_action`.
    fn on_update(&mut self, _patch: ()) -> Result<(), OrderError> {
        Ok(())
    }

    /// Applies a lifecycle transition and returns the updated order.
    fn handle_action(&mut self, action: OrderAction) -> Result<Order, OrderError> {
        let now = Utc::now();
        match action {
            OrderAction::MarkPaid(payment) => {
                self.is_paid = true;
                self.paid_at = Some(now);
                self.payment_result = Some(payment);
                info!(order_id = %self.id, "Order paid");
            }
            OrderAction::MarkDelivered => {
                self.is_delivered = true;
                self.delivered_at = Some(now);
                info!(order_id = %self.id, "Order delivered");
            }
        }
        self.updated_at = now;
        Ok(self.clone())
    }
}
