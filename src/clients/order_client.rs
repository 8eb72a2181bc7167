use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::actor_framework::{Query, ResourceClient};
use crate::clients::UserClient;
use crate::domain::{Order, OrderCreate, PaymentResult, User};
use crate::order_actor::{OrderAction, OrderError};
use crate::user_actor::UserError;

/// Client for interacting with the Order actor.
///
/// This client orchestrates the user collection as well: the buyer is
/// validated before an order is written.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    user_client: UserClient,
}

impl_client_methods!(OrderClient, Order, OrderError, order);

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, user_client: UserClient) -> Self {
        Self { inner, user_client }
    }

    #[instrument(skip(self, order), fields(user_id = %order.user, items = order.order_items.len()))]
    pub async fn create_order(&self, order: OrderCreate) -> Result<Order, OrderError> {
        info!("Processing create_order request");

        // Step 1: Validate user
        match self.user_client.get_user(order.user).await {
            Ok(user) => info!(user_name = %user.name, "User validation successful"),
            Err(UserError::NotFound(id)) => {
                error!("User not found");
                return Err(OrderError::InvalidUser(id));
            }
            Err(e) => {
                error!(error = %e, "User validation failed");
                return Err(OrderError::ActorCommunicationError(format!("User validation failed: {}", e)));
            }
        }

        // Step 2: Persist the checkout snapshot
        let order = self.inner.create(order).await?;
        info!(order_id = %order.id, total = order.total_price, "Order created successfully");
        Ok(order)
    }

    /// Fetches an order on behalf of `requester`, who must own it or be an admin.
    #[instrument(skip(self, requester), fields(user_id = %requester.id))]
    pub async fn get_order_for(&self, id: Uuid, requester: &User) -> Result<Order, OrderError> {
        let order = self.get_order(id).await?;
        if !order.is_visible_to(requester.id, requester.is_admin) {
            warn!("Order requested by someone other than its owner");
            return Err(OrderError::NotOwner(id.to_string()));
        }
        Ok(order)
    }

    #[instrument(skip(self, requester, payment), fields(user_id = %requester.id, payment_id = %payment.id))]
    pub async fn pay_order(&self, id: Uuid, requester: &User, payment: PaymentResult) -> Result<Order, OrderError> {
        self.get_order_for(id, requester).await?;
        Ok(self.inner.perform_action(id, OrderAction::MarkPaid(payment)).await?)
    }

    #[instrument(skip(self))]
    pub async fn deliver_order(&self, id: Uuid) -> Result<Order, OrderError> {
        Ok(self.inner.perform_action(id, OrderAction::MarkDelivered).await?)
    }

    pub async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, OrderError> {
        self.find_orders(Query::all().filter(move |o: &Order| o.user == user_id)).await
    }

    pub async fn all_orders(&self) -> Result<Vec<Order>, OrderError> {
        self.find_orders(Query::all()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::Entity;
    use crate::auth::CredentialHasher;
    use crate::domain::{OrderItem, ShippingAddress, UserCreate};
    use crate::mock_framework::{create_mock_client, expect_action, expect_create, expect_get};

    fn user(is_admin: bool) -> User {
        User::from_create(
            Uuid::new_v4(),
            UserCreate {
                name: "Test".into(),
                email: "test@example.com".into(),
                password_hash: "x".into(),
                is_admin,
            },
        )
        .unwrap()
    }

    fn checkout(user: Uuid) -> OrderCreate {
        OrderCreate {
            user,
            order_items: vec![OrderItem {
                name: "Keyboard".into(),
                qty: 2,
                image: "/images/keyboard.jpg".into(),
                price: 49.5,
                product: Uuid::new_v4(),
            }],
            shipping_address: ShippingAddress {
                address: "1 Main St".into(),
                city: "Springfield".into(),
                postal_code: "12345".into(),
                country: "US".into(),
            },
            payment_method: "PayPal".into(),
            items_price: 99.0,
            tax_price: 14.85,
            shipping_price: 0.0,
            total_price: 113.85,
        }
    }

    fn mocked() -> (
        OrderClient,
        tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<User>>,
        tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<Order>>,
    ) {
        let (user_inner, user_rx) = create_mock_client::<User>(10);
        let (order_inner, order_rx) = create_mock_client::<Order>(10);
        let user_client = UserClient::new(user_inner, CredentialHasher::new(8, 1).unwrap());
        (OrderClient::new(order_inner, user_client), user_rx, order_rx)
    }

    #[tokio::test]
    async fn test_order_creation_flow() {
        let (order_client, mut user_rx, mut order_rx) = mocked();
        let buyer = user(false);
        let buyer_id = buyer.id;

        let order_task = tokio::spawn(async move { order_client.create_order(checkout(buyer_id)).await });

        // Expect User Get
        let (user_id, responder) = expect_get(&mut user_rx).await.expect("Expected User Get");
        assert_eq!(user_id, buyer_id);
        responder.send(Ok(Some(buyer))).unwrap();

        // Expect Order Create with the client's totals untouched
        let (payload, responder) = expect_create(&mut order_rx).await.expect("Expected Order Create");
        assert_eq!(payload.user, buyer_id);
        assert_eq!(payload.total_price, 113.85);
        let created = Order::from_create(Uuid::new_v4(), payload).unwrap();
        responder.send(Ok(created.clone())).unwrap();

        let result = order_task.await.unwrap();
        assert_eq!(result, Ok(created));
    }

    #[tokio::test]
    async fn test_unknown_buyer_is_rejected() {
        let (order_client, mut user_rx, mut order_rx) = mocked();
        let ghost = Uuid::new_v4();

        let order_task = tokio::spawn(async move { order_client.create_order(checkout(ghost)).await });

        let (_, responder) = expect_get(&mut user_rx).await.expect("Expected User Get");
        responder.send(Ok(None)).unwrap();

        let result = order_task.await.unwrap();
        assert_eq!(result, Err(OrderError::InvalidUser(ghost.to_string())));
        assert!(order_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_payment_by_stranger_never_reaches_the_store() {
        let (order_client, _user_rx, mut order_rx) = mocked();
        let owner = user(false);
        let stranger = user(false);
        let order = Order::from_create(Uuid::new_v4(), checkout(owner.id)).unwrap();
        let order_id = order.id;

        let pay_task = tokio::spawn(async move {
            order_client
                .pay_order(order_id, &stranger, PaymentResult::default())
                .await
        });

        let (id, responder) = expect_get(&mut order_rx).await.expect("Expected Order Get");
        assert_eq!(id, order_id);
        responder.send(Ok(Some(order))).unwrap();

        let result = pay_task.await.unwrap();
        assert_eq!(result, Err(OrderError::NotOwner(order_id.to_string())));
        assert!(order_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_admin_may_pay_any_order() {
        let (order_client, _user_rx, mut order_rx) = mocked();
        let owner = user(false);
        let admin = user(true);
        let mut order = Order::from_create(Uuid::new_v4(), checkout(owner.id)).unwrap();
        let order_id = order.id;

        let pay_task = tokio::spawn(async move {
            order_client
                .pay_order(order_id, &admin, PaymentResult::default())
                .await
        });

        let (_, responder) = expect_get(&mut order_rx).await.expect("Expected Order Get");
        responder.send(Ok(Some(order.clone()))).unwrap();

        let (_, action, responder) = expect_action(&mut order_rx).await.expect("Expected Order Action");
        assert!(matches!(action, OrderAction::MarkPaid(_)));
        let paid = order.handle_action(action).unwrap();
        responder.send(Ok(paid)).unwrap();

        let result = pay_task.await.unwrap().unwrap();
        assert!(result.is_paid);
    }
}
