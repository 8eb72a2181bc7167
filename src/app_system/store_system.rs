use tracing::{error, info};
use uuid::Uuid;

use super::SystemError;
use crate::actor_framework::ResourceActor;
use crate::auth::CredentialHasher;
use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::config::Config;
use crate::domain::{Order, Product, User};

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up the three collection actors, wiring their
/// clients together, and handling shutdown.
pub struct StoreSystem {
    pub order_client: OrderClient,
    pub user_client: UserClient,
    pub product_client: ProductClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl StoreSystem {
    pub fn new(config: &Config) -> Result<Self, SystemError> {
        let hasher = CredentialHasher::new(config.hash_memory_kib, config.hash_iterations)
            .map_err(|e| SystemError::Hasher(e.to_string()))?;

        // 1. Users
        let (user_actor, user_resource_client) = ResourceActor::<User>::new(config.actor_buffer, Uuid::new_v4);
        let user_client = UserClient::new(user_resource_client, hasher);
        let user_handle = tokio::spawn(user_actor.run());

        // 2. Products
        let (product_actor, product_resource_client) =
            ResourceActor::<Product>::new(config.actor_buffer, Uuid::new_v4);
        let product_client = ProductClient::new(product_resource_client, config.rating_policy);
        let product_handle = tokio::spawn(product_actor.run());

        // 3. Orders, which validate buyers through the user client
        let (order_actor, order_resource_client) = ResourceActor::<Order>::new(config.actor_buffer, Uuid::new_v4);
        let order_client = OrderClient::new(order_resource_client, user_client.clone());
        let order_handle = tokio::spawn(order_actor.run());

        info!(rating_policy = ?config.rating_policy, "Collection actors started");

        Ok(Self {
            order_client,
            user_client,
            product_client,
            handles: vec![user_handle, product_handle, order_handle],
        })
    }

    /// Creates the configured admin account, if any.
    pub async fn seed(&self, config: &Config) -> Result<(), SystemError> {
        if let Some(seed) = &config.admin {
            let admin = self.user_client.seed_admin(seed).await?;
            info!(user_id = %admin.id, "Admin account ready");
        }
        Ok(())
    }

    /// Actors stop once every client clone is gone, so the HTTP router must
    /// already have been dropped.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");

        drop(self.order_client);
        drop(self.user_client);
        drop(self.product_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::ActorTask(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
