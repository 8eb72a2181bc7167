use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::actor_framework::{Query, ResourceClient};
use crate::auth::CredentialHasher;
use crate::config::AdminSeed;
use crate::domain::{normalize_email, User, UserCreate, UserPatch};
use crate::user_actor::{AdminUserUpdate, LoginInput, ProfileUpdate, RegisterInput, UserError};

/// Client for interacting with the User actor. Passwords are hashed here,
/// before anything reaches the store.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
    hasher: CredentialHasher,
}

impl_client_methods!(UserClient, User, UserError, user);

impl UserClient {
    pub fn new(inner: ResourceClient<User>, hasher: CredentialHasher) -> Self {
        Self { inner, hasher }
    }

    #[instrument(skip(self, input), fields(user_email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<User, UserError> {
        debug!("Processing register request");
        self.create_account(input.name, input.email, &input.password, false).await
    }

    /// Creates the configured admin account unless its email is taken.
    #[instrument(skip(self, seed), fields(user_email = %seed.email))]
    pub async fn seed_admin(&self, seed: &AdminSeed) -> Result<User, UserError> {
        if let Some(existing) = self.find_by_email(&seed.email).await? {
            debug!("Admin account already present");
            return Ok(existing);
        }
        self.create_account(seed.name.clone(), seed.email.clone(), &seed.password, true).await
    }

    async fn create_account(&self, name: String, email: String, password: &str, is_admin: bool) -> Result<User, UserError> {
        if password.is_empty() {
            return Err(UserError::ValidationError("Password required".to_string()));
        }
        let password_hash = self.hasher.hash(password)?;
        let user = self
            .inner
            .create(UserCreate {
                name,
                email,
                password_hash,
                is_admin,
            })
            .await?;

        info!(user_id = %user.id, is_admin, "User created successfully");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        debug!("Sending request");
        let email = normalize_email(email);
        let mut found = self
            .inner
            .find(Query::all().filter(move |u: &User| u.email == email).limit(1))
            .await?;
        Ok(found.pop())
    }

    /// Unknown email and wrong password fail the same way.
    #[instrument(skip(self, input), fields(user_email = %input.email))]
    pub async fn authenticate(&self, input: LoginInput) -> Result<User, UserError> {
        let Some(user) = self.find_by_email(&input.email).await? else {
            warn!("Login for unknown email");
            return Err(UserError::InvalidCredentials);
        };
        if !self.hasher.verify(&input.password, &user.password_hash) {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(UserError::InvalidCredentials);
        }
        info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> Result<User, UserError> {
        debug!("Sending request");
        let password_hash = match update.password.filter(|p| !p.is_empty()) {
            Some(password) => Some(self.hasher.hash(&password)?),
            None => None,
        };
        let patch = UserPatch {
            name: update.name,
            email: update.email,
            password_hash,
            is_admin: None,
        };
        Ok(self.inner.update(id, patch).await?)
    }

    #[instrument(skip(self, update))]
    pub async fn update_user(&self, id: Uuid, update: AdminUserUpdate) -> Result<User, UserError> {
        debug!("Sending request");
        let patch = UserPatch {
            name: update.name,
            email: update.email,
            password_hash: None,
            is_admin: update.is_admin,
        };
        let user = self.inner.update(id, patch).await?;
        info!(user_id = %user.id, is_admin = user.is_admin, "User updated by admin");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: Uuid) -> Result<(), UserError> {
        debug!("Sending request");
        let removed = self.inner.delete(id).await?;
        info!(user_email = %removed.email, "User removed");
        Ok(())
    }

    pub async fn list_users(&self) -> Result<Vec<User>, UserError> {
        self.find_users(Query::all()).await
    }
}
