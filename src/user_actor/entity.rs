use chrono::Utc;
use uuid::Uuid;

use super::UserError;
use crate::actor_framework::Entity;
use crate::domain::{normalize_email, User, UserCreate, UserPatch};

fn validate(name: &str, email: &str) -> Result<(), UserError> {
    if name.trim().is_empty() {
        return Err(UserError::ValidationError("Name required".to_string()));
    }
    if !email.contains('@') {
        return Err(UserError::ValidationError("Valid email required".to_string()));
    }
    Ok(())
}

impl Entity for User {
    type Id = Uuid;
    type CreatePayload = UserCreate;
    type Patch = UserPatch;
    type Action = ();
    type ActionResult = ();
    type Error = UserError;

    const COLLECTION: &'static str = "users";

    fn id(&self) -> &Uuid {
        &self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// # Notes
    /// The email is normalized so the unique index is case-insensitive.
    fn from_create(id: Uuid, payload: UserCreate) -> Result<Self, UserError> {
        let email = normalize_email(&payload.email);
        validate(&payload.name, &email)?;
        let now = Utc::now();
        Ok(Self {
            id,
            name: payload.name.trim().to_string(),
            email,
            password_hash: payload.password_hash,
            is_admin: payload.is_admin,
            created_at: now,
            updated_at: now,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }

    /// Updates the user's profile information.
    ///
    /// # Fields Updated
    /// - `name`, `email`: profile data
    /// - `password_hash`: replaced when the password changes
    /// - `is_admin`: admin-only edit
    fn on_update(&mut self, patch: UserPatch) -> Result<(), UserError> {
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = patch.email {
            self.email = normalize_email(&email);
        }
        validate(&self.name, &self.email)?;
        if let Some(password_hash) = patch.password_hash {
            self.password_hash = password_hash;
        }
        if let Some(is_admin) = patch.is_admin {
            self.is_admin = is_admin;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    fn on_delete(&self) -> Result<(), UserError> {
        if self.is_admin {
            return Err(UserError::CannotDeleteAdmin);
        }
        Ok(())
    }

    // Users have no actions; every edit goes through `on_update`.
    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str, email: &str, is_admin: bool) -> Result<User, UserError> {
        User::from_create(
            Uuid::new_v4(),
            UserCreate {
                name: name.into(),
                email: email.into(),
                password_hash: "hash".into(),
                is_admin,
            },
        )
    }

    #[test]
    fn email_is_normalized() {
        let user = create("Alice", "  Alice@Example.COM ", false).unwrap();
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.unique_key().as_deref(), Some("alice@example.com"));
    }

    #[test]
    fn invalid_profile_is_rejected() {
        assert!(matches!(create("", "a@b.c", false), Err(UserError::ValidationError(_))));
        assert!(matches!(create("Bob", "not-an-email", false), Err(UserError::ValidationError(_))));

        let mut user = create("Bob", "bob@example.com", false).unwrap();
        let err = user
            .on_update(UserPatch {
                email: Some("nope".into()),
                ..UserPatch::default()
            })
            .unwrap_err();
        assert!(matches!(err, UserError::ValidationError(_)));
    }

    #[test]
    fn admins_cannot_be_deleted() {
        let admin = create("Root", "root@example.com", true).unwrap();
        assert_eq!(admin.on_delete(), Err(UserError::CannotDeleteAdmin));
        let user = create("Carol", "carol@example.com", false).unwrap();
        assert_eq!(user.on_delete(), Ok(()));
    }
}
