use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{User, UserCreate, UserPatch};
use super::error::UserError;

impl Entity for User {
    type Id = String;
    type CreatePayload = UserCreate;
    type Patch = UserPatch;
    type Action = ();
    type ActionResult = ();
    type Error = UserError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new User from creation parameters.
    ///
    /// # Notes
    /// New users start without a phone number; `created_at` is stamped here.
    fn from_create(id: String, params: UserCreate) -> Result<Self, UserError> {
        if params.email.is_empty() {
            return Err(UserError::ValidationError("Email required".to_string()));
        }
        Ok(Self {
            id,
            name: params.name,
            email: params.email,
            phone: None,
            created_at: Utc::now(),
        })
    }

    /// Updates the user's profile information.
    ///
    /// # Fields Updated
    /// - `name`: User's display name
    /// - `phone`: Contact number, stored as given
    fn on_update(&mut self, patch: UserPatch) -> Result<(), UserError> {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), UserError> {
        Ok(())
    }
}
