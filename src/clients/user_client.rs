use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::access::AccessPolicy;
use crate::actor_framework::ResourceClient;
use crate::domain::{Email, User, UserCreate, UserPatch};
use crate::user_actor::UserError;

/// Client for the user directory.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
    policy: Arc<AccessPolicy>,
}

impl_client_methods!(UserClient, User, UserError, user);

impl UserClient {
    pub fn new(inner: ResourceClient<User>, policy: Arc<AccessPolicy>) -> Self {
        Self { inner, policy }
    }

    /// Exact match on the normalized email. Absence is not an error.
    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserError> {
        debug!("Sending request");
        let email = email.clone();
        let mut matches = self.inner.list(move |user: &User| user.email == email).await?;
        Ok(if matches.is_empty() { None } else { Some(matches.remove(0)) })
    }

    #[instrument(skip(self))]
    pub async fn user_exists(&self, email: &Email) -> Result<bool, UserError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    /// Creates the user on first login. Returns the new id, or `None` when a
    /// record with this email already exists. The existence check and the
    /// insert happen in one actor turn, so concurrent first logins cannot
    /// produce two records.
    #[instrument(skip(self, name))]
    pub async fn upsert_on_first_login(
        &self,
        name: impl Into<String>,
        email: &Email,
    ) -> Result<Option<String>, UserError> {
        debug!("Sending request");
        let payload = UserCreate::new(name, email.clone());
        let key = email.clone();
        let created = self
            .inner
            .create_if_absent(payload, move |user: &User| user.email == key)
            .await?;
        match &created {
            Some(id) => info!(user_id = %id, "User created successfully"),
            None => debug!("User already exists"),
        }
        Ok(created)
    }

    /// True while the user has not saved a phone number.
    #[instrument(skip(self))]
    pub async fn needs_phone_completion(&self, user_id: String) -> Result<bool, UserError> {
        Ok(self.get_user(user_id).await?.needs_phone())
    }

    /// Stores the phone number as given. Format checks belong to the caller.
    #[instrument(skip(self, phone))]
    pub async fn set_phone(&self, user_id: String, phone: String) -> Result<User, UserError> {
        debug!("Sending request");
        let patch = UserPatch {
            phone: Some(phone),
            ..UserPatch::default()
        };
        let user = self.inner.update(user_id, patch).await?;
        info!("Phone number saved");
        Ok(user)
    }

    /// Every user, for allow-listed requesters only.
    #[instrument(skip(self))]
    pub async fn list_all_users(&self, requester: &Email) -> Result<Vec<User>, UserError> {
        self.policy.authorize(requester)?;
        let users = self.all_users().await?;
        info!(user_count = users.len(), "Listed users");
        Ok(users)
    }

    #[instrument(skip(self))]
    pub async fn search_users(&self, requester: &Email, term: String) -> Result<Vec<User>, UserError> {
        self.policy.authorize(requester)?;
        Ok(self.inner.list(move |user: &User| user.matches_search(&term)).await?)
    }
}
