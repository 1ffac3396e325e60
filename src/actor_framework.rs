use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Round-trip budget used when a client is built without an explicit timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Trait that any record type must implement to be owned by a [`ResourceActor`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreatePayload: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;
    /// Domain error raised by the hooks below.
    type Error: std::error::Error + Clone + Send + Sync + 'static;

    fn id(&self) -> &Self::Id;

    /// Construct the full record from the generated ID and the payload.
    fn from_create(id: Self::Id, payload: Self::CreatePayload) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Merge `patch` into `self`. Runs against a staged copy; the stored
    /// record is only replaced when this returns `Ok`.
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;

    fn on_delete(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a domain-specific action. Staged like [`Entity::on_update`].
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Failures reported by the actor plumbing, wrapping the entity's own error.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError<E> {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
    #[error("Store unavailable: no response within {0:?}")]
    Unavailable(Duration),
    #[error("{0}")]
    Entity(E),
}

/// Implements `From<FrameworkError<E>> for E` for a domain error that has
/// `NotFound(String)`, `Unavailable(String)` and `ActorCommunicationError(String)`.
#[macro_export]
macro_rules! impl_from_framework_error {
    ($error:ident) => {
        impl From<$crate::actor_framework::FrameworkError<$error>> for $error {
            fn from(err: $crate::actor_framework::FrameworkError<$error>) -> Self {
                use $crate::actor_framework::FrameworkError;
                match err {
                    FrameworkError::Entity(inner) => inner,
                    FrameworkError::NotFound(id) => $error::NotFound(id),
                    FrameworkError::Unavailable(after) => {
                        $error::Unavailable(format!("no response within {:?}", after))
                    }
                    other => $error::ActorCommunicationError(other.to_string()),
                }
            }
        }
    };
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, FrameworkError<E>>>;

/// Predicate evaluated inside the actor against stored records.
pub struct Filter<T>(Box<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> Filter<T> {
    pub fn new(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self(Box::new(predicate))
    }

    pub fn all() -> Self {
        Self::new(|_| true)
    }

    pub fn matches(&self, item: &T) -> bool {
        (self.0)(item)
    }
}

impl<T> Debug for Filter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter(..)")
    }
}

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        payload: T::CreatePayload,
        respond_to: Response<T::Id, T::Error>,
    },
    /// Insert unless a stored record matches `conflict`. Answers `None` on conflict.
    CreateIfAbsent {
        payload: T::CreatePayload,
        conflict: Filter<T>,
        respond_to: Response<Option<T::Id>, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    /// Matching records in insertion order.
    List {
        filter: Filter<T>,
        respond_to: Response<Vec<T>, T::Error>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, T::Error>,
    },
    /// Answers with the removed record.
    Delete {
        id: T::Id,
        respond_to: Response<T, T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
    Shutdown,
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    insertion_order: Vec<T::Id>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        timeout: Duration,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            insertion_order: Vec::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender, timeout);
        (actor, client)
    }

    /// Serves requests one at a time until every client is dropped or a
    /// `Shutdown` arrives. Each request is therefore atomic for this store.
    pub async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { payload, respond_to } => {
                    let _ = respond_to.send(self.insert(payload));
                }
                ResourceRequest::CreateIfAbsent { payload, conflict, respond_to } => {
                    let result = if self.store.values().any(|item| conflict.matches(item)) {
                        Ok(None)
                    } else {
                        self.insert(payload).map(Some)
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let items = self
                        .insertion_order
                        .iter()
                        .filter_map(|id| self.store.get(id))
                        .filter(|item| filter.matches(item))
                        .cloned()
                        .collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.act(id, action));
                }
                ResourceRequest::Shutdown => {
                    debug!("Resource actor shutting down");
                    break;
                }
            }
        }
    }

    fn insert(&mut self, payload: T::CreatePayload) -> Result<T::Id, FrameworkError<T::Error>> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create(id.clone(), payload).map_err(FrameworkError::Entity)?;
        item.on_create().map_err(FrameworkError::Entity)?;
        self.store.insert(id.clone(), item);
        self.insertion_order.push(id.clone());
        Ok(id)
    }

    fn update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError<T::Error>> {
        let current = self
            .store
            .get(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let mut staged = current.clone();
        staged.on_update(patch).map_err(FrameworkError::Entity)?;
        self.store.insert(id, staged.clone());
        Ok(staged)
    }

    fn delete(&mut self, id: T::Id) -> Result<T, FrameworkError<T::Error>> {
        let current = self
            .store
            .get(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        current.on_delete().map_err(FrameworkError::Entity)?;
        self.insertion_order.retain(|stored| stored != &id);
        self.store
            .remove(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))
    }

    fn act(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        let current = self
            .store
            .get(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        let mut staged = current.clone();
        let result = staged.handle_action(action).map_err(FrameworkError::Entity)?;
        self.store.insert(id, staged);
        Ok(result)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
    timeout: Duration,
}

impl<T: Entity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            timeout: self.timeout,
        }
    }
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>, timeout: Duration) -> Self {
        Self { sender, timeout }
    }

    /// Sends one request and waits for the reply, bounded by the client timeout.
    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError<T::Error>> {
        let (respond_to, response) = oneshot::channel();
        let round_trip = async {
            if self.sender.send(build(respond_to)).await.is_err() {
                return Err(FrameworkError::ActorClosed);
            }
            match response.await {
                Ok(result) => result,
                Err(_) => Err(FrameworkError::ActorDropped),
            }
        };
        match tokio::time::timeout(self.timeout, round_trip).await {
            Ok(result) => result,
            Err(_) => Err(FrameworkError::Unavailable(self.timeout)),
        }
    }

    pub async fn create(&self, payload: T::CreatePayload) -> Result<T::Id, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Create { payload, respond_to })
            .await
    }

    pub async fn create_if_absent(
        &self,
        payload: T::CreatePayload,
        conflict: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Option<T::Id>, FrameworkError<T::Error>> {
        let conflict = Filter::new(conflict);
        self.request(|respond_to| ResourceRequest::CreateIfAbsent {
            payload,
            conflict,
            respond_to,
        })
        .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn list(
        &self,
        filter: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Vec<T>, FrameworkError<T::Error>> {
        let filter = Filter::new(filter);
        self.request(|respond_to| ResourceRequest::List { filter, respond_to })
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::List {
            filter: Filter::all(),
            respond_to,
        })
        .await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to })
            .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to })
            .await
    }

    /// Asks the actor to stop after the requests already queued.
    pub async fn shutdown(&self) -> Result<(), FrameworkError<T::Error>> {
        self.sender
            .send(ResourceRequest::Shutdown)
            .await
            .map_err(|_| FrameworkError::ActorClosed)
    }
}
