//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver, then script the
//! actor's replies with [`expect_create`], [`expect_get`], [`expect_list`] or
//! [`expect_action`].

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Entity, Filter, FrameworkError, ResourceClient, ResourceRequest, DEFAULT_TIMEOUT};

pub type Responder<R, T> = oneshot::Sender<Result<R, FrameworkError<<T as Entity>::Error>>>;

/// Creates a client whose requests land on the returned receiver instead of
/// a running `ResourceActor`, so a test decides every reply.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    create_mock_client_with_timeout(buffer_size, DEFAULT_TIMEOUT)
}

/// Like [`create_mock_client`], with a short round-trip budget for tests
/// that leave a request unanswered.
pub fn create_mock_client_with_timeout<T: Entity>(
    buffer_size: usize,
    timeout: Duration,
) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender, timeout), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreatePayload, Responder<T::Id, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { payload, respond_to }) => Some((payload, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Responder<Option<T>, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a List request
pub async fn expect_list<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(Filter<T>, Responder<Vec<T>, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::List { filter, respond_to }) => Some((filter, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Responder<T::ActionResult, T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Email, User, UserCreate};
    use chrono::Utc;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        let create_task = tokio::spawn(async move {
            let user = UserCreate::new("Test", "Test@Example.com");
            client.create(user).await
        });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.name, "Test");
        assert_eq!(payload.email, Email::new("test@example.com"));
        responder.send(Ok("user_1".to_string())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok("user_1".to_string()));
    }

    #[tokio::test]
    async fn test_list_filter_is_evaluated_by_the_test() {
        let (client, mut receiver) = create_mock_client::<User>(10);
        let task = tokio::spawn(async move { client.list(|user: &User| user.needs_phone()).await });

        let (filter, responder) = expect_list(&mut receiver).await.expect("Expected List request");
        let user = User {
            id: "user_1".to_string(),
            name: "Ann".to_string(),
            email: Email::new("ann@x.com"),
            phone: None,
            created_at: Utc::now(),
        };
        assert!(filter.matches(&user));
        responder.send(Ok(vec![user.clone()])).unwrap();

        assert_eq!(task.await.unwrap(), Ok(vec![user]));
    }
}
