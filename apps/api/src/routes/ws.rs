//! # WebSocket Notification Channel
//!
//! ```text
//! GET /ws?role=warehouse&user_id=e-42
//!      │
//!      ▼ upgrade
//! ┌──────────────────────────────────────────────────────────────┐
//! │  hub.subscribe() ──► forward task ──► mpsc ──► outgoing task │──► socket
//! │                      (keeps only role/user matches)          │
//! │  ping task ──────────────────────────► mpsc                  │
//! │                                                              │
//! │  receive loop: Ping → Pong, Close/None/Err → abort all tasks │◄── socket
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The channel is push-only; text frames from the client are ignored.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use teknoroma_core::Role;

use crate::error::ApiError;
use crate::services::notification::Notification;
use crate::AppState;

/// Keep-alive ping interval.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// Maximum inbound frame size; clients only send control frames.
const MAX_MESSAGE_SIZE: usize = 64 * 1024;

#[derive(Debug, Default, Deserialize)]
pub struct SubscribeQuery {
    pub role: Option<String>,
    pub user_id: Option<String>,
}

/// The groups one socket has joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub role: Option<Role>,
    pub user_id: Option<String>,
}

impl Subscription {
    /// At least one of `role`/`user_id` is required; an unknown role is rejected.
    pub fn from_query(q: SubscribeQuery) -> Result<Self, ApiError> {
        let role = match q.role.as_deref() {
            Some(r) => Some(Role::parse(r).ok_or_else(|| ApiError::bad_request(format!("Unknown role: {r}")))?),
            None => None,
        };
        let user_id = q.user_id.filter(|u| !u.trim().is_empty());

        if role.is_none() && user_id.is_none() {
            return Err(ApiError::bad_request("role or user_id is required"));
        }
        Ok(Subscription { role, user_id })
    }

    pub fn wants(&self, notification: &Notification) -> bool {
        notification.is_for(self.role, self.user_id.as_deref())
    }
}

/// GET /ws
pub async fn subscribe(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(q): Query<SubscribeQuery>,
) -> Response {
    let subscription = match Subscription::from_query(q) {
        Ok(s) => s,
        Err(e) => return e.into_response(),
    };

    info!(role = ?subscription.role, user_id = ?subscription.user_id, "Notification subscriber connecting");
    let rx = state.hub.subscribe();
    ws.max_message_size(MAX_MESSAGE_SIZE)
        .on_upgrade(move |socket| handle_socket(socket, rx, subscription))
}

async fn handle_socket(socket: WebSocket, mut rx: broadcast::Receiver<Notification>, subscription: Subscription) {
    let (mut sender, mut receiver) = socket.split();
    let (outgoing_tx, mut outgoing_rx) = mpsc::channel::<Message>(64);

    let outgoing_handle = tokio::spawn(async move {
        while let Some(msg) = outgoing_rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let forward_tx = outgoing_tx.clone();
    let forward_sub = subscription.clone();
    let forward_handle = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(notification) if forward_sub.wants(&notification) => {
                    let Ok(json) = serde_json::to_string(&notification) else {
                        continue;
                    };
                    if forward_tx.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, role = ?forward_sub.role, "Notification subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    let ping_tx = outgoing_tx.clone();
    let ping_handle = tokio::spawn(async move {
        let mut ticker = interval(PING_INTERVAL);
        loop {
            ticker.tick().await;
            if ping_tx.send(Message::Ping(axum::body::Bytes::new())).await.is_err() {
                break;
            }
        }
    });

    loop {
        match receiver.next().await {
            Some(Ok(Message::Ping(data))) => {
                let _ = outgoing_tx.send(Message::Pong(data)).await;
            }
            Some(Ok(Message::Close(_))) | None => {
                debug!(role = ?subscription.role, "Notification subscriber disconnected");
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!(?e, "WebSocket error");
                break;
            }
        }
    }

    ping_handle.abort();
    forward_handle.abort();
    outgoing_handle.abort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::notification::{Event, Topic};
    use chrono::Utc;

    fn query(role: Option<&str>, user_id: Option<&str>) -> SubscribeQuery {
        SubscribeQuery {
            role: role.map(String::from),
            user_id: user_id.map(String::from),
        }
    }

    #[test]
    fn test_subscription_requires_a_group() {
        assert!(Subscription::from_query(query(None, None)).is_err());
        assert!(Subscription::from_query(query(Some("janitor"), None)).is_err());

        let sub = Subscription::from_query(query(Some("warehouse"), Some("e-1"))).unwrap();
        assert_eq!(sub.role, Some(Role::Warehouse));
    }

    #[test]
    fn test_subscription_filters_by_topic() {
        let sub = Subscription::from_query(query(Some("cashier"), None)).unwrap();
        let note = |topic| Notification {
            topic,
            event: Event::PaymentConfirmed {
                sale_id: "s".into(),
                sale_number: "S-2024-00001".into(),
            },
            published_at: Utc::now(),
        };

        assert!(sub.wants(&note(Topic::Role(Role::Cashier))));
        assert!(!sub.wants(&note(Topic::Role(Role::Warehouse))));
        assert!(!sub.wants(&note(Topic::User("e-9".into()))));
    }
}
