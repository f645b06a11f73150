//! Loopback chat socket.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures::future;
use futures::stream::{BoxStream, StreamExt};
use mockable::Clock;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{debug, info, warn};

use crate::chat::{
    domain::{ChatMessage, OutgoingMessage},
    error::{ChatError, ChatResult},
    ports::ChatSocket,
};
use crate::feed::domain::{ConversationId, UserId};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct SocketState {
    session: Option<(UserId, ConversationId)>,
    reject_next: Option<String>,
    channels: HashMap<ConversationId, broadcast::Sender<ChatMessage>>,
}

impl SocketState {
    fn channel(&mut self, conversation: ConversationId) -> &broadcast::Sender<ChatMessage> {
        self.channels
            .entry(conversation)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
    }
}

/// In-memory [`ChatSocket`] that echoes sent messages back to observers.
///
/// Delivered messages are stamped with the socket's clock.
pub struct InMemoryChatSocket<K>
where
    K: Clock + Send + Sync,
{
    state: Mutex<SocketState>,
    clock: Arc<K>,
}

impl<K> InMemoryChatSocket<K>
where
    K: Clock + Send + Sync,
{
    /// Creates a socket with no open session.
    #[must_use]
    pub fn new(clock: Arc<K>) -> Self {
        Self {
            state: Mutex::new(SocketState::default()),
            clock,
        }
    }

    /// Makes the next `open_session` call fail with `reason`.
    pub fn reject_next_session(&self, reason: impl Into<String>) {
        self.lock().reject_next = Some(reason.into());
    }

    /// Returns the open session, if any.
    #[must_use]
    pub fn session(&self) -> Option<(UserId, ConversationId)> {
        self.lock().session
    }

    /// Delivers a message from another participant.
    ///
    /// Returns the number of observers reached.
    pub fn deliver(&self, message: ChatMessage) -> usize {
        let mut state = self.lock();
        state.channel(message.conversation_id).send(message).unwrap_or(0)
    }

    /// Returns the number of live observers for `conversation`.
    #[must_use]
    pub fn observers(&self, conversation: ConversationId) -> usize {
        self.lock()
            .channels
            .get(&conversation)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SocketState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl<K> ChatSocket for InMemoryChatSocket<K>
where
    K: Clock + Send + Sync,
{
    async fn open_session(&self, user: UserId, conversation: ConversationId) -> ChatResult<()> {
        let mut state = self.lock();
        if let Some(reason) = state.reject_next.take() {
            warn!(%user, %conversation, %reason, "rejecting chat session");
            return Err(ChatError::SessionRejected(reason));
        }
        if state.session.is_some() {
            return Err(ChatError::AlreadyConnected);
        }
        state.session = Some((user, conversation));
        info!(%user, %conversation, "chat session opened");
        Ok(())
    }

    fn observe_messages(&self, conversation: ConversationId) -> BoxStream<'static, ChatMessage> {
        let receiver = self.lock().channel(conversation).subscribe();
        BroadcastStream::new(receiver)
            .filter_map(move |item| {
                future::ready(match item {
                    Ok(message) => Some(message),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(%conversation, skipped, "chat observer lagged");
                        None
                    }
                })
            })
            .boxed()
    }

    async fn send_message(&self, message: &OutgoingMessage) -> ChatResult<()> {
        let mut state = self.lock();
        let Some((user, conversation)) = state.session else {
            return Err(ChatError::NotConnected);
        };
        if user != message.sender || conversation != message.conversation_id {
            return Err(ChatError::NotConnected);
        }
        let delivered = message.clone().delivered(self.clock.utc());
        let reached = state.channel(conversation).send(delivered).unwrap_or(0);
        debug!(%conversation, id = %message.id, reached, "chat message echoed");
        Ok(())
    }

    async fn close_session(&self) -> ChatResult<()> {
        if let Some((user, conversation)) = self.lock().session.take() {
            info!(%user, %conversation, "chat session closed");
        }
        Ok(())
    }
}
