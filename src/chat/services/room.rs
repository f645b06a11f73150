//! One open conversation: session handshake, live messages, and the draft.

use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use mockable::Clock;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::chat::{
    domain::{ChatMessage, ChatState, MessageId, OutgoingMessage},
    error::{ChatError, ChatResult},
    ports::{ChatSocket, NotificationSink},
};
use crate::feed::domain::{ConversationId, UserId};

const TOAST_CAPACITY: usize = 16;

struct Connection {
    user: UserId,
    conversation: ConversationId,
    listener: JoinHandle<()>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

/// Chat room bound to at most one conversation at a time.
///
/// Received messages are listed newest first. Failures the user should see
/// are broadcast as toast strings in addition to being returned.
///
/// Dropping the room stops the message listener but does not close the
/// socket session; call [`ChatRoom::disconnect`] for that.
pub struct ChatRoom<S, N, K>
where
    S: ChatSocket + 'static,
    N: NotificationSink + 'static,
    K: Clock + Send + Sync + 'static,
{
    socket: Arc<S>,
    notifier: Arc<N>,
    clock: Arc<K>,
    state: Arc<watch::Sender<ChatState>>,
    draft: watch::Sender<String>,
    toasts: broadcast::Sender<String>,
    connection: Mutex<Option<Connection>>,
}

impl<S, N, K> ChatRoom<S, N, K>
where
    S: ChatSocket + 'static,
    N: NotificationSink + 'static,
    K: Clock + Send + Sync + 'static,
{
    /// Creates a disconnected room.
    #[must_use]
    pub fn new(socket: Arc<S>, notifier: Arc<N>, clock: Arc<K>) -> Self {
        let (state, _) = watch::channel(ChatState::default());
        let (draft, _) = watch::channel(String::new());
        let (toasts, _) = broadcast::channel(TOAST_CAPACITY);
        Self {
            socket,
            notifier,
            clock,
            state: Arc::new(state),
            draft,
            toasts,
            connection: Mutex::new(None),
        }
    }

    /// Opens a session and starts listening for messages.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::AlreadyConnected`] when a session is open, or the
    /// socket's error when the session cannot be opened. Socket failures are
    /// also broadcast as toasts.
    pub async fn connect(&self, user: UserId, conversation: ConversationId) -> ChatResult<()> {
        let mut connection = self.connection.lock().await;
        if connection.is_some() {
            return Err(ChatError::AlreadyConnected);
        }
        if let Err(err) = self.socket.open_session(user, conversation).await {
            warn!(%user, %conversation, error = %err, "failed to open chat session");
            self.toast(err.to_string());
            return Err(err);
        }

        let messages = self.socket.observe_messages(conversation);
        self.state.send_modify(|state| state.connect(conversation));
        let listener = tokio::spawn(receive_messages(
            messages,
            Arc::clone(&self.state),
            Arc::clone(&self.notifier),
        ));
        *connection = Some(Connection {
            user,
            conversation,
            listener,
        });
        info!(%user, %conversation, "chat room connected");
        Ok(())
    }

    /// Replaces the draft text.
    pub fn set_draft(&self, text: impl Into<String>) {
        self.draft.send_replace(text.into());
    }

    /// Returns the draft text.
    #[must_use]
    pub fn draft(&self) -> String {
        self.draft.borrow().clone()
    }

    /// Sends the draft to the connected conversation.
    ///
    /// Blank drafts are ignored and yield `Ok(None)`. On success the draft is
    /// cleared and the new message id is returned.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::NotConnected`] when no session is open, or the
    /// socket's error when sending fails. Socket failures are also broadcast
    /// as toasts and leave the draft in place.
    pub async fn send(&self) -> ChatResult<Option<MessageId>> {
        let text = self.draft();
        if text.trim().is_empty() {
            debug!("ignoring blank draft");
            return Ok(None);
        }

        let (user, conversation) = {
            let connection = self.connection.lock().await;
            connection
                .as_ref()
                .map(|open| (open.user, open.conversation))
                .ok_or(ChatError::NotConnected)?
        };

        let message = OutgoingMessage::new(conversation, user, text, self.clock.utc());
        if let Err(err) = self.socket.send_message(&message).await {
            warn!(%conversation, error = %err, "failed to send chat message");
            self.toast(err.to_string());
            return Err(err);
        }
        self.notifier.on_emit(&message);
        self.draft.send_replace(String::new());
        debug!(%conversation, id = %message.id, "chat message sent");
        Ok(Some(message.id))
    }

    /// Stops listening and closes the socket session.
    ///
    /// Disconnecting a disconnected room does nothing. Received messages stay
    /// in the state.
    ///
    /// # Errors
    ///
    /// Returns the socket's error when closing the session fails.
    pub async fn disconnect(&self) -> ChatResult<()> {
        let Some(connection) = self.connection.lock().await.take() else {
            return Ok(());
        };
        let conversation = connection.conversation;
        drop(connection);
        self.state.send_modify(ChatState::disconnect);
        self.socket.close_session().await?;
        info!(%conversation, "chat room disconnected");
        Ok(())
    }

    /// Returns a receiver observing the room state.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state.subscribe()
    }

    /// Returns a copy of the room state.
    #[must_use]
    pub fn state(&self) -> ChatState {
        self.state.borrow().clone()
    }

    /// Returns a receiver for toast messages raised from now on.
    #[must_use]
    pub fn toasts(&self) -> broadcast::Receiver<String> {
        self.toasts.subscribe()
    }

    fn toast(&self, text: String) {
        if self.toasts.send(text).is_err() {
            debug!("no toast observers");
        }
    }
}

async fn receive_messages<N>(
    mut messages: BoxStream<'static, ChatMessage>,
    state: Arc<watch::Sender<ChatState>>,
    notifier: Arc<N>,
) where
    N: NotificationSink + ?Sized,
{
    while let Some(message) = messages.next().await {
        if state.send_if_modified(|current| current.receive(&message)) {
            notifier.on_received(&message);
        } else {
            debug!(id = %message.id, "ignoring duplicate chat message");
        }
    }
    debug!("chat message stream ended");
}
