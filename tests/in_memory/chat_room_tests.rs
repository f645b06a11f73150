//! Chat room behaviour over the loopback socket.

use std::sync::Arc;

use chatfeed::chat::{
    adapters::memory::{InMemoryChatSocket, RecordingNotificationSink},
    domain::{ChatState, OutgoingMessage},
    error::ChatError,
    services::ChatRoom,
};
use chatfeed::feed::domain::{ConversationId, UserId};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

use super::helpers::{WAIT, wait_until};

type Room = ChatRoom<InMemoryChatSocket<DefaultClock>, RecordingNotificationSink, DefaultClock>;

struct Harness {
    socket: Arc<InMemoryChatSocket<DefaultClock>>,
    notifier: Arc<RecordingNotificationSink>,
    room: Room,
}

#[fixture]
fn harness() -> Harness {
    let socket = Arc::new(InMemoryChatSocket::new(Arc::new(DefaultClock)));
    let notifier = Arc::new(RecordingNotificationSink::new());
    let room = ChatRoom::new(
        Arc::clone(&socket),
        Arc::clone(&notifier),
        Arc::new(DefaultClock),
    );
    Harness {
        socket,
        notifier,
        room,
    }
}

async fn wait_for_messages(room: &Room, count: usize) -> ChatState {
    let mut states = room.subscribe();
    let state = tokio::time::timeout(WAIT, states.wait_for(|s| s.messages().len() == count))
        .await
        .expect("messages should arrive in time")
        .expect("room should stay alive");
    ChatState::clone(&state)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn conversation_round_trip(harness: Harness) {
    let Harness {
        socket,
        notifier,
        room,
    } = harness;
    let conversation = ConversationId::new(5);
    room.connect(UserId::new(1), conversation)
        .await
        .expect("session opens");

    let now = chrono::Utc::now();
    let incoming =
        OutgoingMessage::new(conversation, UserId::new(2), "ping", now).delivered(now);
    socket.deliver(incoming.clone());
    wait_for_messages(&room, 1).await;

    room.set_draft("pong");
    let sent = room
        .send()
        .await
        .expect("send succeeds")
        .expect("draft is not blank");
    let state = wait_for_messages(&room, 2).await;

    let texts: Vec<_> = state.messages().iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["pong", "ping"]);
    assert_eq!(notifier.emitted(), vec![sent]);
    assert_eq!(notifier.received(), vec![incoming.id, sent]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rejected_session_is_toasted_and_retry_succeeds(harness: Harness) {
    let Harness { socket, room, .. } = harness;
    let mut toasts = room.toasts();
    socket.reject_next_session("server busy");

    let first = room.connect(UserId::new(1), ConversationId::new(1)).await;
    assert!(matches!(first, Err(ChatError::SessionRejected(_))));
    let toast = toasts.recv().await.expect("toast delivered");
    assert!(toast.contains("server busy"));

    room.connect(UserId::new(1), ConversationId::new(1))
        .await
        .expect("second attempt opens the session");
    assert!(room.state().is_connected());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn dropping_the_room_releases_the_listener(harness: Harness) {
    let Harness { socket, room, .. } = harness;
    let conversation = ConversationId::new(3);
    room.connect(UserId::new(1), conversation)
        .await
        .expect("session opens");
    assert_eq!(socket.observers(conversation), 1);

    drop(room);

    wait_until(|| socket.observers(conversation) == 0).await;
}
