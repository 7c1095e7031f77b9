use crate::state::AppState;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, stream::StreamExt};
use snapshot_feed::{Broadcaster, DeliveryFailure, Subscription};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sender, incoming) = socket.split();
    serve_subscriber(state.ingestor.broadcaster(), sender, incoming).await;
}

/// Relay published snapshots to one client until it leaves or a write
/// fails. A failed write is an eviction; a client close is an unsubscribe.
async fn serve_subscriber<Tx, Rx, E>(broadcaster: &Broadcaster, mut sender: Tx, mut incoming: Rx)
where
    Tx: Sink<Message> + Unpin + Send + 'static,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
{
    let Subscription { id, mut receiver } = broadcaster.subscribe();

    // Resolves to true when a frame could not be written.
    let mut forward_task = tokio::spawn(async move {
        while let Some(payload) = receiver.recv().await {
            if sender
                .send(Message::Text(String::from(&*payload).into()))
                .await
                .is_err()
            {
                return true;
            }
        }
        false
    });

    // Client messages are ignored; the loop only watches for disconnect.
    let send_failed = loop {
        tokio::select! {
            msg = incoming.next() => match msg {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break false,
                Some(Ok(_)) => {}
            },
            result = &mut forward_task => break matches!(result, Ok(true)),
        }
    };

    forward_task.abort();
    if send_failed {
        broadcaster.evict_one(id, DeliveryFailure::Closed);
    } else {
        broadcaster.unsubscribe(id);
    }
}
