//! `/ws`: live updates for dashboard viewers.
//!
//! Each viewer owns a [`Subscription`]. Two tasks serve it: one copies
//! queued frames (and periodic pings) to the socket, the other reads the
//! socket until the viewer leaves. When either stops, both stop and the
//! subscription is dropped, which frees the viewer's slot.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::MIN_PING_INTERVAL;
use crate::error::DashboardError;
use crate::fanout::Subscription;
use crate::state::DashboardState;

/// GET /ws. Refused with 503 when the viewer cap is reached.
pub async fn ws_upgrade(
    State(state): State<Arc<DashboardState>>,
    ws: WebSocketUpgrade,
) -> Result<Response, DashboardError> {
    let subscription = state.subscribers().try_subscribe()?;
    let configured = state.config().ws_ping_interval;
    let ping_every = if configured.is_zero() { MIN_PING_INTERVAL } else { configured };

    Ok(ws.on_upgrade(move |socket| serve_viewer(socket, subscription, ping_every)))
}

async fn serve_viewer(socket: WebSocket, subscription: Subscription, ping_every: Duration) {
    let viewer = subscription.id();
    info!(viewer, "viewer connected");

    let (sink, stream) = socket.split();
    let mut outbound = tokio::spawn(push_updates(sink, subscription, ping_every));
    let mut inbound = tokio::spawn(read_until_closed(stream));

    tokio::select! {
        _ = &mut outbound => {
            debug!(viewer, "outbound side finished");
            inbound.abort();
        }
        _ = &mut inbound => {
            debug!(viewer, "inbound side finished");
            outbound.abort();
        }
    }

    info!(viewer, "viewer disconnected");
}

/// Copy queued frames to the socket, pinging whenever the interval elapses.
async fn push_updates(
    mut sink: SplitSink<WebSocket, Message>,
    mut subscription: Subscription,
    ping_every: Duration,
) {
    let mut pings = interval(ping_every);
    pings.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately.
    pings.tick().await;

    loop {
        let outgoing = tokio::select! {
            frame = subscription.recv() => match frame {
                Some(frame) => Message::text(&*frame),
                None => break,
            },
            _ = pings.tick() => Message::Ping(Bytes::new()),
        };
        if sink.send(outgoing).await.is_err() {
            break;
        }
    }

    let _ = sink.close().await;
}

/// Viewers only listen; anything they send besides a close is discarded.
async fn read_until_closed(mut stream: SplitStream<WebSocket>) {
    while let Some(received) = stream.next().await {
        match received {
            Ok(Message::Close(_)) => break,
            Ok(Message::Text(text)) => {
                debug!(len = text.len(), "discarding text from viewer");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "viewer socket error");
                break;
            }
        }
    }
}
