//! WebSocket endpoint for the live community feed
//!
//! ## Connection lifecycle
//!
//! 1. Client connects: GET /ws/community
//! 2. The session subscribes itself to the feed hub
//! 3. Every broadcast event is forwarded as a JSON text frame
//! 4. On disconnect the session unsubscribes from the hub
//!
//! Listeners are read-only; incoming frames other than ping/close are
//! ignored. Events broadcast before a client connects are not replayed.

use actix::{Actor, ActorContext, AsyncContext, StreamHandler};
use actix_web::{web, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use std::sync::Arc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::services::broadcast::{ConnectionId, FeedEvent, FeedHub};

/// Per-connection session actor
pub struct FeedSession {
    hub: Arc<FeedHub>,
    connection_id: Option<ConnectionId>,
}

impl FeedSession {
    pub fn new(hub: Arc<FeedHub>) -> Self {
        Self {
            hub,
            connection_id: None,
        }
    }
}

impl Actor for FeedSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let (connection_id, rx) = self.hub.subscribe();
        self.connection_id = Some(connection_id);
        ctx.add_stream(UnboundedReceiverStream::new(rx));

        tracing::debug!(%connection_id, "feed listener connected");
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        if let Some(connection_id) = self.connection_id.take() {
            self.hub.unsubscribe(connection_id);
            tracing::debug!(%connection_id, "feed listener disconnected");
        }
    }
}

/// Events fanned out by the hub
impl StreamHandler<FeedEvent> for FeedSession {
    fn handle(&mut self, event: FeedEvent, ctx: &mut Self::Context) {
        if let Ok(text) = serde_json::to_string(&event) {
            ctx.text(text);
        }
    }
}

/// Frames arriving from the client
impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for FeedSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(bytes)) => ctx.pong(&bytes),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(_) => {
                // Listeners only receive; anything else is ignored
            }
            Err(_) => ctx.stop(),
        }
    }
}

/// WebSocket upgrade handler
/// GET /ws/community
pub async fn community_feed_ws(
    req: HttpRequest,
    stream: web::Payload,
    hub: web::Data<FeedHub>,
) -> Result<HttpResponse, actix_web::Error> {
    ws::start(FeedSession::new(hub.into_inner()), &req, stream)
}
