use crate::session::{Binding, Endpoint, EndpointId, SessionRegistry};
use crate::signaling::messages::{Outbound, ServerMessage};
use crate::signaling::relay::RelayEngine;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use log::{debug, info};

/// Reconciles the registry when `endpoint` stops being what it was bound as.
///
/// Controller: the slot is released, the session stays, the host hears
/// `controller-left`. Host: the session is deleted, the controller hears
/// `host-left`. Unbound: nothing.
pub fn detach(registry: &mut SessionRegistry, endpoint: EndpointId) -> Option<Outbound> {
    match registry.find_by_endpoint(endpoint) {
        Binding::Unbound => None,
        Binding::Controller(code) => {
            registry.release_controller(&code);
            let host = registry.lookup(&code)?.host.clone();
            host.is_open()
                .then(|| Outbound::message(host, ServerMessage::ControllerLeft { code }))
        }
        Binding::Host(code) => {
            let controller = registry.remove_by_host_disconnect(&code)?.controller?;
            controller
                .is_open()
                .then(|| Outbound::message(controller, ServerMessage::HostLeft { code }))
        }
    }
}

/// Runs one signaling connection until the socket closes.
pub async fn serve_connection(socket: WebSocket, engine: RelayEngine) {
    let (endpoint, mut outbound) = Endpoint::channel();
    let id = endpoint.id();
    info!("Connection {} opened", id);

    let (mut sink, mut stream) = socket.split();

    let writer = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if let Err(e) = sink.send(Message::Text(text)).await {
                debug!("Write to {} failed: {}", id, e);
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => engine.handle(&endpoint, &text),
            Ok(Message::Binary(data)) => match String::from_utf8(data) {
                Ok(text) => engine.handle(&endpoint, &text),
                Err(_) => debug!("Dropping non UTF-8 binary frame from {}", id),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Connection {} errored: {}", id, e);
                break;
            }
        }
    }

    writer.abort();
    engine.disconnect(&endpoint);
    info!("Connection {} closed", id);
}
