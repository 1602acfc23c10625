#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use signal_relay_lib::session::CodeSource;
use signal_relay_lib::{CredentialBroker, SessionRegistry, SharedRegistry, SignalingServer};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Hands out the given codes in order.
pub struct Scripted(pub VecDeque<&'static str>);

impl CodeSource for Scripted {
    fn next_code(&mut self) -> String {
        self.0.pop_front().unwrap_or("ZZZZZZ").to_string()
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: SharedRegistry,
}

pub async fn start(codes: &[&'static str], broker: CredentialBroker) -> TestServer {
    let registry = SessionRegistry::with_codes(Box::new(Scripted(codes.iter().copied().collect())));
    let server = SignalingServer::new(registry, broker);
    let registry = server.registry();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server.run(listener, std::future::pending()));

    TestServer { addr, registry }
}

pub async fn connect(addr: SocketAddr) -> Client {
    let (ws, _) = connect_async(format!("ws://{}/", addr)).await.unwrap();
    ws
}

pub async fn send_text(client: &mut Client, text: &str) {
    client.send(Message::Text(text.to_string())).await.unwrap();
}

pub async fn send_binary(client: &mut Client, bytes: &[u8]) {
    client.send(Message::Binary(bytes.to_vec())).await.unwrap();
}

pub async fn send(client: &mut Client, value: Value) {
    send_text(client, &value.to_string()).await;
}

pub async fn recv_text(client: &mut Client) -> String {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            return text;
        }
    }
}

pub async fn recv(client: &mut Client) -> Value {
    serde_json::from_str(&recv_text(client).await).unwrap()
}

pub async fn assert_silent(client: &mut Client) {
    let next = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(next.is_err(), "unexpected frame: {:?}", next);
}

/// Polls until `check` holds on the registry.
pub async fn eventually(registry: &SharedRegistry, check: impl Fn(&SessionRegistry) -> bool) {
    for _ in 0..100 {
        if check(&*registry.lock()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("registry never reached the expected state");
}
