// SPDX-FileCopyrightText: 2026 Guichet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end gateway test: real server, real WebSocket clients.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use guichet_core::Hall;
use guichet_gateway::{ConnMap, GatewayState, run_dispatcher};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_gateway() -> SocketAddr {
    let (hall_tx, hall_rx) = mpsc::channel(64);
    let conns: ConnMap = Arc::new(DashMap::new());
    tokio::spawn(run_dispatcher(Hall::new(), hall_rx, conns.clone()));

    let listener = guichet_gateway::bind("127.0.0.1", 0).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = GatewayState {
        hall_tx,
        conns,
        start_time: std::time::Instant::now(),
    };
    tokio::spawn(guichet_gateway::serve(
        listener,
        state,
        futures::future::pending(),
    ));
    addr
}

async fn connect(addr: SocketAddr) -> Client {
    let (client, _response) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    client
}

async fn next_event(client: &mut Client) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("timed out waiting for event")
        .expect("stream ended")
        .expect("websocket error");
    serde_json::from_str(msg.into_text().unwrap().as_str()).unwrap()
}

async fn send(client: &mut Client, json: &str) {
    client
        .send(Message::Text(json.to_string().into()))
        .await
        .unwrap();
}

#[tokio::test]
async fn snapshot_fanout_and_error_isolation() {
    let addr = start_gateway().await;

    let mut kiosk = connect(addr).await;
    let initial = next_event(&mut kiosk).await;
    assert_eq!(initial["type"], "initial-state");
    assert_eq!(initial["allQueues"]["Normal"], serde_json::json!([]));

    // A ticket drawn before the display connects shows up in its snapshot.
    send(
        &mut kiosk,
        r#"{"type": "generate-ticket", "category": "Normal"}"#,
    )
    .await;
    let generated = next_event(&mut kiosk).await;
    assert_eq!(generated["type"], "ticket-generated");
    assert_eq!(generated["ticket"]["number"], "N001");

    let mut display = connect(addr).await;
    let initial = next_event(&mut display).await;
    assert_eq!(initial["type"], "initial-state");
    assert_eq!(initial["allQueues"]["Normal"][0]["number"], "N001");

    // A failed call goes only to the counter that issued it.
    let mut counter = connect(addr).await;
    next_event(&mut counter).await;
    send(
        &mut counter,
        r#"{"type": "call-next", "category": "Priority", "counterId": "1", "attendantId": "a"}"#,
    )
    .await;
    let error = next_event(&mut counter).await;
    assert_eq!(error["type"], "call-error");
    assert_eq!(error["message"], "no tickets waiting in the Priority queue");

    // Everyone's next event is the following broadcast, proving the error
    // was never fanned out.
    send(
        &mut counter,
        r#"{"type": "call-next", "category": "Normal", "counterId": "1", "attendantId": "a"}"#,
    )
    .await;
    for client in [&mut kiosk, &mut display, &mut counter] {
        let called = next_event(client).await;
        assert_eq!(called["type"], "ticket-called");
        assert_eq!(called["ticket"]["number"], "N001");
        assert_eq!(called["counterId"], "1");
        assert_eq!(called["attendantId"], "a");
        assert_eq!(called["allQueues"]["Normal"], serde_json::json!([]));
    }
}

#[tokio::test]
async fn malformed_messages_are_ignored_silently() {
    let addr = start_gateway().await;

    let mut kiosk = connect(addr).await;
    next_event(&mut kiosk).await;

    send(&mut kiosk, "not json at all").await;
    send(&mut kiosk, r#"{"type": "shuffle-queue"}"#).await;

    // The connection stays up and the next valid request still works.
    send(
        &mut kiosk,
        r#"{"type": "generate-ticket", "category": "Pickup"}"#,
    )
    .await;
    let generated = next_event(&mut kiosk).await;
    assert_eq!(generated["type"], "ticket-generated");
    assert_eq!(generated["ticket"]["number"], "R001");
}

#[tokio::test]
async fn disconnect_leaves_sessions_and_queues_intact() {
    let addr = start_gateway().await;

    let mut counter = connect(addr).await;
    next_event(&mut counter).await;
    send(
        &mut counter,
        r#"{"type": "generate-ticket", "category": "Normal"}"#,
    )
    .await;
    next_event(&mut counter).await;
    send(
        &mut counter,
        r#"{"type": "call-next", "category": "Normal", "counterId": "1", "attendantId": "a"}"#,
    )
    .await;
    next_event(&mut counter).await;
    counter.close(None).await.unwrap();

    // The attendant's session (holding N001) survives the disconnect: a
    // new connection finishing on its behalf succeeds.
    let mut relief = connect(addr).await;
    next_event(&mut relief).await;
    send(
        &mut relief,
        r#"{"type": "finish-service", "ticket": {"number": "N001"}, "attendantId": "a"}"#,
    )
    .await;
    let finished = next_event(&mut relief).await;
    assert_eq!(finished["type"], "service-finished");
    assert_eq!(finished["ticket"]["number"], "N001");
}
