//! End-to-end: a presenter agent talks to the display server while the
//! web UI reports its channel.

use std::sync::Arc;
use std::time::Duration;

use presenter_server::collaborator::{AppType, WebServer};
use presenter_server::config::{DisplayConfig, WebConfig};
use presenter_server::display::codec::{self, ContentType, Frame, ResultCode};
use presenter_server::display::{ChannelRegistry, DisplayServer};
use presenter_server::web::WebApp;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

fn display_config() -> DisplayConfig {
    DisplayConfig {
        bind_address: "127.0.0.1:0".into(),
        max_connections: 4,
        max_frame_bytes: 64 * 1024,
        idle_timeout_ms: 5_000,
    }
}

async fn request(stream: &mut TcpStream, frame: Frame) -> Frame {
    codec::write_frame(stream, &frame).await.unwrap();
    tokio::time::timeout(Duration::from_secs(2), codec::read_frame(stream, 64 * 1024))
        .await
        .expect("reply in time")
        .unwrap()
        .expect("reply frame")
}

#[tokio::test]
async fn agent_channel_visible_in_web_ui() {
    let registry = Arc::new(ChannelRegistry::new());
    let display = DisplayServer::new(display_config(), Arc::clone(&registry));
    let running = display.start().await.unwrap();

    let web = WebApp::new(
        WebConfig { bind_address: "127.0.0.1:0".into() },
        AppType::Display,
        Arc::clone(&registry),
    );
    assert!(web.start().await);
    let web_addr = web.local_addr().await.unwrap();

    let mut agent = TcpStream::connect(running.local_addr()).await.unwrap();
    let open = Frame::new(
        codec::OPEN_CHANNEL_REQUEST,
        codec::open_channel_body(ContentType::Video, "camera-0"),
    );
    let reply = request(&mut agent, open).await;
    assert_eq!(reply, Frame::response(codec::OPEN_CHANNEL_RESPONSE, ResultCode::Ok));

    let reply = request(&mut agent, Frame::new(codec::PRESENT_IMAGE_REQUEST, vec![0xAB; 512])).await;
    assert_eq!(reply.body, vec![ResultCode::Ok as u8]);

    let client = reqwest::Client::new();
    let health = client.get(format!("http://{}/health", web_addr)).send().await.unwrap();
    assert!(health.status().is_success());
    assert_eq!(health.text().await.unwrap(), "ok");

    let status: Value = client
        .get(format!("http://{}/api/status", web_addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["app"], "display");
    assert_eq!(status["channels"], 1);

    let channels: Value = client
        .get(format!("http://{}/api/channels", web_addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(channels[0]["name"], "camera-0");
    assert_eq!(channels[0]["content_type"], "video");
    assert_eq!(channels[0]["frames"], 1);
    assert_eq!(channels[0]["bytes"], 512);
    let opened = channels[0]["opened_at_unix_ms"].as_u64().unwrap();
    assert!(channels[0]["last_seen_unix_ms"].as_u64().unwrap() >= opened);

    web.stop().await;
    assert!(web.local_addr().await.is_none());
    running.shutdown().await;
    assert!(registry.is_empty());
}

#[tokio::test]
async fn second_agent_cannot_take_open_channel() {
    let registry = Arc::new(ChannelRegistry::new());
    let running = DisplayServer::new(display_config(), Arc::clone(&registry))
        .start()
        .await
        .unwrap();

    let mut first = TcpStream::connect(running.local_addr()).await.unwrap();
    let mut second = TcpStream::connect(running.local_addr()).await.unwrap();

    let open = || Frame::new(codec::OPEN_CHANNEL_REQUEST, codec::open_channel_body(ContentType::Image, "cam"));
    assert_eq!(request(&mut first, open()).await.body, vec![ResultCode::Ok as u8]);
    assert_eq!(request(&mut second, open()).await.body, vec![ResultCode::ChannelAlreadyOpen as u8]);

    // Closing the owner frees the name.
    drop(first);
    let mut freed = false;
    for _ in 0..50 {
        if registry.is_empty() {
            freed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(freed);
    assert_eq!(request(&mut second, open()).await.body, vec![ResultCode::Ok as u8]);

    running.shutdown().await;
}

#[tokio::test]
async fn malformed_frame_closes_connection() {
    let registry = Arc::new(ChannelRegistry::new());
    let running = DisplayServer::new(display_config(), registry).start().await.unwrap();

    let mut agent = TcpStream::connect(running.local_addr()).await.unwrap();
    // Size field equal to the header alone: zero-length payload.
    agent.write_all(&4u32.to_be_bytes()).await.unwrap();

    let next = tokio::time::timeout(Duration::from_secs(2), codec::read_frame(&mut agent, 1024))
        .await
        .expect("server should close");
    assert!(matches!(next, Ok(None) | Err(_)));

    running.shutdown().await;
}

#[tokio::test]
async fn display_bind_failure_yields_no_handle() {
    use presenter_server::AppServer;

    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let config = DisplayConfig {
        bind_address: occupied.local_addr().unwrap().to_string(),
        ..display_config()
    };

    let display = DisplayServer::new(config, Arc::new(ChannelRegistry::new()));
    assert!(display.run().await.is_none());
}

#[tokio::test]
async fn web_bind_failure_reports_false() {
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let web = WebApp::new(
        WebConfig { bind_address: occupied.local_addr().unwrap().to_string() },
        AppType::Display,
        Arc::new(ChannelRegistry::new()),
    );

    assert!(!web.start().await);
    // Stop without a successful start is a no-op.
    web.stop().await;
}
