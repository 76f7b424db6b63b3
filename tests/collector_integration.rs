//! Integration tests for the coordinator and download tasks.
//!
//! These tests drive real spawned download tasks against mock HTTP
//! servers and verify the files that land in the output directory.

use std::sync::Arc;

use avatar_collector::{AvatarClient, Coordinator, Event, Flow, NamingMode, RunConfig};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 64]);
    bytes
}

fn jpeg_bytes() -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.extend_from_slice(&[0u8; 64]);
    bytes
}

/// Helper to mount an avatar endpoint returning the given payload.
async fn mount_avatar(server: &MockServer, path_str: &str, payload: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload))
        .mount(server)
        .await;
}

fn coordinator(max: usize, naming: NamingMode, dir: &TempDir) -> Arc<Coordinator> {
    let config = RunConfig::new(max, None, dir.path(), naming).expect("valid config");
    Arc::new(Coordinator::new(config, AvatarClient::new()))
}

fn event(key: &str, screen_name: &str, avatar_url: String) -> Event {
    Event {
        user_key: key.to_string(),
        screen_name: screen_name.to_string(),
        language: "en".to_string(),
        has_text: true,
        avatar_url,
    }
}

#[tokio::test]
async fn test_collects_target_count_then_stops() {
    let server = MockServer::start().await;
    mount_avatar(&server, "/a.png", png_bytes()).await;
    mount_avatar(&server, "/b.png", png_bytes()).await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let coordinator = coordinator(2, NamingMode::UserId, &dir);

    let uri = server.uri();
    assert_eq!(
        coordinator.on_event(event("1", "alice", format!("{uri}/a.png"))),
        Flow::Continue
    );
    assert_eq!(
        coordinator.on_event(event("2", "bob", format!("{uri}/b.png"))),
        Flow::Continue
    );
    // Duplicate while in flight or saved: rejected, stream continues.
    assert_eq!(
        coordinator.on_event(event("1", "alice", format!("{uri}/a.png"))),
        Flow::Continue
    );

    coordinator.drain().await;
    assert_eq!(coordinator.saved_count(), 2);
    assert!(dir.path().join("1.png").exists());
    assert!(dir.path().join("2.png").exists());

    // The very next event reports Stop and is never downloaded.
    assert_eq!(
        coordinator.on_event(event("3", "carol", format!("{uri}/a.png"))),
        Flow::Stop
    );
    coordinator.drain().await;
    assert!(!dir.path().join("3.png").exists());
    assert_eq!(coordinator.saved_count(), 2);
}

#[tokio::test]
async fn test_failed_download_releases_key_for_retry() {
    let server = MockServer::start().await;
    mount_avatar(&server, "/good.png", png_bytes()).await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let coordinator = coordinator(1, NamingMode::UserId, &dir);

    // No mock for /missing.png: the server answers 404.
    let uri = server.uri();
    coordinator.on_event(event("1", "alice", format!("{uri}/missing.png")));
    coordinator.drain().await;
    assert_eq!(coordinator.saved_count(), 0);
    assert_eq!(coordinator.processing_count(), 0);

    // A later event from the same user is admitted again.
    assert_eq!(
        coordinator.on_event(event("1", "alice", format!("{uri}/good.png"))),
        Flow::Continue
    );
    coordinator.drain().await;
    assert_eq!(coordinator.saved_count(), 1);
    assert!(dir.path().join("1.png").exists());
}

#[tokio::test]
async fn test_non_image_payload_fails_without_writing() {
    let server = MockServer::start().await;
    mount_avatar(&server, "/fake.png", b"<html>not an image</html>".to_vec()).await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let coordinator = coordinator(1, NamingMode::UserId, &dir);

    coordinator.on_event(event("1", "alice", format!("{}/fake.png", server.uri())));
    coordinator.drain().await;

    assert_eq!(coordinator.saved_count(), 0);
    assert_eq!(coordinator.processing_count(), 0);
    assert_eq!(
        std::fs::read_dir(dir.path()).expect("read dir").count(),
        0,
        "nothing should be written for an invalid payload"
    );
}

#[tokio::test]
async fn test_jpeg_payload_saved_with_jpg_extension() {
    let server = MockServer::start().await;
    mount_avatar(&server, "/a", jpeg_bytes()).await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let coordinator = coordinator(1, NamingMode::UserId, &dir);

    coordinator.on_event(event("42", "alice", format!("{}/a", server.uri())));
    coordinator.drain().await;

    assert!(
        dir.path().join("42.jpg").exists(),
        "jpeg must be saved with the normalized .jpg extension"
    );
}

#[tokio::test]
async fn test_screen_name_naming_mode() {
    let server = MockServer::start().await;
    mount_avatar(&server, "/a.png", png_bytes()).await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let coordinator = coordinator(1, NamingMode::ScreenName, &dir);

    coordinator.on_event(event("42", "alice", format!("{}/a.png", server.uri())));
    coordinator.drain().await;

    assert!(dir.path().join("alice.png").exists());
    assert!(!dir.path().join("42.png").exists());
}

#[tokio::test]
async fn test_language_filter_rejects_other_languages() {
    let server = MockServer::start().await;
    mount_avatar(&server, "/a.png", png_bytes()).await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let config = RunConfig::new(
        1,
        Some("ja".to_string()),
        dir.path(),
        NamingMode::UserId,
    )
    .expect("valid config");
    let coordinator = Arc::new(Coordinator::new(config, AvatarClient::new()));

    let mut en_event = event("1", "alice", format!("{}/a.png", server.uri()));
    en_event.language = "en".to_string();
    assert_eq!(coordinator.on_event(en_event), Flow::Continue);
    coordinator.drain().await;
    assert_eq!(coordinator.saved_count(), 0);

    let mut ja_event = event("2", "bob", format!("{}/a.png", server.uri()));
    ja_event.language = "ja".to_string();
    coordinator.on_event(ja_event);
    coordinator.drain().await;
    assert_eq!(coordinator.saved_count(), 1);
}

#[tokio::test]
async fn test_concurrent_admissions_never_overshoot() {
    // Admissions beyond the target are rejected even while everything
    // admitted is still in flight, and completions never push saved
    // past max.
    let server = MockServer::start().await;
    let delayed = ResponseTemplate::new(200)
        .set_body_bytes(png_bytes())
        .set_delay(std::time::Duration::from_millis(100));
    Mock::given(method("GET"))
        .respond_with(delayed)
        .mount(&server)
        .await;
    let dir = TempDir::new().expect("failed to create temp dir");
    let coordinator = coordinator(3, NamingMode::UserId, &dir);

    let uri = server.uri();
    for key in ["1", "2", "3"] {
        assert_eq!(
            coordinator.on_event(event(key, key, format!("{uri}/{key}.png"))),
            Flow::Continue
        );
    }
    assert_eq!(coordinator.processing_count(), 3);

    // Fourth distinct user while all three are still downloading.
    assert_eq!(
        coordinator.on_event(event("4", "dora", format!("{uri}/4.png"))),
        Flow::Continue
    );
    assert_eq!(coordinator.processing_count(), 3, "no admission past max");

    coordinator.drain().await;
    assert_eq!(coordinator.saved_count(), 3);
    assert_eq!(coordinator.processing_count(), 0);
}
