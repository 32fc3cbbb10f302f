//! End-to-end tests against a real HTTP origin.
//!
//! Each test builds an image tree in a temp dir, serves it with axum's static
//! file service on an ephemeral loopback port, and drives the loader, probes,
//! and discovery through [`HttpOrigin`].
//!
//! Run with: `cargo test --test http_origin`

use album_carousel::config::CarouselConfig;
use album_carousel::load::{self, CatalogSource, ManifestSource};
use album_carousel::origin::HttpOrigin;
use album_carousel::probe::Prober;
use album_carousel::repair::AlbumState;
use album_carousel::scan;
use axum::Router;
use axum::routing::get;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tower_http::services::ServeDir;

const JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x02\0\0\0";

// ---------------------------------------------------------------------------
// Setup helpers
// ---------------------------------------------------------------------------

fn write(root: &Path, rel: &str, bytes: &[u8]) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, bytes).unwrap();
}

/// Hangs long past any probe timeout used here.
async fn stalled() -> &'static str {
    tokio::time::sleep(Duration::from_secs(30)).await;
    "too late"
}

/// Serve `root` on 127.0.0.1 and return an origin pointed at it.
async fn serve(root: &Path) -> HttpOrigin {
    let app = Router::new()
        .route("/images/stalled.jpg", get(stalled))
        .fallback_service(ServeDir::new(root));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    HttpOrigin::new(&format!("http://{addr}/")).unwrap()
}

// ---------------------------------------------------------------------------
// Image existence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn served_images_recognized() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "images/photo1.JPG", JPEG);
    write(tmp.path(), "images/a4/cover.png", PNG);
    let origin = serve(tmp.path()).await;

    let timeout = Duration::from_secs(2);
    assert!(origin.exists("images/photo1.JPG", timeout).await);
    assert!(origin.exists("/images/a4/cover.png", timeout).await);
    assert!(!origin.exists("images/photo9.JPG", timeout).await);
}

#[tokio::test]
async fn non_image_body_is_a_miss() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "images/ph1s1.jpg", b"<!DOCTYPE html><html>gone</html>");
    let origin = serve(tmp.path()).await;

    assert!(!origin.exists("images/ph1s1.jpg", Duration::from_secs(2)).await);
}

#[tokio::test]
async fn stalled_request_resolves_false_at_timeout() {
    let tmp = TempDir::new().unwrap();
    let origin = serve(tmp.path()).await;

    let started = std::time::Instant::now();
    let hit = origin
        .exists("images/stalled.jpg", Duration::from_millis(200))
        .await;
    let elapsed = started.elapsed();

    assert!(!hit);
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(1), "took {elapsed:?}");
}

#[tokio::test]
async fn stalled_cover_check_gives_up_at_foreground_timeout() {
    let tmp = TempDir::new().unwrap();
    let origin = serve(tmp.path()).await;
    let timeout = CarouselConfig::default().probe.foreground_timeout();
    assert_eq!(timeout, Duration::from_millis(1500));

    let started = std::time::Instant::now();
    let hit = origin.exists("images/stalled.jpg", timeout).await;
    let elapsed = started.elapsed();

    assert!(!hit);
    assert!(elapsed >= timeout);
    assert!(elapsed < Duration::from_millis(2000), "took {elapsed:?}");
}

#[tokio::test]
async fn manifest_fetch_reports_status() {
    let tmp = TempDir::new().unwrap();
    let origin = serve(tmp.path()).await;

    let err = origin.fetch_manifest("images/manifest.json").await.unwrap_err();
    assert_eq!(err.to_string(), "unexpected status 404");
}

// ---------------------------------------------------------------------------
// Build, serve, load
// ---------------------------------------------------------------------------

#[tokio::test]
async fn built_manifest_loads_and_repairs() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "images/photo1.JPG", JPEG);
    write(tmp.path(), "images/photo2.JPG", JPEG);
    write(tmp.path(), "images/photo3.jpg", JPEG);
    write(tmp.path(), "images/album1/ph1s1.jpg", JPEG);
    write(tmp.path(), "images/album1/ph1s2.jpg", JPEG);
    let built = scan::build(&tmp.path().join("images")).unwrap();
    assert_eq!(built.manifest.album_order, vec![1, 2, 3]);

    let origin = serve(tmp.path()).await;
    let loaded = load::load(&origin, &CarouselConfig::default()).await;

    assert_eq!(
        loaded.source,
        CatalogSource::Primary("images/manifest.json".to_string())
    );
    assert_eq!(loaded.catalog.ids(), vec![1, 2, 3]);

    let one = loaded.catalog.get(1).unwrap();
    assert_eq!(one.cover, "images/photo1.JPG");
    assert_eq!(
        one.images,
        vec!["images/album1/ph1s1.jpg", "images/album1/ph1s2.jpg"]
    );

    let states: Vec<AlbumState> = loaded.repairs.iter().map(|o| o.state).collect();
    assert_eq!(
        states,
        vec![AlbumState::Complete, AlbumState::Empty, AlbumState::Empty]
    );
    assert_eq!(
        loaded.repairs[1].history,
        vec![
            AlbumState::Declared,
            AlbumState::Verified,
            AlbumState::DiscoveryRun,
            AlbumState::Empty,
        ]
    );
    let two = loaded.catalog.get(2).unwrap();
    assert_eq!(two.cover, "images/photo2.JPG");
    assert!(two.images.is_empty());
    assert_eq!(loaded.catalog.get(3).unwrap().cover, "images/photo3.jpg");
}

#[tokio::test]
async fn discovery_recovers_unlisted_photos() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "images/manifest.json",
        br#"{"albumOrder": [5], "albums": {"5": {"cover": "images/album5/photo5.JPG"}}}"#,
    );
    write(tmp.path(), "images/album5/photo5.JPG", JPEG);
    write(tmp.path(), "images/album5/ph5s1.JPG", JPEG);
    write(tmp.path(), "images/album5/ph5s2.png", PNG);
    write(tmp.path(), "images/album5/ph5s4.jpg", JPEG);
    let origin = serve(tmp.path()).await;

    let loaded = load::load(&origin, &CarouselConfig::default()).await;

    assert_eq!(
        loaded.catalog.get(5).unwrap().images,
        vec![
            "images/album5/ph5s1.JPG",
            "images/album5/ph5s2.png",
            "images/album5/ph5s4.jpg",
        ]
    );
    assert_eq!(
        loaded.repairs[0].history,
        vec![
            AlbumState::Declared,
            AlbumState::Verified,
            AlbumState::DiscoveryRun,
            AlbumState::Complete,
        ]
    );
}

#[tokio::test]
async fn missing_cover_replaced_by_served_photo() {
    let tmp = TempDir::new().unwrap();
    write(
        tmp.path(),
        "images/manifest.json",
        br#"{"albums": {"7": {"cover": "images/a7/deleted.jpg", "images": ["images/a7/ph7s1.jpg"]}}}"#,
    );
    write(tmp.path(), "images/a7/ph7s1.jpg", JPEG);
    let origin = serve(tmp.path()).await;

    let loaded = load::load(&origin, &CarouselConfig::default()).await;

    let seven = loaded.catalog.get(7).unwrap();
    assert_eq!(seven.cover, "images/a7/ph7s1.jpg");
    assert_eq!(
        loaded.repairs[0].replaced_cover.as_deref(),
        Some("images/a7/deleted.jpg")
    );
}

#[tokio::test]
async fn example_manifest_used_when_primary_broken() {
    let tmp = TempDir::new().unwrap();
    write(tmp.path(), "images/manifest.json", b"{ not json");
    write(
        tmp.path(),
        "images/manifest.example.json",
        br#"{"albumOrder": [2], "albums": {"2": {"title": "Harbour"}}}"#,
    );
    let origin = serve(tmp.path()).await;

    let mut config = CarouselConfig::default();
    config.loader.repair = false;
    let loaded = load::load(&origin, &config).await;

    assert_eq!(
        loaded.source,
        CatalogSource::Fallback("images/manifest.example.json".to_string())
    );
    assert_eq!(loaded.catalog.get(2).unwrap().title, "Harbour");
}

#[tokio::test]
async fn empty_site_shows_builtin_album() {
    let tmp = TempDir::new().unwrap();
    let origin = serve(tmp.path()).await;

    let mut config = CarouselConfig::default();
    config.loader.repair = false;
    let loaded = load::load(&origin, &config).await;

    assert_eq!(loaded.source, CatalogSource::Builtin);
    assert_eq!(loaded.catalog.ids(), vec![1]);
}
