//! Router level tests for the `/api` endpoints.

use std::{fs, path::Path, sync::Arc};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use reelshelf_core::{
    DurationProbe, FileIdentity, FlushPolicy, MediaLibrary, MetadataStore,
    ProbeError,
};
use reelshelf_server::{AppState, create_app};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

#[derive(Debug)]
struct StubProbe;

#[async_trait]
impl DurationProbe for StubProbe {
    async fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
        if path.to_string_lossy().ends_with("fake.mp4") {
            return Err(ProbeError::Parse("no streams".into()));
        }
        Ok(61.2)
    }
}

struct TestApp {
    _dirs: (TempDir, TempDir),
    library: Arc<MediaLibrary>,
    router: Router,
}

fn setup() -> TestApp {
    let media = tempfile::tempdir().expect("media dir");
    let metadata = tempfile::tempdir().expect("metadata dir");
    let root = media.path();
    fs::write(root.join("Pilot.mkv"), vec![1u8; 40]).expect("write");
    fs::write(root.join("fake.mp4"), vec![1u8; 4]).expect("write");
    fs::write(root.join("notes.txt"), b"hello").expect("write");
    fs::create_dir_all(root.join("Season 2")).expect("mkdir");
    fs::write(root.join("Season 2/Finale.mp4"), vec![1u8; 8]).expect("write");

    let store = Arc::new(
        MetadataStore::open(
            metadata.path().join("fileinfos.txt"),
            FlushPolicy::default(),
        )
        .expect("store"),
    );
    let library = Arc::new(MediaLibrary::new(root, store, Arc::new(StubProbe), 2));
    let router = create_app(AppState::new(library.clone()));

    TestApp {
        _dirs: (media, metadata),
        library,
        router,
    }
}

async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn dir_contents_lists_media_and_folders() {
    let app = setup();
    let (status, body) = send(&app.router, "GET", "/api/dir-contents?path=").await;

    assert_eq!(status, StatusCode::OK);
    let media: Vec<&str> = body["mediaInfos"]
        .as_array()
        .expect("mediaInfos")
        .iter()
        .map(|m| m["fileName"].as_str().expect("name"))
        .collect();
    assert_eq!(media, ["Pilot.mkv", "fake.mp4"]);

    let folder = &body["folderInfos"][0];
    assert_eq!(folder["folderName"], "Season 2");
    assert_eq!(folder["mediaFileCount"], 1);
    assert_eq!(folder["mediaDiskSize"], 8);
}

#[tokio::test]
async fn dir_contents_applies_front_end_filter_flags() {
    let app = setup();
    let (status, body) = send(
        &app.router,
        "GET",
        "/api/dir-contents?path=&filter=finale&considerFolderContents=true",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["mediaInfos"].as_array().expect("media").is_empty());
    assert_eq!(body["folderInfos"][0]["folderName"], "Season 2");

    let (_, body) = send(
        &app.router,
        "GET",
        "/api/dir-contents?filter=pilat&typoTolerance=true",
    )
    .await;
    assert_eq!(body["mediaInfos"][0]["fileName"], "Pilot.mkv");
}

#[tokio::test]
async fn dir_contents_errors_map_to_status_codes() {
    let app = setup();

    let (status, body) = send(&app.router, "GET", "/api/dir-contents?path=Nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["status"], 404);

    let (status, _) = send(&app.router, "GET", "/api/dir-contents?path=..").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app.router,
        "GET",
        "/api/dir-contents?filter=%5B&regex=true",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn durations_omit_unprobeable_files() {
    let app = setup();
    let (status, body) =
        send(&app.router, "GET", "/api/dir-contents/durations?path=").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["path"], "");
    let durations = body["mediaDurations"].as_array().expect("durations");
    assert_eq!(durations.len(), 1);
    assert_eq!(durations[0]["fileName"], "Pilot.mkv");
    assert_eq!(durations[0]["duration"], 61);
}

#[tokio::test]
async fn media_info_reports_probed_duration() {
    let app = setup();
    let (status, body) = send(
        &app.router,
        "GET",
        "/api/media-info?path=Season%202%2FFinale.mp4",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fileName"], "Finale.mp4");
    assert_eq!(body["fileSize"], 8);
    assert_eq!(body["duration"], 61);

    let (status, _) = send(&app.router, "GET", "/api/media-info?path=notes.txt").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app.router, "GET", "/api/media-info?path=gone.mkv").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_progress_records_and_validates() {
    let app = setup();
    let (status, _) = send(
        &app.router,
        "POST",
        "/api/update-progress?path=Pilot.mkv&progress=0.25",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let record = app
        .library
        .store()
        .get_record(&FileIdentity::compute("Pilot.mkv", 40))
        .expect("record");
    assert_eq!(record.progress, Some(0.25));

    let (_, body) = send(&app.router, "GET", "/api/dir-contents").await;
    assert_eq!(body["mediaInfos"][0]["progress"], 0.25);

    for uri in [
        "/api/update-progress?path=Pilot.mkv&progress=NaN",
        "/api/update-progress?path=Pilot.mkv&progress=1.5",
        "/api/update-progress?path=notes.txt&progress=0.5",
    ] {
        let (status, _) = send(&app.router, "POST", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/update-progress?path=missing.mkv&progress=0.5",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
