//! Integration tests for the station library

use pmoconfig::Config;
use pmoradiogarden::{
    AddOutcome, Error, RadioGardenClient, SqliteStationStore, StationLibrary, StationResolver,
};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn library_for(
    server: &MockServer,
) -> (TempDir, StationLibrary<SqliteStationStore, Config>) {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_config(&dir.path().to_string_lossy()).unwrap();
    let store = SqliteStationStore::open(&dir.path().join("stations.db")).unwrap();
    let client = RadioGardenClient::builder()
        .base_url(server.uri())
        .build()
        .await
        .unwrap();

    let library = StationLibrary::new(
        StationResolver::new(client),
        Arc::new(store),
        Arc::new(config),
    );
    (dir, library)
}

async fn mount_channel(server: &MockServer, id: &str, title: &str, stream: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/ara/content/channel/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "title": title,
                "website": "",
                "place": { "title": "Pali" },
                "country": { "title": "India" }
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/api/ara/content/listen/{}/channel.mp3", id)))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", stream))
        .mount(server)
        .await;
}

async fn mount_place(server: &MockServer, place_id: &str, channel_ids: &[&str]) {
    let items: Vec<_> = channel_ids
        .iter()
        .map(|id| json!({ "title": id, "page": { "url": format!("/listen/s/{}", id) } }))
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/api/ara/content/page/{}/channels", place_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "content": [ { "itemsType": "channel", "items": items } ] }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_add_channel_link_saves_station() {
    let mock_server = MockServer::start().await;
    mount_channel(&mock_server, "J5OrSNeF", "Marwar Radio", "https://stream.example/marwar").await;
    let (_dir, library) = library_for(&mock_server).await;

    let outcome = library
        .add_from_url("https://radio.garden/listen/marwar-radio/J5OrSNeF")
        .await
        .unwrap();
    let AddOutcome::Added(record) = outcome else {
        panic!("expected a saved station, got {:?}", outcome);
    };

    assert!(record.id > 0);
    assert_eq!(record.name, "Marwar Radio");
    assert_eq!(record.stream_url, "https://stream.example/marwar");

    let saved = library.find("J5OrSNeF").await.unwrap().unwrap();
    assert_eq!(saved, record);
}

#[tokio::test]
async fn test_re_adding_refreshes_stream_url() {
    let mock_server = MockServer::start().await;
    let (_dir, library) = library_for(&mock_server).await;

    mount_channel(&mock_server, "abc123", "Radio X", "https://old.example/live").await;
    library
        .add_from_url("https://radio.garden/listen/radio-x/abc123")
        .await
        .unwrap();

    mock_server.reset().await;
    mount_channel(&mock_server, "abc123", "Radio X", "https://new.example/live").await;
    library
        .add_from_url("https://radio.garden/listen/radio-x/abc123")
        .await
        .unwrap();

    let stations = library.stations().await.unwrap();
    assert_eq!(stations.len(), 1);
    assert_eq!(stations[0].stream_url, "https://new.example/live");
}

#[tokio::test]
async fn test_add_place_with_choice() {
    let mock_server = MockServer::start().await;
    mount_place(&mock_server, "P1", &["a1", "b2"]).await;
    mount_channel(&mock_server, "b2", "Second", "https://stream.example/b2").await;
    let (_dir, library) = library_for(&mock_server).await;

    let outcome = library
        .add_from_url("https://radio.garden/visit/pali/P1")
        .await
        .unwrap();
    let AddOutcome::ChooseChannel { items, place_id } = outcome else {
        panic!("expected a choice, got {:?}", outcome);
    };
    assert_eq!(place_id, "P1");
    assert!(library.stations().await.unwrap().is_empty());

    let record = library.add_from_place_item(&items[1]).await.unwrap();
    assert_eq!(record.channel_id, "b2");
    assert_eq!(record.name, "Second");
    assert_eq!(library.stations().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_add_single_channel_place() {
    let mock_server = MockServer::start().await;
    mount_place(&mock_server, "P1", &["only1"]).await;
    mount_channel(&mock_server, "only1", "Only", "https://stream.example/only").await;
    let (_dir, library) = library_for(&mock_server).await;

    let outcome = library
        .add_from_url("https://radio.garden/visit/pali/P1")
        .await
        .unwrap();

    assert!(matches!(outcome, AddOutcome::Added(ref r) if r.channel_id == "only1"));
}

#[tokio::test]
async fn test_failed_resolution_saves_nothing() {
    let mock_server = MockServer::start().await;
    mount_place(&mock_server, "P1", &[]).await;
    let (_dir, library) = library_for(&mock_server).await;

    let err = library
        .add_from_url("https://radio.garden/visit/pali/P1")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EmptyPlace(_)));
    assert!(library.stations().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_seed_then_reopen_does_not_reseed() {
    let mock_server = MockServer::start().await;
    let (dir, library) = library_for(&mock_server).await;

    assert_eq!(library.seed_defaults().await.unwrap(), 2);
    let seeded = library.find("mbAtEPnJ").await.unwrap().unwrap();
    library.remove(&seeded).await.unwrap();
    drop(library);

    // Same config directory and database, fresh process
    let config = Config::load_config(&dir.path().to_string_lossy()).unwrap();
    let store = SqliteStationStore::open(&dir.path().join("stations.db")).unwrap();
    let client = RadioGardenClient::builder()
        .base_url(mock_server.uri())
        .build()
        .await
        .unwrap();
    let library = StationLibrary::new(
        StationResolver::new(client),
        Arc::new(store),
        Arc::new(config),
    );

    assert_eq!(library.seed_defaults().await.unwrap(), 0);
    let stations = library.stations().await.unwrap();
    assert_eq!(stations.len(), 1);
    assert_eq!(stations[0].channel_id, "J5OrSNeF");
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}
