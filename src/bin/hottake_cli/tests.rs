#![deny(clippy::all, clippy::pedantic)]

use httpmock::MockServer;
use serde_json::json;
use tempfile::TempDir;
use time::macros::datetime;
use uuid::Uuid;

use hottake_api_types::{Post, SortMode};

use crate::client::{ApiClient, CliError};
use crate::controller::FeedController;
use crate::session::Session;

fn ctx(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.base_url()).expect("client")
}

fn session_in(dir: &TempDir) -> Session {
    Session::load_or_create(Some(dir.path().join("session.json"))).expect("session")
}

fn take(n: u32) -> Post {
    Post {
        id: Uuid::new_v4(),
        title: format!("take {n}"),
        agree: Vec::new(),
        disagree: Vec::new(),
        votes: 0,
        interactions: 0,
        reports: json!([]),
        date: datetime!(2023-01-02 00:00:00 UTC) + time::Duration::minutes(i64::from(n)),
    }
}

fn page(from: u32, count: u32) -> Vec<Post> {
    (from..from + count).map(take).collect()
}

fn body(posts: &[Post]) -> serde_json::Value {
    serde_json::to_value(posts).expect("posts to json")
}

fn json_post(post: &Post) -> serde_json::Value {
    serde_json::to_value(post).expect("post to json")
}

#[tokio::test]
async fn list_posts_sends_offset_and_sort() -> Result<(), CliError> {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/posts")
            .query_param("offset", "0")
            .query_param("sort", "new");
        then.status(200).json_body(body(&page(0, 2)));
    });

    let posts = ctx(&server).list_posts(SortMode::New, 0, None).await?;
    mock.assert();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "take 0");
    Ok(())
}

#[tokio::test]
async fn create_post_round_trips_the_created_take() -> Result<(), CliError> {
    let server = MockServer::start();
    let created = take(7);
    let mock = server.mock(|when, then| {
        when.method("POST")
            .path("/post")
            .json_body(json!({"title": "tabs beat spaces"}));
        then.status(200).json_body(json_post(&created));
    });

    let post = ctx(&server).create_post("tabs beat spaces").await?;
    mock.assert();
    assert_eq!(post.title, created.title);
    assert_eq!(post.votes, 0);
    assert_eq!(post.interactions, 0);
    assert!(post.agree.is_empty());
    Ok(())
}

#[tokio::test]
async fn show_passes_the_post_id() -> Result<(), CliError> {
    let server = MockServer::start();
    let wanted = take(3);
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/post")
            .query_param("postID", &wanted.id.to_string());
        then.status(200).json_body(json_post(&wanted));
    });

    let post = ctx(&server).get_post(&wanted.id.to_string()).await?;
    mock.assert();
    assert_eq!(post.id, wanted.id);
    Ok(())
}

#[tokio::test]
async fn error_body_message_is_surfaced() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/post");
        then.status(400)
            .json_body(json!({"message": "Post must be longer than 5 characters"}));
    });

    let err = ctx(&server)
        .create_post("short")
        .await
        .expect_err("validation failure");
    match err {
        CliError::Server(message) => {
            assert!(message.contains("Post must be longer than 5 characters"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn first_run_creates_identity_and_default_sort() {
    let dir = TempDir::new().expect("tempdir");
    let session = session_in(&dir);

    assert_eq!(session.sort(), SortMode::New);
    assert!(dir.path().join("session.json").exists());

    // The identity is created once and reused indefinitely.
    let reloaded = session_in(&dir);
    assert_eq!(reloaded.uuid(), session.uuid());
}

#[test]
fn sort_preference_round_trips_through_the_state_file() {
    let dir = TempDir::new().expect("tempdir");
    let mut session = session_in(&dir);
    session.set_sort(SortMode::Popular).expect("persist sort");

    let reloaded = session_in(&dir);
    assert_eq!(reloaded.sort(), SortMode::Popular);
    assert_eq!(reloaded.uuid(), session.uuid());
}

#[test]
fn corrupt_state_file_starts_a_fresh_session() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("session.json");
    std::fs::write(&path, "not json").expect("write garbage");

    let session = Session::load_or_create(Some(path)).expect("fresh session");
    assert_eq!(session.sort(), SortMode::New);
}

#[tokio::test]
async fn mount_keeps_the_initial_page_under_the_default_sort() -> Result<(), CliError> {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");

    let mut controller = FeedController::new(ctx(&server), session_in(&dir));
    controller.mount(page(0, 3)).await?;

    // No fetch was issued; the server saw nothing.
    assert_eq!(controller.posts().len(), 3);
    assert!(controller.has_more());
    assert_eq!(controller.sort(), SortMode::New);
    Ok(())
}

#[tokio::test]
async fn mount_with_empty_initial_page_reports_no_more_posts() -> Result<(), CliError> {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");

    let mut controller = FeedController::new(ctx(&server), session_in(&dir));
    controller.mount(Vec::new()).await?;

    assert!(controller.posts().is_empty());
    assert!(!controller.has_more());
    Ok(())
}

#[tokio::test]
async fn mount_refetches_when_a_non_default_sort_was_persisted() -> Result<(), CliError> {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");
    {
        let mut session = session_in(&dir);
        session.set_sort(SortMode::Popular).expect("persist sort");
    }

    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/posts")
            .query_param("sort", "popular")
            .query_param("offset", "0");
        then.status(200).json_body(body(&page(10, 2)));
    });

    let mut controller = FeedController::new(ctx(&server), session_in(&dir));
    controller.mount(page(0, 5)).await?;

    mock.assert();
    assert_eq!(controller.posts().len(), 2);
    assert_eq!(controller.posts()[0].title, "take 10");
    assert!(controller.has_more());
    Ok(())
}

#[tokio::test]
async fn twelve_posts_paginate_in_two_fetches_then_stop() -> Result<(), CliError> {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");

    server.mock(|when, then| {
        when.method("GET")
            .path("/posts")
            .query_param("offset", "10")
            .query_param("sort", "new");
        then.status(200).json_body(body(&page(10, 2)));
    });
    let past_end = server.mock(|when, then| {
        when.method("GET")
            .path("/posts")
            .query_param("offset", "12")
            .query_param("sort", "new");
        then.status(200).json_body(body(&[]));
    });

    let mut controller = FeedController::new(ctx(&server), session_in(&dir));
    controller.mount(page(0, 10)).await?;
    assert!(controller.has_more());

    assert!(controller.load_more().await?);
    assert_eq!(controller.posts().len(), 12);
    assert!(controller.has_more());

    assert!(!controller.load_more().await?);
    assert_eq!(controller.posts().len(), 12);
    assert!(!controller.has_more());

    // No further fetch is issued once the feed is exhausted.
    assert!(!controller.load_more().await?);
    past_end.assert_hits(1);
    Ok(())
}

#[tokio::test]
async fn cycling_sort_replaces_the_list_and_persists_the_mode() -> Result<(), CliError> {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");

    // New cycles to Random, which pins its shuffle with a seed.
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/posts")
            .query_param("sort", "random")
            .query_param("offset", "0")
            .query_param_exists("seed");
        then.status(200).json_body(body(&page(20, 3)));
    });

    let mut controller = FeedController::new(ctx(&server), session_in(&dir));
    controller.mount(page(0, 10)).await?;

    let mode = controller.cycle_sort().await?;
    mock.assert();
    assert_eq!(mode, SortMode::Random);
    assert_eq!(controller.posts().len(), 3);
    assert_eq!(controller.posts()[0].title, "take 20");

    let reloaded = session_in(&dir);
    assert_eq!(reloaded.sort(), SortMode::Random);
    Ok(())
}

#[tokio::test]
async fn a_stale_page_from_the_previous_sort_is_discarded() -> Result<(), CliError> {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");

    server.mock(|when, then| {
        when.method("GET").path("/posts").query_param("sort", "random");
        then.status(200).json_body(body(&page(20, 1)));
    });

    let mut controller = FeedController::new(ctx(&server), session_in(&dir));
    controller.mount(page(0, 2)).await?;

    // A load-more goes out under "new", and the sort changes before the
    // response lands.
    let stale = controller.tag(SortMode::New);
    controller.cycle_sort().await?;

    assert!(!controller.apply_append(stale, page(90, 5)));
    assert_eq!(controller.posts().len(), 1);
    assert_eq!(controller.posts()[0].title, "take 20");
    Ok(())
}

#[tokio::test]
async fn fetch_failure_leaves_the_feed_untouched() -> Result<(), CliError> {
    let server = MockServer::start();
    let dir = TempDir::new().expect("tempdir");

    server.mock(|when, then| {
        when.method("GET").path("/posts");
        then.status(503).json_body(json!({"message": "Service temporarily unavailable"}));
    });

    let mut controller = FeedController::new(ctx(&server), session_in(&dir));
    controller.mount(page(0, 4)).await?;

    let err = controller.load_more().await.expect_err("fetch failure");
    assert!(matches!(err, CliError::Server(_)));
    assert_eq!(controller.posts().len(), 4);
    assert!(controller.has_more());
    Ok(())
}
