//! Intersection properties and whole-run scenarios.

mod common;

use std::fs;
use std::time::Duration;

use mutuals_core::{
    fetch_followers, find_common_followers, intersect, parse_profiles, FetchFailure,
    IntersectOptions, ProfileStatus, ResultWriter,
};

use common::*;

fn sequential() -> IntersectOptions {
    IntersectOptions::default()
}

fn concurrent(n: usize) -> IntersectOptions {
    IntersectOptions {
        concurrency: n,
        fail_fast: false,
    }
}

fn abc_source() -> FakeSource {
    FakeSource::new()
        .with("a", &["1", "2", "3", "4", "5"])
        .with("b", &["2", "3", "4", "5", "6"])
        .with("c", &["0", "3", "4", "5", "9"])
}

// ============================================================================
// Properties
// ============================================================================

#[tokio::test]
async fn test_order_does_not_change_result() {
    let source = abc_source();

    let forward = intersect(&source, &names(&["a", "b", "c"]), &sequential()).await;
    let backward = intersect(&source, &names(&["c", "b", "a"]), &sequential()).await;

    assert_eq!(forward.followers, backward.followers);
    assert_eq!(display_names(&forward.followers), vec!["3", "4", "5"]);
}

#[tokio::test]
async fn test_single_profile_equals_its_followers() {
    let source = abc_source();

    let common = intersect(&source, &names(&["b"]), &sequential()).await;
    let direct = fetch_followers(&source, "b").await.into_set();

    assert_eq!(common.followers, direct);
}

#[tokio::test]
async fn test_any_failed_fetch_empties_result() {
    let source = abc_source().failing("broken", FetchFailure::Network("connection reset".into()));

    let common = intersect(&source, &names(&["a", "broken", "b"]), &sequential()).await;

    assert!(common.followers.is_empty());
    assert_eq!(
        common.reports[1].status,
        ProfileStatus::Failed(FetchFailure::Network("connection reset".into()))
    );
    // No short-circuit: the profile after the failure is still fetched
    assert_eq!(source.calls(), names(&["a", "broken", "b"]));
}

#[tokio::test]
async fn test_zero_followers_empties_result_without_failure() {
    let source = abc_source().with("quiet", &[]);

    let common = intersect(&source, &names(&["a", "quiet"]), &sequential()).await;

    assert!(common.followers.is_empty());
    assert_eq!(common.failed().count(), 0);
    assert_eq!(common.reports[1].status, ProfileStatus::Fetched { followers: 0 });
}

#[tokio::test]
async fn test_empty_input_fetches_nothing() {
    let source = abc_source();

    let common = intersect(&source, &[], &sequential()).await;

    assert!(common.followers.is_empty());
    assert!(common.reports.is_empty());
    assert!(source.calls().is_empty());
}

#[tokio::test]
async fn test_concurrent_fetch_matches_sequential() {
    // Early profiles finish last so completion order differs from input order
    let source = abc_source()
        .delayed("a", Duration::from_millis(30))
        .delayed("b", Duration::from_millis(15));
    let profiles = names(&["a", "b", "c"]);

    let sequential_result = intersect(&source, &profiles, &sequential()).await;
    let concurrent_result = intersect(&source, &profiles, &concurrent(3)).await;

    assert_eq!(sequential_result.followers, concurrent_result.followers);
    let order: Vec<&str> = concurrent_result.reports.iter().map(|r| r.profile.as_str()).collect();
    assert_eq!(order, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_fail_fast_skips_remaining_profiles() {
    let source = abc_source().failing("ghost", FetchFailure::NotFound);
    let options = IntersectOptions {
        concurrency: 1,
        fail_fast: true,
    };

    let common = intersect(&source, &names(&["ghost", "a", "b"]), &options).await;

    assert!(common.followers.is_empty());
    assert_eq!(source.calls(), names(&["ghost"]));
    assert_eq!(common.reports[1].status, ProfileStatus::Skipped);
    assert_eq!(common.reports[2].status, ProfileStatus::Skipped);
}

// ============================================================================
// Whole-run scenarios
// ============================================================================

#[tokio::test]
async fn test_two_profiles_written_to_file() {
    let source = FakeSource::new()
        .with("alice", &["x", "y", "z"])
        .with("bob", &["y", "z", "w"]);
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = ResultWriter::new(dir.path().join("results"));

    let summary = find_common_followers(&source, &names(&["alice", "bob"]), &sequential(), &writer).await;
    summary.log();

    let path = summary.output.expect("output written");
    assert_eq!(path, dir.path().join("results/common_followers_alice_bob.txt"));
    let contents = fs::read_to_string(path).expect("read");
    assert_eq!(contents, "y\nz\n");
}

#[tokio::test]
async fn test_failed_fetch_writes_empty_file() {
    let source = FakeSource::new().failing("alice", FetchFailure::Network("simulated".into()));
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = ResultWriter::new(dir.path());

    let summary = find_common_followers(&source, &names(&["alice"]), &sequential(), &writer).await;

    let path = summary.output.expect("output written");
    assert_eq!(fs::read_to_string(path).expect("read").lines().count(), 0);
    assert_eq!(summary.common.failed().count(), 1);
}

#[tokio::test]
async fn test_blank_prompt_does_nothing() {
    let source = FakeSource::new().with("alice", &["x"]);
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = ResultWriter::new(dir.path().join("results"));

    let logs = LogCapture::default();
    let _guard = logs.install();

    let profiles = parse_profiles("   ");
    let summary = find_common_followers(&source, &profiles, &sequential(), &writer).await;

    assert!(logs.contents().contains("No usernames provided"));
    assert!(summary.common.followers.is_empty());
    assert!(summary.output.is_none());
    assert!(source.calls().is_empty());
    assert!(!dir.path().join("results").exists());
}

#[tokio::test]
async fn test_write_failure_does_not_abort() {
    let source = FakeSource::new().with("alice", &["x"]);
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("results");
    fs::write(&blocker, "file in the way").expect("write blocker");

    let summary =
        find_common_followers(&source, &names(&["alice"]), &sequential(), &ResultWriter::new(&blocker)).await;

    assert!(summary.output.is_none());
    assert_eq!(display_names(&summary.common.followers), vec!["x"]);
}

#[tokio::test]
async fn test_end_to_end_against_mock_instagram() {
    let server = wiremock::MockServer::start().await;
    mount_profile(&server, "alice", "1", false).await;
    mount_profile(&server, "bob", "2", false).await;
    mount_follower_pages(&server, "1", &[&["x", "y"], &["z"]]).await;
    mount_follower_pages(&server, "2", &[&["y"], &["z", "w"]]).await;

    let dir = tempfile::tempdir().expect("tempdir");
    let writer = ResultWriter::new(dir.path());
    let client = authed_client_for(&server);

    let summary = find_common_followers(&client, &names(&["alice", "bob"]), &concurrent(2), &writer).await;

    assert_eq!(summary.common.fetched_count(), 2);
    let contents = fs::read_to_string(summary.output.expect("output")).expect("read");
    assert_eq!(contents, "y\nz\n");
}
