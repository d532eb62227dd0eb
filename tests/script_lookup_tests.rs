//! ScriptLookup integration tests
//!
//! Runs real helper stubs out of a temp directory: parsing, arg passing,
//! failure reporting, and the deadline kill path.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use studymap_ra::lookup::{LookupError, ScriptLookup, SourceLookup};
use studymap_ra::models::Source;
use studymap_ra::services::SourceFetcher;

fn write_helper(dir: &Path, source: Source, body: &str) -> PathBuf {
    let path = dir.join(format!("fetch_{}", source));
    std::fs::write(&path, body).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

#[tokio::test]
async fn helper_output_is_parsed_and_query_is_passed() {
    let dir = TempDir::new().unwrap();
    write_helper(
        dir.path(),
        Source::Wikipedia,
        r#"#!/bin/sh
printf '[{"title":"Result for %s","url":"https://example.com/one"},{"title":"Two","url":"https://example.com/two","snippet":"second"}]' "$1"
"#,
    );

    let lookup = ScriptLookup::new(dir.path());
    let items = lookup.lookup(Source::Wikipedia, "rust traits").await.unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Result for rust traits");
    assert_eq!(items[0].source, Source::Wikipedia);
    assert_eq!(items[1].snippet, "second");
}

#[tokio::test]
async fn empty_result_array_is_ok() {
    let dir = TempDir::new().unwrap();
    write_helper(
        dir.path(),
        Source::Reddit,
        "#!/bin/sh\nprintf '[]'\n",
    );

    let lookup = ScriptLookup::new(dir.path());
    let items = lookup.lookup(Source::Reddit, "rust").await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn missing_helper_is_reported() {
    let dir = TempDir::new().unwrap();
    let lookup = ScriptLookup::new(dir.path());

    let err = lookup.lookup(Source::Medium, "rust").await.unwrap_err();
    assert!(matches!(err, LookupError::HelperNotFound(_)), "got {:?}", err);

    let status = lookup.helper_status();
    assert!(status.iter().all(|(_, present)| !present));
}

#[tokio::test]
async fn nonzero_exit_reports_stderr() {
    let dir = TempDir::new().unwrap();
    write_helper(
        dir.path(),
        Source::Youtube,
        "#!/bin/sh\necho 'quota exceeded' >&2\nexit 2\n",
    );

    let lookup = ScriptLookup::new(dir.path());
    let err = lookup.lookup(Source::Youtube, "rust").await.unwrap_err();

    match err {
        LookupError::HelperFailed(msg) => {
            assert!(msg.contains('2'), "missing exit code: {}", msg);
            assert!(msg.contains("quota exceeded"), "missing stderr: {}", msg);
        }
        other => panic!("expected HelperFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn garbage_output_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    write_helper(
        dir.path(),
        Source::Wikipedia,
        "#!/bin/sh\necho 'Traceback (most recent call last):'\n",
    );

    let lookup = ScriptLookup::new(dir.path());
    let err = lookup.lookup(Source::Wikipedia, "rust").await.unwrap_err();
    assert!(matches!(err, LookupError::ParseError(_)), "got {:?}", err);
}

#[tokio::test]
async fn slow_helper_is_killed_at_the_deadline() {
    let dir = TempDir::new().unwrap();
    write_helper(dir.path(), Source::Wikipedia, "#!/bin/sh\nsleep 60\n");

    let lookup: Arc<dyn SourceLookup> = Arc::new(ScriptLookup::new(dir.path()));
    let fetcher = SourceFetcher::with_timeout(lookup, Duration::from_millis(200));

    let start = Instant::now();
    let items = fetcher.fetch(Source::Wikipedia, "rust lifetimes").await;
    let elapsed = start.elapsed();

    assert!(
        elapsed < Duration::from_secs(5),
        "deadline did not cut the helper off: {:?}",
        elapsed
    );
    assert_eq!(items.len(), 1);
    assert!(items[0].is_fallback(), "timeout should yield a fallback link");
    assert!(items[0].url.contains("rust%20lifetimes"));
}

#[tokio::test]
async fn sentinel_only_output_falls_back() {
    let dir = TempDir::new().unwrap();
    write_helper(
        dir.path(),
        Source::Medium,
        r#"#!/bin/sh
printf '[{"title":"Sorry peeps nothing to see here","url":"","source":"medium"}]'
"#,
    );

    let lookup: Arc<dyn SourceLookup> = Arc::new(ScriptLookup::new(dir.path()));
    let fetcher = SourceFetcher::with_timeout(lookup, Duration::from_secs(2));

    let items = fetcher.fetch(Source::Medium, "rust async").await;
    assert_eq!(items.len(), 1);
    assert!(items[0].is_fallback());
    assert!(items[0].url.starts_with("https://medium.com/search"));
}
