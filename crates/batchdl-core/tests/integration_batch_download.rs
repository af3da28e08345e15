//! Integration tests: whole batches against a local HTTP server.
//!
//! Covers the success/404 mix, whole-batch validation failures, input-order
//! reporting, rollback of failed items, and distinct run directories.

mod common;

use batchdl_core::{BatchError, DownloadRequest, Orchestrator, Outcome, RunConfig, RunReport};
use chrono::{DateTime, Local, TimeZone};
use common::http_server::{self, Route};
use std::path::Path;
use std::time::Duration;
use tempfile::tempdir;

fn first_run() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).single().unwrap()
}

fn second_run() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 5, 1, 10, 0, 1).single().unwrap()
}

fn orchestrator() -> Orchestrator {
    Orchestrator::new(RunConfig::default()).with_clock(first_run)
}

fn failure_kind(report: &RunReport, index: usize) -> &str {
    match &report.entries()[index].outcome {
        Outcome::Failed { kind, .. } => kind,
        Outcome::Succeeded => panic!("entry {index} unexpectedly succeeded"),
    }
}

fn entries_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn success_and_not_found_are_isolated() {
    let a = http_server::start(vec![("/f1", Route::ok("hello"))]);
    let b = http_server::start(vec![("/f2", Route::status(404))]);
    let base = tempdir().unwrap();
    let urls = format!("{},{}", a.url("/f1"), b.url("/f2"));

    let report = orchestrator()
        .run(&DownloadRequest::new(base.path(), urls))
        .expect("batch is valid");

    assert_eq!(report.len(), 2);
    assert_eq!(report.entries()[0].source, a.url("/f1"));
    assert_eq!(report.entries()[0].outcome, Outcome::Succeeded);
    assert_eq!(failure_kind(&report, 1), "download_failed");

    let run_dir = base.path().join("2024-05-01-10-00-00");
    assert_eq!(report.run_dir(), run_dir);
    let f1 = run_dir.join(&a.host).join("f1");
    assert_eq!(report.entries()[0].destination, f1);
    assert_eq!(std::fs::read(&f1).unwrap(), b"hello");

    assert!(!run_dir.join(&b.host).join("f2").exists());
    assert_eq!(entries_in(&run_dir), vec![a.host.clone()]);
    assert_eq!(entries_in(&run_dir.join(&a.host)), vec!["f1".to_string()]);
}

#[test]
fn malformed_url_aborts_before_any_request() {
    let server = http_server::start(vec![("/f", Route::ok("data"))]);
    let base = tempdir().unwrap();
    let urls = format!("not-a-url,{}", server.url("/f"));

    let err = orchestrator()
        .run(&DownloadRequest::new(base.path(), urls))
        .unwrap_err();

    match err {
        BatchError::MalformedUrl { url, .. } => assert_eq!(url, "not-a-url"),
        other => panic!("expected MalformedUrl, got {other:?}"),
    }
    assert_eq!(server.request_count(), 0);
    assert!(entries_in(base.path()).is_empty(), "run directory must be removed");
}

#[test]
fn missing_scheme_or_host_leaves_nothing_behind() {
    let server = http_server::start(vec![("/ok", Route::ok("x"))]);
    for bad in ["//no-scheme.test/f", "file:///etc/hostname", ""] {
        let base = tempdir().unwrap();
        let urls = format!("{},{}", server.url("/ok"), bad);
        let res = orchestrator().run(&DownloadRequest::new(base.path(), urls));
        assert!(
            matches!(res, Err(BatchError::MalformedUrl { .. })),
            "{bad:?} should be malformed"
        );
        assert!(entries_in(base.path()).is_empty());
    }
    assert_eq!(server.request_count(), 0);
}

#[test]
fn regular_file_target_is_invalid() {
    let base = tempdir().unwrap();
    let file = base.path().join("not-a-dir");
    std::fs::write(&file, b"x").unwrap();

    let err = orchestrator()
        .run(&DownloadRequest::new(&file, "http://a.test/f"))
        .unwrap_err();

    assert!(matches!(err, BatchError::InvalidTarget { .. }));
    assert_eq!(std::fs::read(&file).unwrap(), b"x");
    assert_eq!(entries_in(base.path()), vec!["not-a-dir".to_string()]);
}

#[test]
fn missing_target_is_created() {
    let server = http_server::start(vec![("/f", Route::ok("abc"))]);
    let root = tempdir().unwrap();
    let base = root.path().join("deep/new/out");

    let report = orchestrator()
        .run(&DownloadRequest::new(&base, server.url("/f")))
        .unwrap();

    assert!(report.all_succeeded());
    let file = base.join("2024-05-01-10-00-00").join(&server.host).join("f");
    assert_eq!(std::fs::read(file).unwrap(), b"abc");
}

#[test]
fn report_follows_input_order_not_completion_order() {
    let server = http_server::start(vec![
        ("/slow", Route::ok("slow").delayed(Duration::from_millis(300))),
        ("/mid", Route::ok("mid").delayed(Duration::from_millis(100))),
        ("/fast", Route::ok("fast")),
        ("/gone", Route::status(500)),
    ]);
    let base = tempdir().unwrap();
    let paths = ["/slow", "/mid", "/fast", "/gone"];
    let urls: Vec<String> = paths.iter().map(|p| server.url(p)).collect();

    let report = orchestrator()
        .run(&DownloadRequest::new(base.path(), urls.join(",")))
        .unwrap();

    let sources: Vec<&str> = report.entries().iter().map(|e| e.source.as_str()).collect();
    assert_eq!(sources, urls.iter().map(String::as_str).collect::<Vec<_>>());
    assert_eq!(report.succeeded(), 3);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.to_string().lines().count(), paths.len());
}

#[test]
fn nested_url_paths_become_directories() {
    let server = http_server::start(vec![
        ("/a/b/c.txt", Route::ok("deep")),
        ("/a/top.txt", Route::ok("top")),
        ("/", Route::ok("<html></html>")),
    ]);
    let base = tempdir().unwrap();
    let urls = format!(
        "{},{},{}/",
        server.url("/a/b/c.txt"),
        server.url("/a/top.txt"),
        server.base
    );

    let report = orchestrator()
        .run(&DownloadRequest::new(base.path(), urls))
        .unwrap();

    assert!(report.all_succeeded(), "{report}");
    let host_root = report.run_dir().join(&server.host);
    assert_eq!(std::fs::read(host_root.join("a/b/c.txt")).unwrap(), b"deep");
    assert_eq!(std::fs::read(host_root.join("a/top.txt")).unwrap(), b"top");
    assert_eq!(
        std::fs::read(host_root.join("index.html")).unwrap(),
        b"<html></html>"
    );
}

#[test]
fn failed_item_keeps_directory_shared_with_sibling() {
    let server = http_server::start(vec![("/dir/ok", Route::ok("fine"))]);
    let base = tempdir().unwrap();
    let urls = format!("{},{}", server.url("/dir/ok"), server.url("/dir/missing"));

    let report = orchestrator()
        .run(&DownloadRequest::new(base.path(), urls))
        .unwrap();

    let dir = report.run_dir().join(&server.host).join("dir");
    assert_eq!(report.entries()[0].outcome, Outcome::Succeeded);
    assert_eq!(failure_kind(&report, 1), "download_failed");
    assert_eq!(entries_in(&dir), vec!["ok".to_string()]);
}

#[test]
fn unsupported_protocol_has_no_side_effects() {
    let server = http_server::start(vec![("/f", Route::ok("ok"))]);
    let base = tempdir().unwrap();
    let urls = format!("ftp://other.file.com/other,{}", server.url("/f"));

    let report = orchestrator()
        .run(&DownloadRequest::new(base.path(), urls))
        .unwrap();

    assert_eq!(failure_kind(&report, 0), "unsupported_protocol");
    assert_eq!(report.entries()[1].outcome, Outcome::Succeeded);
    assert_eq!(entries_in(report.run_dir()), vec![server.host.clone()]);
}

#[test]
fn connection_refused_rolls_back() {
    let port = {
        let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        l.local_addr().unwrap().port()
    };
    let base = tempdir().unwrap();
    let url = format!("http://127.0.0.1:{port}/nothing/here");

    let report = orchestrator()
        .run(&DownloadRequest::new(base.path(), url))
        .unwrap();

    assert_eq!(failure_kind(&report, 0), "download_failed");
    assert!(!report.entries()[0].destination.exists());
    let host_root = report.run_dir().join(format!("127.0.0.1:{port}"));
    assert!(!host_root.join("nothing").exists());
}

#[test]
fn two_runs_get_distinct_directories() {
    let server = http_server::start(vec![("/f", Route::ok("same"))]);
    let base = tempdir().unwrap();
    let urls = server.url("/f");

    let first = orchestrator()
        .run(&DownloadRequest::new(base.path(), urls.clone()))
        .unwrap();
    let second = Orchestrator::new(RunConfig::default())
        .with_clock(second_run)
        .run(&DownloadRequest::new(base.path(), urls))
        .unwrap();

    assert_ne!(first.run_dir(), second.run_dir());
    assert_eq!(entries_in(base.path()).len(), 2);
    for report in [&first, &second] {
        assert_eq!(std::fs::read(&report.entries()[0].destination).unwrap(), b"same");
    }
}

#[test]
fn bounded_pool_with_small_buffer_streams_large_body() {
    let body: Vec<u8> = (0u8..251).cycle().take(512 * 1024).collect();
    let server = http_server::start(vec![
        ("/big1", Route::ok(body.clone())),
        ("/big2", Route::ok(body.clone())),
        ("/big3", Route::ok(body.clone())),
    ]);
    let base = tempdir().unwrap();
    let config = RunConfig {
        buffer_size: 1024,
        max_concurrent: Some(2),
        ..RunConfig::default()
    };
    let urls = ["/big1", "/big2", "/big3"]
        .iter()
        .map(|p| server.url(p))
        .collect::<Vec<_>>()
        .join(",");

    let report = Orchestrator::new(config)
        .with_clock(first_run)
        .run(&DownloadRequest::new(base.path(), urls))
        .unwrap();

    assert!(report.all_succeeded(), "{report}");
    for entry in report.entries() {
        assert_eq!(std::fs::read(&entry.destination).unwrap(), body);
    }
}

#[test]
fn blocked_rollback_reports_cleanup_and_original_failure() {
    let server = http_server::start(vec![(
        "/f",
        Route::status(404).delayed(Duration::from_millis(400)),
    )]);
    let base = tempdir().unwrap();
    let dest = base
        .path()
        .join("2024-05-01-10-00-00")
        .join(&server.host)
        .join("f");

    // While the request is in flight, put a non-empty directory where the
    // destination file was so the rollback cannot remove it.
    let swap_target = dest.clone();
    let swapper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(150));
        std::fs::remove_file(&swap_target).unwrap();
        std::fs::create_dir(&swap_target).unwrap();
        std::fs::write(swap_target.join("keep"), b"x").unwrap();
    });

    let report = orchestrator()
        .run(&DownloadRequest::new(base.path(), server.url("/f")))
        .unwrap();
    swapper.join().expect("destination swapped mid-transfer");

    assert_eq!(failure_kind(&report, 0), "cleanup_failed");
    match &report.entries()[0].outcome {
        Outcome::Failed { reason, .. } => assert!(reason.contains("HTTP 404"), "{reason}"),
        Outcome::Succeeded => unreachable!(),
    }
    assert!(dest.join("keep").exists());
}
