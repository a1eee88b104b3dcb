// tests/admission.rs

mod common;
use crate::common::{controller, init_tracing, with_timeout, ScriptDir};

use std::time::{Duration, Instant};

#[tokio::test]
async fn limit_of_one_runs_sequentially() {
    init_tracing();
    let (controller, _sink) = controller(1);
    let commands = ["sleep 0.3", "sleep 0.3", "sleep 0.3"];

    let started = Instant::now();
    let report = with_timeout(controller.run_with_report(&commands)).await;

    assert_eq!(report.status, 0);
    assert!(started.elapsed() >= Duration::from_millis(900));
    assert_eq!(report.peak_running, 1);
    assert_eq!(report.blocked_admissions, 2);
}

#[tokio::test]
async fn generous_limit_never_blocks() {
    init_tracing();
    let (controller, _sink) = controller(4);
    let commands = ["sleep 0.3", "sleep 0.3", "sleep 0.3"];

    let started = Instant::now();
    let report = with_timeout(controller.run_with_report(&commands)).await;

    assert_eq!(report.status, 0);
    assert_eq!(report.blocked_admissions, 0);
    assert!(report.peak_running <= 3);
    assert!(started.elapsed() < Duration::from_millis(900));
}

#[tokio::test]
async fn live_jobs_never_exceed_the_limit() {
    init_tracing();
    let scripts = ScriptDir::new();
    let commands: Vec<String> = (0..8)
        .map(|i| scripts.journaled(&format!("job{i}"), 0.1))
        .collect();
    let (controller, _sink) = controller(3);

    let report = with_timeout(controller.run_with_report(&commands)).await;

    assert_eq!(report.status, 0);
    assert!(report.peak_running <= 3);
    assert!(scripts.max_overlap() <= 3);
    assert_eq!(scripts.journal().len(), 16);
}

#[tokio::test]
async fn zero_limit_is_clamped_to_one() {
    init_tracing();
    let (controller, _sink) = controller(0);

    assert_eq!(controller.concurrency_limit(), 1);
    let codes = with_timeout(controller.run_all(&["true", "true"])).await.unwrap();
    assert_eq!(codes, vec![0, 0]);
}
