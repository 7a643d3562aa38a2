// src/scan.rs
// =============================================================================
// One scan, start to finish, for one target:
//
//   fetch robots.txt -> extract endpoints -> probe them all -> sort ->
//   classify -> print
//
// A target can stop early for three reasons (TargetError):
// - robots.txt couldn't be fetched or read
// - robots.txt had no usable directives
// - the user pressed Ctrl-C while we were probing
// The first two only skip this target. After an interrupt no further targets
// are started.
//
// ScanSession owns the per-target Dispatcher and Aggregator. Nothing is
// global, so one target's queue or counters can never leak into the next.
// =============================================================================

use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::classify::{classify, sort_outcomes};
use crate::config::{normalize_target, RobotsSource, ScanConfig};
use crate::probe::{Aggregator, Dispatcher, ProbeOutcome, Progress, Prober, WorkerPool};
use crate::report::{progress_bar, Console};
use crate::robots::{extract_endpoints, fetch_robots_txt, read_local_robots, RobotsFetch};

// Why a target produced no report
#[derive(Debug, Error)]
pub enum TargetError {
    #[error("Could not fetch robots.txt from {url}")]
    NoRobots { url: String },

    #[error("Error reading custom robots.txt: {reason}")]
    UnreadableRobots { reason: String },

    #[error("No endpoints found in robots.txt")]
    NoEndpoints,

    #[error("Scan interrupted by user")]
    Interrupted,
}

// The finished, sorted and classified results of one target
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub target: Url,
    pub robots_url: String,
    pub outcomes: Vec<ProbeOutcome>,
    pub interesting: Vec<ProbeOutcome>,
}

impl ScanReport {
    // Sorts the outcomes and derives the interesting subset
    pub fn new(target: Url, robots_url: String, mut outcomes: Vec<ProbeOutcome>) -> Self {
        sort_outcomes(&mut outcomes);
        let interesting = classify(&outcomes);
        Self {
            target,
            robots_url,
            outcomes,
            interesting,
        }
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn interesting_count(&self) -> usize {
        self.interesting.len()
    }
}

// The live state of one target while its endpoints are being probed
pub struct ScanSession {
    target: Arc<Url>,
    dispatcher: Arc<Dispatcher>,
    aggregator: Arc<Aggregator>,
}

impl ScanSession {
    pub fn new(target: Url, endpoints: Vec<String>, show_progress: bool) -> Self {
        let dispatcher = Dispatcher::new();
        dispatcher.enqueue_all(endpoints);

        let total = dispatcher.total();
        let aggregator = Aggregator::new(total).with_progress_bar(progress_bar(total, show_progress));

        Self {
            target: Arc::new(target),
            dispatcher: Arc::new(dispatcher),
            aggregator: Arc::new(aggregator),
        }
    }

    pub fn total(&self) -> usize {
        self.dispatcher.total()
    }

    pub fn progress(&self) -> Progress {
        self.aggregator.progress()
    }

    // Probes every queued endpoint with a fresh pool of `workers` tasks
    //
    // Returns once every outcome is published and every worker has exited.
    // If `cancel` fires first, the remaining queue is dropped, in-flight
    // probes are allowed to finish, and Interrupted is returned.
    pub async fn run<P: Prober>(
        &self,
        prober: Arc<P>,
        workers: usize,
        cancel: &CancellationToken,
    ) -> Result<(), TargetError> {
        let pool = WorkerPool::start(
            prober,
            self.target.clone(),
            self.dispatcher.clone(),
            self.aggregator.clone(),
            workers,
        );
        debug!(workers = pool.size(), target = %self.target, "pool started");

        let interrupted = tokio::select! {
            _ = self.dispatcher.wait_for_completion() => false,
            _ = cancel.cancelled() => {
                let dropped = self.dispatcher.close();
                info!(dropped, "interrupt received, waiting for in-flight probes");
                self.dispatcher.wait_for_completion().await;
                true
            }
        };

        pool.join().await;

        if interrupted {
            let progress = self.progress();
            info!(completed = progress.completed, total = progress.total, "target interrupted");
            return Err(TargetError::Interrupted);
        }
        debug_assert!(self.aggregator.progress().is_done());
        Ok(())
    }

    pub fn finish(self, robots_url: String) -> ScanReport {
        let outcomes = self.aggregator.take_outcomes();
        ScanReport::new((*self.target).clone(), robots_url, outcomes)
    }
}

async fn load_robots(config: &ScanConfig, client: &Client, target: &Url) -> Result<RobotsFetch, TargetError> {
    match &config.robots {
        RobotsSource::Remote => Ok(fetch_robots_txt(client, target).await),
        RobotsSource::LocalFile(path) => read_local_robots(path).map_err(|e| TargetError::UnreadableRobots {
            reason: format!("{:#}", e),
        }),
    }
}

// Runs the whole pipeline for one target and prints its results
pub async fn scan_target<P: Prober>(
    config: &ScanConfig,
    client: &Client,
    prober: Arc<P>,
    target: &Url,
    cancel: &CancellationToken,
    console: &Console,
) -> Result<ScanReport, TargetError> {
    let robots = load_robots(config, client, target).await?;
    let Some(content) = robots.content else {
        return Err(TargetError::NoRobots { url: robots.url });
    };
    console.robots_found(&robots.url);

    let endpoints = extract_endpoints(&content);
    if endpoints.is_empty() {
        return Err(TargetError::NoEndpoints);
    }
    console.endpoints_found(endpoints.len());

    if cancel.is_cancelled() {
        return Err(TargetError::Interrupted);
    }

    let session = ScanSession::new(target.clone(), endpoints, config.show_progress);
    info!(target = %target, endpoints = session.total(), workers = config.workers, "probing");
    session.run(prober, config.workers, cancel).await?;

    let report = session.finish(robots.url);
    info!(
        target = %target,
        robots = %report.robots_url,
        total = report.total(),
        failed = report.outcomes.iter().filter(|o| o.is_failure()).count(),
        interesting = report.interesting_count(),
        "target finished"
    );

    console.print_report(&report, config.interesting_only);
    console.completed(report.target.as_str().trim_end_matches('/'));
    Ok(report)
}

// Scans every target in order
//
// A target that fails is reported and skipped. An interrupt stops the loop;
// the reports gathered up to that point are still returned for export.
pub async fn scan_all<P: Prober>(
    config: &ScanConfig,
    client: &Client,
    prober: Arc<P>,
    targets: &[String],
    cancel: &CancellationToken,
    console: &Console,
) -> Vec<ScanReport> {
    let mut reports = Vec::new();

    for raw in targets {
        if cancel.is_cancelled() {
            console.interrupted();
            break;
        }

        let target = match normalize_target(raw) {
            Ok(url) => url,
            Err(e) => {
                console.error(&format!("{:#}", e));
                continue;
            }
        };
        console.scanning(target.as_str().trim_end_matches('/'));

        match scan_target(config, client, prober.clone(), &target, cancel, console).await {
            Ok(report) => reports.push(report),
            Err(TargetError::Interrupted) => {
                console.interrupted();
                break;
            }
            Err(e) => {
                warn!(target = %target, error = %e, "target skipped");
                console.target_skipped(&e);
            }
        }
    }

    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::HttpProber;
    use crate::test_support::{dead_base_url, Fixture};
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::time::Duration;

    fn quiet_config(workers: usize) -> ScanConfig {
        ScanConfig {
            workers,
            show_progress: false,
            color: false,
            ..ScanConfig::default()
        }
    }

    fn http(config: &ScanConfig) -> (Client, Arc<HttpProber>) {
        let client = config.http_client().unwrap();
        (client.clone(), Arc::new(HttpProber::new(client)))
    }

    const ROBOTS: &str = "User-agent: *\nDisallow: /admin/\nDisallow: /secret.txt\nAllow: /public\n";

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_scan_target_end_to_end() {
        let server = Fixture::new()
            .route("/robots.txt", 200, ROBOTS)
            .route("/admin/", 200, "admin panel")
            .route("/public", 200, "hi")
            .serve()
            .await;
        let config = quiet_config(2);
        let (client, prober) = http(&config);

        let report = scan_target(
            &config,
            &client,
            prober,
            &server.base,
            &CancellationToken::new(),
            &Console::new(false),
        )
        .await
        .unwrap();

        // robots.txt first, then each endpoint exactly once
        let mut requests = server.requests();
        assert_eq!(requests.remove(0), "/robots.txt");
        requests.sort();
        assert_eq!(requests, vec!["/admin/", "/public", "/secret.txt"]);

        assert_eq!(report.total(), 3);
        let rows: Vec<(&str, Option<u16>)> = report
            .outcomes
            .iter()
            .map(|o| (o.endpoint.as_str(), o.status))
            .collect();
        assert_eq!(
            rows,
            vec![("/admin/", Some(200)), ("/public", Some(200)), ("/secret.txt", Some(404))]
        );
        assert_eq!(report.outcomes[0].size, 11);

        let interesting: Vec<&str> = report.interesting.iter().map(|o| o.endpoint.as_str()).collect();
        assert_eq!(interesting, vec!["/admin/", "/public"]);
    }

    #[tokio::test]
    async fn test_missing_robots_skips_target() {
        let server = Fixture::new().serve().await;
        let config = quiet_config(2);
        let (client, prober) = http(&config);

        let result = scan_target(
            &config,
            &client,
            prober,
            &server.base,
            &CancellationToken::new(),
            &Console::new(false),
        )
        .await;

        assert!(matches!(result, Err(TargetError::NoRobots { .. })));
        assert_eq!(server.requests(), vec!["/robots.txt"]);
    }

    #[tokio::test]
    async fn test_robots_without_directives_skips_target() {
        let server = Fixture::new()
            .route("/robots.txt", 200, "User-agent: *\nCrawl-delay: 5\n")
            .serve()
            .await;
        let config = quiet_config(2);
        let (client, prober) = http(&config);

        let result = scan_target(
            &config,
            &client,
            prober,
            &server.base,
            &CancellationToken::new(),
            &Console::new(false),
        )
        .await;

        assert!(matches!(result, Err(TargetError::NoEndpoints)));
    }

    #[tokio::test]
    async fn test_local_robots_override() {
        let server = Fixture::new().route("/from-file", 403, "no").serve().await;
        let mut robots = tempfile::NamedTempFile::new().unwrap();
        writeln!(robots, "Disallow: /from-file").unwrap();

        let config = ScanConfig {
            robots: RobotsSource::LocalFile(robots.path().to_path_buf()),
            ..quiet_config(4)
        };
        let (client, prober) = http(&config);

        let report = scan_target(
            &config,
            &client,
            prober,
            &server.base,
            &CancellationToken::new(),
            &Console::new(false),
        )
        .await
        .unwrap();

        assert_eq!(server.requests(), vec!["/from-file"]);
        assert_eq!(report.outcomes[0].status, Some(403));
        assert!(report.interesting.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_local_robots_skips_target() {
        let config = ScanConfig {
            robots: RobotsSource::LocalFile("/no/such/robots.txt".into()),
            ..quiet_config(1)
        };
        let (client, prober) = http(&config);
        let target = Url::parse("https://example.invalid").unwrap();

        let result = scan_target(
            &config,
            &client,
            prober,
            &target,
            &CancellationToken::new(),
            &Console::new(false),
        )
        .await;

        assert!(matches!(result, Err(TargetError::UnreadableRobots { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_failed_target_does_not_stop_the_run() {
        let dead = dead_base_url().await;
        let server = Fixture::new()
            .route("/robots.txt", 200, "Disallow: /admin\n")
            .route("/admin", 401, "")
            .serve()
            .await;
        let config = quiet_config(2);
        let (client, prober) = http(&config);

        let targets = vec![
            dead.to_string(),
            server.base.to_string(),
        ];
        let reports = scan_all(
            &config,
            &client,
            prober,
            &targets,
            &CancellationToken::new(),
            &Console::new(false),
        )
        .await;

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].outcomes[0].endpoint, "/admin");
        assert_eq!(reports[0].interesting.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_scans_nothing() {
        let server = Fixture::new().route("/robots.txt", 200, ROBOTS).serve().await;
        let config = quiet_config(2);
        let (client, prober) = http(&config);

        let cancel = CancellationToken::new();
        cancel.cancel();

        let reports = scan_all(
            &config,
            &client,
            prober,
            &[server.base.to_string()],
            &cancel,
            &Console::new(false),
        )
        .await;

        assert!(reports.is_empty());
        assert!(server.requests().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_interrupt_stops_new_probes_and_waits_for_in_flight() {
        let server = Fixture::new()
            .slow("/slow-0", Duration::from_millis(300))
            .slow("/slow-1", Duration::from_millis(300))
            .serve()
            .await;
        let endpoints: Vec<String> = (0..20).map(|i| format!("/slow-{}", i)).collect();
        let config = quiet_config(2);
        let (_, prober) = http(&config);

        let session = ScanSession::new(server.base.clone(), endpoints, false);
        let cancel = CancellationToken::new();
        let trigger = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                cancel.cancel();
            })
        };

        let result = session.run(prober, 2, &cancel).await;
        trigger.await.unwrap();

        assert!(matches!(result, Err(TargetError::Interrupted)));
        // Only the two probes already in flight ran to completion
        assert_eq!(session.progress().completed, 2);
        assert_eq!(server.requests().len(), 2);
    }

    #[test]
    fn test_report_sorts_and_classifies() {
        let report = ScanReport::new(
            Url::parse("https://example.com").unwrap(),
            "https://example.com/robots.txt".to_string(),
            vec![
                ProbeOutcome::failed("/admin", "https://example.com/admin"),
                ProbeOutcome::new("/wp-admin", "https://example.com/wp-admin", 403, 0),
                ProbeOutcome::new("/random", "https://example.com/random", 200, 0),
            ],
        );

        let order: Vec<&str> = report.outcomes.iter().map(|o| o.endpoint.as_str()).collect();
        assert_eq!(order, vec!["/random", "/wp-admin", "/admin"]);
        assert_eq!(report.interesting_count(), 2);
    }
}
