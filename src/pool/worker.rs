// src/pool/worker.rs
// =============================================================================
// One worker = one loop:
//
//   1. Take the next Job from the shared queue (wait if it's empty)
//   2. Fetch the page
//   3. Run the detector on it
//   4. Send the AuditResult to the result queue
//   5. Repeat until the queue is closed and empty
//
// Each job goes Queued -> Fetching -> Classifying -> Completed. A fetch error
// jumps straight to Completed with a Failed result.
//
// Nothing a single job does can stop the worker: errors become Failed results,
// and even a panic is caught and turned into a Failed result for that job.
// =============================================================================

use crate::checker::{detect, AuditResult, CheckError, Job, PageFetcher};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

// The receiving end of the job queue, shared by all workers
pub(super) type JobQueue = Arc<Mutex<mpsc::Receiver<Job>>>;

pub(super) async fn run_worker(
    worker: usize,
    jobs: JobQueue,
    results: mpsc::Sender<AuditResult>,
    fetcher: Arc<dyn PageFetcher>,
) {
    let mut processed = 0usize;

    loop {
        // The lock is only held while waiting for the next job, never while
        // the job is being processed
        let next = jobs.lock().await.recv().await;
        let Some(job) = next else {
            break;
        };

        let result = check_job_isolated(fetcher.as_ref(), job).await;
        processed += 1;

        if results.send(result).await.is_err() {
            // Nobody is reading results any more, stop early
            debug!(worker, "result stream dropped, worker stopping");
            break;
        }
    }

    debug!(worker, processed, "worker finished");
}

// Runs check_job, turning a panic into a Failed result
async fn check_job_isolated(fetcher: &dyn PageFetcher, job: Job) -> AuditResult {
    let fallback = job.clone();

    match AssertUnwindSafe(check_job(fetcher, job)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(id = %fallback.id, url = %fallback.url, %message, "check panicked");
            AuditResult::failed(fallback, &format!("internal error: {}", message))
        }
    }
}

// Processes one job from fetch to verdict
async fn check_job(fetcher: &dyn PageFetcher, job: Job) -> AuditResult {
    debug!(id = %job.id, url = %job.url, "fetching");

    let page = match fetcher.fetch(&job.url).await {
        Ok(page) => page,
        Err(error) => {
            warn!(id = %job.id, url = %job.url, %error, "fetch failed");
            return AuditResult::failed(job, &error);
        }
    };

    debug!(id = %job.id, status = page.status, final_url = %page.final_url, "classifying");

    let body: Result<&[u8], &CheckError> = page.body.as_deref();
    let detection = detect(&page.robots_headers, body, page.charset.as_deref());
    if let Err(error) = &detection {
        warn!(id = %job.id, url = %job.url, %error, "page could not be parsed");
    }

    let result = AuditResult::classify(job, Some(page.status), detection);
    debug!(id = %result.id, status = ?result.status, findings = result.findings.len(), "completed");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{AuditStatus, HttpFetcher, RowId};
    use crate::config::FetchConfig;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn check(server: &MockServer, route: &str) -> AuditResult {
        check_url(&FetchConfig::default(), &format!("{}{}", server.uri(), route)).await
    }

    async fn check_url(config: &FetchConfig, url: &str) -> AuditResult {
        let fetcher = HttpFetcher::new(config).unwrap();
        check_job(&fetcher, Job::new(RowId(2), url)).await
    }

    // A server that promises 1000 body bytes but sends only a few.
    // With `stall` it then keeps the connection open, otherwise it hangs up.
    async fn truncated_body_server(robots_header: Option<&'static str>, stall: bool) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;

            let mut response = String::from("HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 1000\r\n");
            if let Some(value) = robots_header {
                response.push_str(&format!("X-Robots-Tag: {}\r\n", value));
            }
            response.push_str("\r\n<html><head>");
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();

            if stall {
                tokio::time::sleep(Duration::from_secs(10)).await;
            }
        });

        format!("http://{}/", address)
    }

    fn short_deadline() -> FetchConfig {
        FetchConfig {
            transport_timeout: Duration::from_secs(5),
            deadline: Duration::from_millis(500),
            ..FetchConfig::default()
        }
    }

    async fn serve(server: &MockServer, route: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_clean_page() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/clean",
            ResponseTemplate::new(200).set_body_string("<html><head></head><body></body></html>"),
        )
        .await;

        let result = check(&server, "/clean").await;
        assert_eq!(result.status, AuditStatus::Clean);
        assert!(result.findings.is_empty());
        assert_eq!(result.http_status, Some(200));
        assert_eq!(result.render(), "✅ No noindex / nofollow found");
    }

    #[tokio::test]
    async fn test_second_header_instance_is_found() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/headers",
            ResponseTemplate::new(200)
                .append_header("X-Robots-Tag", "max-snippet:-1")
                .append_header("X-Robots-Tag", "NoIndex")
                .set_body_string("<html></html>"),
        )
        .await;

        let result = check(&server, "/headers").await;
        assert_eq!(result.status, AuditStatus::Excluded);
        assert_eq!(result.render(), "❌ X-Robots-Tag found: noindex");
    }

    #[tokio::test]
    async fn test_meta_tag_is_found() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/meta",
            ResponseTemplate::new(200)
                .set_body_string(r#"<html><head><meta name="robots" content="NoIndex, Follow"></head></html>"#),
        )
        .await;

        let result = check(&server, "/meta").await;
        assert_eq!(result.status, AuditStatus::Excluded);
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].normalized_value, "noindex,follow");
    }

    #[tokio::test]
    async fn test_body_cut_off_with_header_is_excluded() {
        let url = truncated_body_server(Some("noindex"), false).await;

        let result = check_url(&FetchConfig::default(), &url).await;
        assert_eq!(result.status, AuditStatus::Excluded);
        assert_eq!(result.findings.len(), 1);
        assert!(result.error.is_none());
        assert_eq!(result.render(), "❌ X-Robots-Tag found: noindex");
    }

    #[tokio::test]
    async fn test_body_cut_off_without_header_is_failed() {
        let url = truncated_body_server(None, false).await;

        let result = check_url(&FetchConfig::default(), &url).await;
        assert_eq!(result.status, AuditStatus::Failed);
        assert_eq!(result.http_status, Some(200));
        assert!(result.render().starts_with("❌ Error: could not parse HTML: body could not be read"));
    }

    #[tokio::test]
    async fn test_deadline_during_body_keeps_header_evidence() {
        let url = truncated_body_server(Some("NoIndex, NoFollow"), true).await;

        let result = check_url(&short_deadline(), &url).await;
        assert_eq!(result.status, AuditStatus::Excluded);
        assert_eq!(result.findings[0].normalized_value, "noindex,nofollow");
    }

    #[tokio::test]
    async fn test_deadline_during_body_without_header_is_failed() {
        let url = truncated_body_server(None, true).await;

        let result = check_url(&short_deadline(), &url).await;
        assert_eq!(result.status, AuditStatus::Failed);
        assert!(result.error.unwrap().contains("timed out after 0.5s"));
    }

    #[tokio::test]
    async fn test_non_utf8_page_is_inspected() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/latin1",
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "text/html; charset=ISO-8859-1")
                .set_body_bytes(b"<meta name=\"robots\" content=\"noindex\"><p>caf\xE9 cr\xE8me</p>".to_vec()),
        )
        .await;

        let result = check(&server, "/latin1").await;
        assert_eq!(result.status, AuditStatus::Excluded);
        assert_eq!(result.render(), "❌ Meta robots found: noindex");
    }

    #[tokio::test]
    async fn test_error_status_pages_are_still_inspected() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/gone",
            ResponseTemplate::new(410).set_body_string(r#"<meta name="googlebot" content="noindex">"#),
        )
        .await;

        let result = check(&server, "/gone").await;
        assert_eq!(result.status, AuditStatus::Excluded);
        assert_eq!(result.http_status, Some(410));
    }

    #[tokio::test]
    async fn test_invalid_url_fails_only_that_job() {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let result = check_job(&fetcher, Job::new(RowId(7), "ftp://example.com/file")).await;

        assert_eq!(result.id, RowId(7));
        assert_eq!(result.status, AuditStatus::Failed);
        assert!(result.error.unwrap().starts_with("invalid URL"));
    }
}
