// src/pool/mod.rs
// =============================================================================
// This module runs many URL checks at the same time.
//
// How it works (fan-out / fan-in):
//
//              ┌──> worker 0 ──┐
//   jobs ──> queue ──> worker 1 ──> results ──> caller
//              └──> worker N ──┘
//
// - A feeder task pushes every Job into a bounded queue, then closes it
// - N workers pull from that queue (see worker.rs)
// - Every worker pushes its AuditResult into a second bounded queue
// - A supervisor waits for ALL workers to finish before closing the result
//   queue, so no result can be lost
//
// The caller gets a ResultStream: results arrive in completion order, not in
// submission order. Each result carries the RowId of its job.
//
// Rust concepts:
// - tokio::sync::mpsc: async channels (bounded queues)
// - JoinSet: a group of spawned tasks we can wait on
// - Arc<dyn Trait>: one shared fetcher for every worker
// - futures::Stream: an async iterator
// =============================================================================

mod worker;

use crate::checker::{AuditResult, Job, PageFetcher};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info};

// Never run fewer workers than this unless the user asks for it
pub const MIN_WORKERS: usize = 4;

// Picks the number of workers
//
// requested = Some(n): exactly n (at least 1)
// requested = None:    number of CPUs, but at least MIN_WORKERS
//
// The size is fixed for the whole run.
pub fn pool_size(requested: Option<usize>) -> usize {
    match requested {
        Some(n) => n.max(1),
        None => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .max(MIN_WORKERS),
    }
}

// Starts the pool and returns the stream of results
//
// Must be called from inside a tokio runtime. The stream yields exactly one
// AuditResult per Job and then ends. It can't be restarted.
pub fn run<I>(jobs: I, pool_size: usize, fetcher: Arc<dyn PageFetcher>) -> ResultStream
where
    I: IntoIterator<Item = Job>,
    I::IntoIter: Send + 'static,
{
    let pool_size = pool_size.max(1);
    let (job_tx, job_rx) = mpsc::channel::<Job>(pool_size);
    let (result_tx, result_rx) = mpsc::channel::<AuditResult>(pool_size);
    let job_rx = Arc::new(Mutex::new(job_rx));

    let mut workers = JoinSet::new();
    for id in 0..pool_size {
        workers.spawn(worker::run_worker(
            id,
            Arc::clone(&job_rx),
            result_tx.clone(),
            Arc::clone(&fetcher),
        ));
    }
    // Only the workers hold the job receiver now
    drop(job_rx);

    let jobs = jobs.into_iter();
    tokio::spawn(async move {
        // Feed every job exactly once
        let mut submitted = 0usize;
        for job in jobs {
            if job_tx.send(job).await.is_err() {
                // All workers are gone, which only happens when the result
                // stream was dropped
                debug!("job queue closed early, stopping submission");
                break;
            }
            submitted += 1;
        }
        // Closing the sender tells the workers there is nothing more to come
        drop(job_tx);
        info!(submitted, workers = pool_size, "all jobs submitted");

        // Wait for every worker before closing the result stream
        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "worker task ended abnormally");
            }
        }
        drop(result_tx);
        debug!("all workers finished, result stream closed");
    });

    ResultStream { inner: result_rx }
}

// Results in completion order
//
// Use futures::StreamExt (next, collect, ...) to read it.
pub struct ResultStream {
    inner: mpsc::Receiver<AuditResult>,
}

impl Stream for ResultStream {
    type Item = AuditResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_recv(cx)
    }
}
