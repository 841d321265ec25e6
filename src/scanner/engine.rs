//! Main check engine: fans hosts out to a worker pool and streams results back

use crate::config::CheckConfig;
use crate::error::ResolveError;
use crate::network::{HostResolver, PortProber, SystemResolver, TcpProber};
use crate::scanner::{HostCheckResult, HostChecker};
use futures::{FutureExt, Stream};
use std::any::Any;
use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Main check engine
pub struct CheckEngine {
    config: CheckConfig,
    checker: Arc<HostChecker>,
}

impl CheckEngine {
    /// Create an engine that uses the system resolver and plain TCP connects
    pub fn new(config: CheckConfig) -> crate::Result<Self> {
        let prober = TcpProber::new(config.timeout_duration());
        Self::with_components(config, Arc::new(SystemResolver::new()), Arc::new(prober))
    }

    /// Create an engine around a caller-supplied resolver and prober
    pub fn with_components(
        config: CheckConfig,
        resolver: Arc<dyn HostResolver>,
        prober: Arc<dyn PortProber>,
    ) -> crate::Result<Self> {
        config.validate()?;
        let checker = Arc::new(HostChecker::new(&config, resolver, prober));
        Ok(Self { config, checker })
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Check a single host without going through the pool
    pub async fn check_one(&self, host: &str) -> HostCheckResult {
        self.checker.check(host).await
    }

    /// Start checking every host and return the stream their results arrive on.
    ///
    /// Exactly one result is produced per input entry, in completion order.
    /// The stream ends once every host has been checked. Must be called from
    /// within a Tokio runtime.
    pub fn check_all<I, S>(&self, hosts: I) -> ResultStream
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue: VecDeque<String> = hosts.into_iter().map(Into::into).collect();
        let total = queue.len();
        let worker_count = std::cmp::min(self.config.workers, total);

        let (tx, rx) = mpsc::channel(self.config.buffer_size);
        let queue = Arc::new(Mutex::new(queue));

        log::debug!("checking {} hosts with {} workers", total, worker_count);

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let handle = tokio::spawn(run_worker(
                worker_id,
                queue.clone(),
                self.checker.clone(),
                tx.clone(),
            ));
            handles.push(handle);
        }

        // Only workers hold senders now; the channel closes when the last one exits.
        drop(tx);
        tokio::spawn(await_workers(handles));

        ResultStream { rx, remaining: total }
    }
}

/// Pull hosts off the shared queue until it is empty or the consumer goes away.
async fn run_worker(
    worker_id: usize,
    queue: Arc<Mutex<VecDeque<String>>>,
    checker: Arc<HostChecker>,
    tx: mpsc::Sender<HostCheckResult>,
) -> usize {
    let mut checked = 0;

    loop {
        let next = queue.lock().await.pop_front();
        let Some(host) = next else {
            break;
        };

        let result = match AssertUnwindSafe(checker.check(&host)).catch_unwind().await {
            Ok(result) => result,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                log::error!("worker {}: check of {} panicked: {}", worker_id, host, reason);
                let error = ResolveError::lookup(&host, format!("check panicked: {}", reason));
                HostCheckResult::unresolved(host.as_str(), error)
            }
        };
        checked += 1;

        if tx.send(result).await.is_err() {
            log::debug!("worker {}: result stream dropped, stopping", worker_id);
            break;
        }
    }

    log::trace!("worker {}: finished after {} hosts", worker_id, checked);
    checked
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Completion barrier over the pool. Reports workers that died mid-check.
async fn await_workers(handles: Vec<JoinHandle<usize>>) {
    let mut checked = 0;
    for handle in handles {
        match handle.await {
            Ok(count) => checked += count,
            Err(e) => log::error!("Check worker failed: {}", e),
        }
    }
    log::debug!("all workers finished, {} hosts checked", checked);
}

/// Results of a [`CheckEngine::check_all`] run, in completion order.
///
/// Single pass: once drained it stays empty. Dropping it early makes the
/// workers stop after the host they are currently on.
#[derive(Debug)]
pub struct ResultStream {
    rx: mpsc::Receiver<HostCheckResult>,
    remaining: usize,
}

impl ResultStream {
    /// Wait for the next result; `None` once every host has reported
    pub async fn next_result(&mut self) -> Option<HostCheckResult> {
        let result = self.rx.recv().await;
        if result.is_some() {
            self.remaining = self.remaining.saturating_sub(1);
        }
        result
    }

    /// Results not yet received
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Drain the stream
    pub async fn collect_all(mut self) -> Vec<HostCheckResult> {
        let mut results = Vec::with_capacity(self.remaining);
        while let Some(result) = self.next_result().await {
            results.push(result);
        }
        results
    }
}

impl Stream for ResultStream {
    type Item = HostCheckResult;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let polled = this.rx.poll_recv(cx);
        if let Poll::Ready(Some(_)) = &polled {
            this.remaining = this.remaining.saturating_sub(1);
        }
        polled
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
