//! # Concurrent Scheduler / 并发调度器
//!
//! Runs requests on a fixed pool of workers. Each worker owns a private
//! scratch directory and repeatedly claims the next unassigned request with a
//! single atomic increment; nothing else is shared mutably between workers.
//! Results flow back over a channel in completion order.
//!
//! 在固定数量的工作者上运行请求。每个工作者拥有私有的临时目录，
//! 通过一次原子递增领取下一个未分配的请求；工作者之间不共享其他可变状态。
//! 结果按完成顺序通过通道返回。

use anyhow::{Context, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::config::RunConfig;
use crate::core::execution::run_request;
use crate::core::models::{CompletedTest, TestRequest};
use crate::errors::ConfigError;
use crate::infra::command::Launcher;
use crate::infra::fs::{WorkerScratch, save_failure_artifacts};

/// Runs every request and calls `on_result` as each one completes.
///
/// Workers stop claiming requests once `cancel` fires, so an interrupted run
/// returns fewer results than requests.
pub async fn run_all(
    cfg: Arc<RunConfig>,
    requests: Vec<TestRequest>,
    launcher: Arc<dyn Launcher>,
    cancel: CancellationToken,
    mut on_result: impl FnMut(&CompletedTest),
) -> Result<Vec<CompletedTest>> {
    let total = requests.len();
    let worker_count = cfg.jobs.max(1).min(total.max(1));
    let requests = Arc::new(requests);
    let next = Arc::new(AtomicUsize::new(0));
    let (tx, mut rx) = mpsc::unbounded_channel();

    // Create every scratch directory before the first test starts.
    let mut scratches = Vec::with_capacity(worker_count);
    for worker in 0..worker_count {
        let scratch = WorkerScratch::create(cfg.scratch_parent.as_deref(), worker).map_err(|source| {
            ConfigError::Scratch {
                path: cfg.scratch_parent.clone().unwrap_or_else(std::env::temp_dir),
                source,
            }
        })?;
        scratches.push(scratch);
    }

    let mut handles = Vec::with_capacity(worker_count);
    for (worker, scratch) in scratches.into_iter().enumerate() {
        let cfg = Arc::clone(&cfg);
        let requests = Arc::clone(&requests);
        let next = Arc::clone(&next);
        let launcher = Arc::clone(&launcher);
        let cancel = cancel.clone();
        let tx = tx.clone();

        handles.push(tokio::spawn(async move {
            debug!(worker, scratch = %scratch.path().display(), "worker started");
            loop {
                if cancel.is_cancelled() {
                    break;
                }
                let index = next.fetch_add(1, Ordering::Relaxed);
                let Some(req) = requests.get(index) else {
                    break;
                };

                let result = run_request(req, &cfg, &scratch, launcher.as_ref()).await;
                if result.is_failure() {
                    if let Some(dir) = &cfg.save_failures {
                        if let Err(e) = save_failure_artifacts(dir, &req.name, &scratch) {
                            warn!(test = %req.name, dir = %dir.display(), error = %e, "failed to save failure artifacts");
                        }
                    }
                }

                let done = CompletedTest {
                    index,
                    name: req.name.clone(),
                    result,
                };
                if tx.send(done).is_err() {
                    break;
                }
            }
            debug!(worker, "worker finished");
        }));
    }
    drop(tx);

    let mut completed = Vec::with_capacity(total);
    while let Some(done) = rx.recv().await {
        on_result(&done);
        completed.push(done);
    }

    for handle in handles {
        handle.await.context("a test worker panicked")?;
    }
    Ok(completed)
}
