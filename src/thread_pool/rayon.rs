use super::ThreadPool;
use crate::{ArithError, Result};

use slog::Logger;
use std::any::Any;

/// rayon::ThreadPool的包装
///
/// 任务中的panic由panic_handler记录到日志，不会终止进程。
pub struct RayonThreadPool(rayon::ThreadPool);

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

impl ThreadPool for RayonThreadPool {
    fn new(threads: u32, logger: &Logger) -> Result<Self> {
        if threads == 0 {
            return Err(ArithError::InvalidWorkerCount);
        }

        let panic_log = logger.clone();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads as usize)
            .thread_name(|i| format!("arith-conn-{}", i))
            .panic_handler(move |payload| {
                error!(panic_log, "connection job panicked: {}", panic_message(&*payload));
            })
            .build()?;
        debug!(logger, "rayon connection pool started with {} threads", threads);

        Ok(RayonThreadPool(pool))
    }

    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.0.spawn(job);
        Ok(())
    }
}
