use super::ThreadPool;
use crate::{ArithError, Result};

use crossbeam_channel::{unbounded, Receiver, Sender};
use slog::Logger;
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

enum PoolMessage {
    RunJob(Job),
    Shutdown,
}

#[derive(Clone)]
struct JobReceiver {
    rx: Receiver<PoolMessage>,
    logger: Logger,
}

impl Drop for JobReceiver {
    fn drop(&mut self) {
        if thread::panicking() {
            warn!(self.logger, "connection thread panicked, spawning a replacement");
            let rx = self.clone();
            if let Err(e) = thread::Builder::new().spawn(move || run_jobs(rx)) {
                error!(self.logger, "Failed to spawn a thread: {}", e);
            }
        }
    }
}

fn run_jobs(rx: JobReceiver) {
    loop {
        match rx.rx.recv() {
            Ok(PoolMessage::RunJob(job)) => job(),
            Err(_) | Ok(PoolMessage::Shutdown) => break,
        }
    }
}

/// 通过共享队列实现的线程池
///
/// 如果线程池中的一个线程发生panic，那么旧线程会被销毁，同时创建一个新线程。
/// 线程池被丢弃时向每个线程发送一条关闭消息。
pub struct SharedQueueThreadPool {
    sender: Sender<PoolMessage>,
    threads: u32,
}

impl ThreadPool for SharedQueueThreadPool {
    fn new(threads: u32, logger: &Logger) -> Result<Self> {
        if threads == 0 {
            return Err(ArithError::InvalidWorkerCount);
        }

        let (sender, rx) = unbounded();

        for i in 0..threads {
            let receiver = JobReceiver {
                rx: rx.clone(),
                logger: logger.clone(),
            };
            thread::Builder::new()
                .name(format!("arith-conn-{}", i))
                .spawn(move || run_jobs(receiver))?;
        }
        debug!(logger, "shared queue connection pool started with {} threads", threads);

        Ok(SharedQueueThreadPool { sender, threads })
    }

    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .send(PoolMessage::RunJob(Box::new(job)))
            .map_err(|_| ArithError::PoolClosed)
    }
}

impl Drop for SharedQueueThreadPool {
    fn drop(&mut self) {
        for _ in 0..self.threads {
            if self.sender.send(PoolMessage::Shutdown).is_err() {
                break;
            }
        }
    }
}
