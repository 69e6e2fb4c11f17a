//! 该模块提供表达式求值池
//!
//! 每个 worker 在独立线程上运行，与池之间各有一对私有通道；一个 collector 线程
//! 汇总所有 worker 的输出。表达式按轮询方式分发，分发完毕后向每个 worker 发送
//! `Stop`，collector 收齐所有 `Ack` 后退出。

use crate::operator::{Answer, EvalError};
use crate::{ArithError, Result};

use crossbeam_channel::unbounded;
use slog::Logger;
use std::fmt;
use std::thread::{self, JoinHandle};

mod collector;
mod worker;

use collector::Collector;
use worker::Worker;

/// 池与 worker 之间的控制信号
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// 请求 worker 停止
    Stop,
    /// worker 确认已停止
    Ack,
}

/// 通道中传递的消息：数据或控制信号
#[derive(Debug)]
pub(crate) enum Envelope<T> {
    Payload(T),
    Signal(ControlSignal),
}

/// 分发给 worker 的一条表达式
#[derive(Debug, Clone, PartialEq)]
pub struct WorkItem {
    /// 提交顺序编号，从 0 开始
    pub sequence_number: usize,
    /// 表达式原文
    pub expression: String,
}

/// 单条表达式的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 求值结果或校验失败信息
    Answer(Answer),
    /// 求值过程中出错
    Error(EvalError),
}

/// worker 返回的结果
#[derive(Debug, Clone, PartialEq)]
pub struct WorkResult {
    /// 处理该表达式的 worker 编号
    pub worker_id: usize,
    /// 表达式的提交顺序编号
    pub sequence_number: usize,
    /// 表达式原文
    pub expression: String,
    /// 处理结果
    pub outcome: Outcome,
}

impl WorkResult {
    /// 结果是否为求值错误
    pub fn is_error(&self) -> bool {
        match self.outcome {
            Outcome::Error(_) => true,
            Outcome::Answer(_) => false,
        }
    }
}

impl fmt::Display for WorkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Answer(answer) => write!(
                f,
                "process[{}] response, input_line[{}]: {} = {} ",
                self.worker_id, self.sequence_number, self.expression, answer
            ),
            Outcome::Error(err) => write!(
                f,
                "error[{}] response, input_line[{}]: {} = {} ",
                self.worker_id, self.sequence_number, self.expression, err
            ),
        }
    }
}

/// 表达式求值池
///
/// 每次调用 [`ArithmeticPool::pool_processor`] 都会创建新的 worker 与 collector，
/// 调用结束时它们全部退出，批次之间不保留任何状态。
pub struct ArithmeticPool {
    worker_count: usize,
    validate_operations: bool,
    logger: Logger,
}

impl ArithmeticPool {
    /// 创建一个含 `worker_count` 个 worker 的求值池
    ///
    /// `validate_operations` 为 false 时 worker 跳过校验直接求值。
    pub fn new(worker_count: u32, validate_operations: bool, logger: &Logger) -> Result<Self> {
        if worker_count == 0 {
            return Err(ArithError::InvalidWorkerCount);
        }

        Ok(ArithmeticPool {
            worker_count: worker_count as usize,
            validate_operations,
            logger: logger.new(o!("workers" => worker_count)),
        })
    }

    /// worker 数量
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// 对一批表达式求值，返回与输入数量相同的结果
    ///
    /// 第 n 条表达式交给编号为 `n % worker_count` 的 worker。结果按 collector
    /// 收到的顺序排列，不保证与输入顺序一致。
    ///
    /// # Errors
    ///
    /// worker 在确认停止之前断开通道时返回 `ArithError::WorkerLost`。
    pub fn pool_processor<I, S>(&self, expressions: I) -> Result<Vec<WorkResult>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut inboxes = Vec::with_capacity(self.worker_count);
        let mut outboxes = Vec::with_capacity(self.worker_count);
        let mut workers = Vec::with_capacity(self.worker_count);

        for id in 0..self.worker_count {
            let (inbox_tx, inbox_rx) = unbounded();
            let (outbox_tx, outbox_rx) = unbounded();
            let worker = Worker::new(
                id,
                inbox_rx,
                outbox_tx,
                self.validate_operations,
                self.logger.new(o!("worker" => id)),
            );
            let handle = thread::Builder::new()
                .name(format!("arith-worker-{}", id))
                .spawn(move || worker.run())?;

            inboxes.push(inbox_tx);
            outboxes.push(outbox_rx);
            workers.push(handle);
        }

        let (sink_tx, sink_rx) = unbounded();
        let collector = Collector::new(outboxes, sink_tx, self.logger.clone());
        let collector = thread::Builder::new()
            .name("arith-collector".to_owned())
            .spawn(move || collector.run())?;

        let mut sent = 0;
        for expression in expressions {
            let worker_id = sent % self.worker_count;
            let item = WorkItem {
                sequence_number: sent,
                expression: expression.into(),
            };
            inboxes[worker_id]
                .send(Envelope::Payload(item))
                .map_err(|_| ArithError::WorkerLost { worker_id })?;
            sent += 1;
        }

        for (worker_id, inbox) in inboxes.iter().enumerate() {
            inbox
                .send(Envelope::Signal(ControlSignal::Stop))
                .map_err(|_| ArithError::WorkerLost { worker_id })?;
            debug!(self.logger, "  -> stopping ... {}", worker_id);
        }

        let mut results = Vec::with_capacity(sent);
        while results.len() != sent {
            match sink_rx.recv() {
                Ok(result) => results.push(result),
                Err(_) => break,
            }
        }

        join("collector", collector)??;
        for (worker_id, handle) in workers.into_iter().enumerate() {
            let processed = join("worker", handle)?;
            debug!(self.logger, "worker {} processed {} operations", worker_id, processed);
        }

        if results.len() != sent {
            return Err(ArithError::MissingResults {
                expected: sent,
                received: results.len(),
            });
        }

        info!(
            self.logger,
            " * work done: operations returned {} - operations sent {}",
            results.len(),
            sent
        );

        Ok(results)
    }
}

fn join<T>(name: &str, handle: JoinHandle<T>) -> Result<T> {
    handle
        .join()
        .map_err(|_| ArithError::ThreadPanicked(name.to_owned()))
}
