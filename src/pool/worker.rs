use super::{ControlSignal, Envelope, Outcome, WorkItem, WorkResult};
use crate::operator::{evaluate, validate_and_operate, Answer};

use crossbeam_channel::{Receiver, Sender};
use slog::Logger;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerState {
    Idle,
    Processing,
    Stopped,
}

/// 求值池中的单个 worker，只通过自己的两条通道与池通信
pub(crate) struct Worker {
    id: usize,
    inbox: Receiver<Envelope<WorkItem>>,
    outbox: Sender<Envelope<WorkResult>>,
    validate_operations: bool,
    state: WorkerState,
    logger: Logger,
}

impl Worker {
    pub(crate) fn new(
        id: usize,
        inbox: Receiver<Envelope<WorkItem>>,
        outbox: Sender<Envelope<WorkResult>>,
        validate_operations: bool,
        logger: Logger,
    ) -> Self {
        Worker {
            id,
            inbox,
            outbox,
            validate_operations,
            state: WorkerState::Idle,
            logger,
        }
    }

    /// 循环处理消息直到收到 `Stop`，返回处理过的表达式数量
    ///
    /// 通道在 `Stop` 之前断开时直接退出，不发送 `Ack`。
    pub(crate) fn run(mut self) -> usize {
        let mut processed = 0;

        while self.state != WorkerState::Stopped {
            match self.inbox.recv() {
                Ok(Envelope::Payload(item)) => {
                    self.state = WorkerState::Processing;
                    let result = self.process(item);
                    debug!(self.logger, "{}", result);
                    if self.outbox.send(Envelope::Payload(result)).is_err() {
                        error!(self.logger, "collector is gone, dropping result");
                        self.state = WorkerState::Stopped;
                        continue;
                    }
                    processed += 1;
                    self.state = WorkerState::Idle;
                }
                Ok(Envelope::Signal(ControlSignal::Stop)) => {
                    if self.outbox.send(Envelope::Signal(ControlSignal::Ack)).is_err() {
                        error!(self.logger, "collector is gone, ack not delivered");
                    }
                    debug!(self.logger, "end sent {}", self.id);
                    self.state = WorkerState::Stopped;
                }
                Ok(Envelope::Signal(ControlSignal::Ack)) => {
                    warn!(self.logger, "unexpected ack received by worker {}", self.id);
                }
                Err(_) => {
                    warn!(self.logger, "inbox closed before stop signal");
                    self.state = WorkerState::Stopped;
                }
            }
        }

        processed
    }

    fn process(&self, item: WorkItem) -> WorkResult {
        let outcome = if self.validate_operations {
            validate_and_operate(&item.expression)
        } else {
            evaluate(&item.expression).map(Answer::Number)
        };

        WorkResult {
            worker_id: self.id,
            sequence_number: item.sequence_number,
            expression: item.expression,
            outcome: match outcome {
                Ok(answer) => Outcome::Answer(answer),
                Err(err) => Outcome::Error(err),
            },
        }
    }
}
