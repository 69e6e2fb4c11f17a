use super::{ControlSignal, Envelope, WorkResult};
use crate::{ArithError, Result};

use crossbeam_channel::{Receiver, Select, Sender};
use slog::Logger;

/// 汇总所有 worker 输出的任务，是结果通道唯一的写入者
pub(crate) struct Collector {
    outboxes: Vec<Receiver<Envelope<WorkResult>>>,
    sink: Sender<WorkResult>,
    logger: Logger,
}

impl Collector {
    pub(crate) fn new(
        outboxes: Vec<Receiver<Envelope<WorkResult>>>,
        sink: Sender<WorkResult>,
        logger: Logger,
    ) -> Self {
        Collector {
            outboxes,
            sink,
            logger,
        }
    }

    /// 等待所有 worker 的输出，收齐全部 `Ack` 后返回转发的结果数
    pub(crate) fn run(self) -> Result<usize> {
        let mut select = Select::new();
        for outbox in &self.outboxes {
            select.recv(outbox);
        }

        let mut running = self.outboxes.len();
        let mut collected = 0;

        while running > 0 {
            let operation = select.select();
            let worker_id = operation.index();

            match operation.recv(&self.outboxes[worker_id]) {
                Ok(Envelope::Payload(result)) => {
                    debug!(self.logger, "{}", result);
                    if self.sink.send(result).is_err() {
                        return Err(ArithError::StringError(
                            "result receiver dropped before collection finished".to_owned(),
                        ));
                    }
                    collected += 1;
                }
                Ok(Envelope::Signal(ControlSignal::Ack)) => {
                    running -= 1;
                    select.remove(worker_id);
                    debug!(
                        self.logger,
                        "process {} stopping , left running:{}", worker_id, running
                    );
                }
                Ok(Envelope::Signal(ControlSignal::Stop)) => {
                    warn!(self.logger, "unexpected stop sent by worker {}", worker_id);
                }
                Err(_) => {
                    error!(
                        self.logger,
                        "worker {} disconnected without acknowledging stop", worker_id
                    );
                    return Err(ArithError::WorkerLost { worker_id });
                }
            }
        }

        Ok(collected)
    }
}
