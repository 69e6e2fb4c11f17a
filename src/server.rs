use crate::config::ServerConfig;
use crate::error::Result;
use crate::frame::{read_frame, write_frame};
use crate::input::{decode_payload, split_expressions};
use crate::pool::ArithmeticPool;
use crate::thread_pool::ThreadPool;

use slog::Logger;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Arc;

/// 算术服务器
///
/// 每个连接发送一批表达式，服务器返回全部结果后关闭连接。
pub struct ArithServer<P: ThreadPool> {
    config: Arc<ServerConfig>,
    pool: P,
    logger: Logger,
}

impl<P: ThreadPool> ArithServer<P> {
    /// 根据配置与处理连接的线程池生成一个服务器
    pub fn new(config: ServerConfig, pool: P, logger: &Logger) -> Self {
        ArithServer {
            config: Arc::new(config),
            pool,
            logger: logger.clone(),
        }
    }

    /// 监听配置中的地址并运行服务器
    pub fn run(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.addr)?;
        self.serve(listener)
    }

    /// 在给定的 listener 上接受连接，永不返回，除非线程池关闭
    pub fn serve(self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!(self.logger, "  *** server running [ {} ] ***", local_addr);

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let client_addr = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "unknown".to_owned());
                    info!(self.logger, "connection accepted {}", client_addr);
                    let connection_log = self.logger.new(o!("client addr" => client_addr));
                    let processor =
                        Processor::new(Arc::clone(&self.config), connection_log.clone());
                    self.pool.spawn(move || {
                        if let Err(e) = processor.do_job(stream) {
                            error!(connection_log, "Error on serving client: {}", e);
                        }
                    })?;
                }
                Err(e) => error!(self.logger, "Connection failed: {}", e),
            }
        }

        Ok(())
    }
}

/// 处理单个连接：读取一帧表达式，求值，写回一帧结果
pub(crate) struct Processor {
    config: Arc<ServerConfig>,
    logger: Logger,
}

impl Processor {
    pub(crate) fn new(config: Arc<ServerConfig>, logger: Logger) -> Self {
        Processor { config, logger }
    }

    pub(crate) fn do_job<S: Read + Write>(&self, mut stream: S) -> Result<()> {
        info!(self.logger, " * working ...");
        let data = read_frame(&mut stream, self.config.block_size, &self.logger)?;
        info!(self.logger, " *** end of reading ***");

        let response = self.respond(data)?;

        info!(self.logger, " * server responding ...");
        write_frame(&mut stream, response.as_bytes())?;
        info!(self.logger, " * end processor ...");
        Ok(())
    }

    fn respond(&self, data: Vec<u8>) -> Result<String> {
        let (format, text) = decode_payload(data)?;
        info!(self.logger, " * data format found: {}", format);

        let expressions = split_expressions(&text);
        let workers = self.config.worker_count(expressions.len());
        debug!(self.logger, " * number of calculated children: {}", workers);

        let pool = ArithmeticPool::new(workers, self.config.validate_operations, &self.logger)?;
        let results = pool.pool_processor(expressions)?;

        Ok(results
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
