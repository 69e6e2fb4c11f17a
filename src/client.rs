use crate::config::ClientConfig;
use crate::error::{ArithError, Result};
use crate::frame::{read_frame, write_frame};

use slog::Logger;
use std::io::{BufReader, BufWriter};
use std::net::{SocketAddr, TcpStream};
use std::thread;

/// 算术服务客户端
///
/// 服务器每个连接只处理一批表达式，所以 [`ArithClient::request`] 会消耗客户端。
pub struct ArithClient {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    block_size: usize,
    logger: Logger,
}

impl ArithClient {
    /// 连接给定addr，失败时按配置重试
    ///
    /// 第 n 次尝试前等待 `(n - 1) * retry_step`，全部失败时返回最后一次的错误。
    pub fn connect(addr: SocketAddr, config: &ClientConfig, logger: &Logger) -> Result<Self> {
        let mut last_error = None;

        for attempt in 1..=config.attempts.max(1) {
            thread::sleep(config.retry_step * (attempt - 1));
            info!(logger, "creating socket and connecting ... try #{}", attempt);

            match TcpStream::connect(addr) {
                Ok(reader) => {
                    info!(logger, "socket connected to {}", addr);
                    let writer = reader.try_clone()?;
                    return Ok(ArithClient {
                        reader: BufReader::new(reader),
                        writer: BufWriter::new(writer),
                        block_size: config.block_size,
                        logger: logger.new(o!("server addr" => addr.to_string())),
                    });
                }
                Err(e) => {
                    crit!(logger, "{}", e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.map_or_else(
            || ArithError::StringError(format!("could not connect to {}", addr)),
            ArithError::Io,
        ))
    }

    /// 发送一帧负载（文本或 zip）并读取服务器的一帧响应
    pub fn request(mut self, payload: &[u8]) -> Result<Vec<u8>> {
        info!(self.logger, "sending data ...");
        write_frame(&mut self.writer, payload)?;
        info!(self.logger, "data sent");

        info!(self.logger, "reading socket ...");
        let response = read_frame(&mut self.reader, self.block_size, &self.logger)?;
        info!(self.logger, " *** end of reading ***");
        Ok(response)
    }
}
