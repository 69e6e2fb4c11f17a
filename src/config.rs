//! 服务端与客户端的配置

use crate::Result;

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// 默认监听地址
pub const DEFAULT_ADDRESS: SocketAddr =
    SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 12345);

/// 服务端配置
///
/// 可以从 JSON 文件加载，缺少的字段取默认值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听地址
    pub addr: SocketAddr,
    /// 同时处理的连接数
    pub no_sockets: u32,
    /// 每次从 socket 读取的字节数
    pub block_size: usize,
    /// 每个 worker 负责的表达式数量
    pub messages_per_child: usize,
    /// 求值前是否校验表达式
    pub validate_operations: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: DEFAULT_ADDRESS,
            no_sockets: 5,
            block_size: 1024 * 2,
            messages_per_child: 1000,
            validate_operations: true,
        }
    }
}

impl ServerConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// 根据表达式数量计算 worker 数
    ///
    /// 取 `lines / messages_per_child` 与 CPU 数三倍中的较小者，至少为 1。
    pub fn worker_count(&self, lines: usize) -> u32 {
        let by_volume = lines / self.messages_per_child.max(1);
        let cap = num_cpus::get() * 3;
        by_volume.min(cap).max(1) as u32
    }
}

/// 客户端配置
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// 连接尝试次数
    pub attempts: u32,
    /// 第 n 次尝试前等待 `(n - 1) * retry_step`
    pub retry_step: Duration,
    /// 每次从 socket 读取的字节数
    pub block_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            attempts: 3,
            retry_step: Duration::from_secs(2),
            block_size: 4096,
        }
    }
}
