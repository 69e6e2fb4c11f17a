#[macro_use]
extern crate slog;

use arith::thread_pool::{RayonThreadPool, SharedQueueThreadPool, ThreadPool};
use arith::{logging, ArithServer, Result, ServerConfig};
use clap::{Parser, ValueEnum};
use slog::Logger;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::exit;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "arith-server",
        version = env!("CARGO_PKG_VERSION"),
        author = env!("CARGO_PKG_AUTHORS"),
        about = env!("CARGO_PKG_DESCRIPTION"))]
struct Cli {
    /// 输出 debug 日志
    #[arg(long)]
    verbose: bool,

    /// JSON 配置文件，命令行参数优先
    #[arg(long)]
    config: Option<PathBuf>,

    /// 监听地址
    #[arg(long, value_parser = addr_parser)]
    addr: Option<SocketAddr>,

    /// 同时处理的连接数
    #[arg(long)]
    no_sockets: Option<u32>,

    /// 每次从 socket 读取的字节数
    #[arg(long)]
    block_size: Option<usize>,

    /// 每个 worker 负责的表达式数量
    #[arg(long)]
    messages_per_child: Option<usize>,

    /// 跳过表达式校验
    #[arg(long)]
    no_validate: bool,

    /// 处理连接的线程池
    #[arg(long, value_enum, default_value_t = Pool::Shared)]
    pool: Pool,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum Pool {
    /// 共享队列线程池
    Shared,
    /// rayon线程池
    Rayon,
}

fn addr_parser(s: &str) -> std::result::Result<SocketAddr, String> {
    match SocketAddr::from_str(s) {
        Ok(addr) => Ok(addr),
        Err(_) => Err(String::from("Invalid addr")),
    }
}

fn load_config(cli: &Cli) -> Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };

    if let Some(addr) = cli.addr {
        config.addr = addr;
    }
    if let Some(no_sockets) = cli.no_sockets {
        config.no_sockets = no_sockets;
    }
    if let Some(block_size) = cli.block_size {
        config.block_size = block_size;
    }
    if let Some(messages_per_child) = cli.messages_per_child {
        config.messages_per_child = messages_per_child;
    }
    if cli.no_validate {
        config.validate_operations = false;
    }

    Ok(config)
}

fn run_with<P: ThreadPool>(config: ServerConfig, logger: &Logger) -> Result<()> {
    let pool = P::new(config.no_sockets, logger)?;
    ArithServer::new(config, pool, logger).run()
}

fn run(cli: Cli, logger: &Logger) -> Result<()> {
    let config = load_config(&cli)?;
    info!(logger, "arith-server {}", env!("CARGO_PKG_VERSION"));
    info!(logger, "Listening on {}", config.addr);
    info!(logger, "Connection pool: {:?}", cli.pool);

    match cli.pool {
        Pool::Shared => run_with::<SharedQueueThreadPool>(config, logger),
        Pool::Rayon => run_with::<RayonThreadPool>(config, logger),
    }
}

fn main() {
    let cli = Cli::parse();
    let logger = logging::root_logger(cli.verbose);

    if let Err(e) = run(cli, &logger) {
        error!(logger, "{}", e);
        // 让异步 drain 写完日志
        drop(logger);
        exit(1);
    }
}
