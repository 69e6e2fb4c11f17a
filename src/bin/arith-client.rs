#[macro_use]
extern crate slog;

use arith::config::DEFAULT_ADDRESS;
use arith::{logging, ArithClient, ClientConfig, Result};
use clap::Parser;
use slog::Logger;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::exit;
use std::str::FromStr;

#[derive(Debug, Parser)]
#[command(name = "arith-client",
        version = env!("CARGO_PKG_VERSION"),
        author = env!("CARGO_PKG_AUTHORS"),
        about = env!("CARGO_PKG_DESCRIPTION"))]
struct Cli {
    /// 输出 debug 日志
    #[arg(long)]
    verbose: bool,

    /// 服务器地址
    #[arg(short, long, default_value_t = DEFAULT_ADDRESS, value_parser = addr_parser)]
    addr: SocketAddr,

    /// 表达式文件，纯文本或 zip
    #[arg(long)]
    input_file: PathBuf,

    /// 保存结果的文件
    #[arg(long)]
    output_file: PathBuf,

    /// 每次从 socket 读取的字节数
    #[arg(long, default_value_t = 4096)]
    block_size: usize,

    /// 连接尝试次数
    #[arg(long, default_value_t = 3)]
    attempts: u32,
}

fn addr_parser(s: &str) -> std::result::Result<SocketAddr, String> {
    match SocketAddr::from_str(s) {
        Ok(addr) => Ok(addr),
        Err(_) => Err(String::from("Invalid addr")),
    }
}

fn run(cli: Cli, logger: &Logger) -> Result<()> {
    info!(logger, "running ...");
    let payload = fs::read(&cli.input_file)?;

    let config = ClientConfig {
        attempts: cli.attempts,
        block_size: cli.block_size,
        ..ClientConfig::default()
    };
    let client = ArithClient::connect(cli.addr, &config, logger)?;
    let response = client.request(&payload)?;

    fs::write(&cli.output_file, response)?;
    info!(logger, "finished");
    Ok(())
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
