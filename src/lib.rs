#![deny(missing_docs)]
//! 一个并发求值算术表达式的服务。
//!
//! 客户端通过 TCP 发送以换行分隔的表达式，服务端把它们轮询分发给固定数量的
//! worker 线程求值，再把每条表达式的结果发回。

pub use client::ArithClient;
pub use config::{ClientConfig, ServerConfig};
pub use error::{ArithError, Result};
pub use operator::{evaluate, validate, validate_and_operate, Answer, EvalError, ValidationResult};
pub use pool::{ArithmeticPool, ControlSignal, Outcome, WorkItem, WorkResult};
pub use server::ArithServer;

#[macro_use]
extern crate slog;
extern crate slog_async;
extern crate slog_term;

mod client;
pub mod config;
mod error;
pub mod frame;
pub mod input;
pub mod logging;
pub mod operator;
pub mod pool;
mod server;
pub mod thread_pool;
