//! slog 日志初始化

use slog::{Discard, Drain, Level, Logger};

/// 创建输出到标准错误的根 logger
///
/// `verbose` 为 true 时输出 debug 级别日志，否则只输出 info 及以上。
pub fn root_logger(verbose: bool) -> Logger {
    let level = if verbose { Level::Debug } else { Level::Info };

    let decorator = slog_term::TermDecorator::new().stderr().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = drain.filter_level(level).fuse();

    Logger::root(drain, o!("version" => env!("CARGO_PKG_VERSION")))
}

/// 丢弃所有记录的 logger
pub fn discard() -> Logger {
    Logger::root(Discard, o!())
}
