use failure::Fail;
use std::io;
use std::string::FromUtf8Error;

/// arith 错误类型.
#[derive(Debug, Fail)]
pub enum ArithError {
    /// IO 错误.
    #[fail(display = "{}", _0)]
    Io(#[cause] io::Error),
    /// 配置文件序列化与反序列化错误.
    #[fail(display = "{}", _0)]
    Serde(#[cause] serde_json::Error),
    /// zip 压缩包解析错误.
    #[fail(display = "{}", _0)]
    Zip(#[cause] zip::result::ZipError),
    /// 输入不是合法的 UTF-8 文本.
    #[fail(display = "{}", _0)]
    Utf8(#[cause] FromUtf8Error),
    /// rayon 线程池创建失败.
    #[fail(display = "{}", _0)]
    ThreadPoolBuild(#[cause] rayon::ThreadPoolBuildError),
    /// 线程数或 worker 数为 0.
    #[fail(display = "Argument 'threads' must be positive")]
    InvalidWorkerCount,
    /// worker 在确认停止前断开了通道.
    #[fail(display = "worker {} stopped without acknowledging shutdown", worker_id)]
    WorkerLost {
        /// worker 编号
        worker_id: usize,
    },
    /// 线程发生 panic.
    #[fail(display = "{} thread panicked", _0)]
    ThreadPanicked(String),
    /// 收到的结果数与发出的表达式数不一致.
    #[fail(display = "expected {} results, received {}", expected, received)]
    MissingResults {
        /// 发出的表达式数
        expected: usize,
        /// 收到的结果数
        received: usize,
    },
    /// 对端在结束标记之前关闭了连接.
    #[fail(display = "connection closed before end sequence")]
    UnexpectedEof,
    /// 压缩包中没有文件.
    #[fail(display = "archive contains no members")]
    EmptyArchive,
    /// 线程池已关闭.
    #[fail(display = "thread pool is shut down")]
    PoolClosed,
    /// 其他错误信息.
    #[fail(display = "{}", _0)]
    StringError(String),
}

impl From<io::Error> for ArithError {
    fn from(err: io::Error) -> ArithError {
        ArithError::Io(err)
    }
}

impl From<serde_json::Error> for ArithError {
    fn from(err: serde_json::Error) -> ArithError {
        ArithError::Serde(err)
    }
}

impl From<zip::result::ZipError> for ArithError {
    fn from(err: zip::result::ZipError) -> ArithError {
        ArithError::Zip(err)
    }
}

impl From<FromUtf8Error> for ArithError {
    fn from(err: FromUtf8Error) -> ArithError {
        ArithError::Utf8(err)
    }
}

impl From<rayon::ThreadPoolBuildError> for ArithError {
    fn from(err: rayon::ThreadPoolBuildError) -> ArithError {
        ArithError::ThreadPoolBuild(err)
    }
}

/// arith 中的 Result 类型
pub type Result<T> = std::result::Result<T, ArithError>;
