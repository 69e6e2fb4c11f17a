//! 该模块提供服务端处理连接用的线程池

use crate::Result;

use slog::Logger;

/// 线程池抽象接口
///
/// 服务端把每个连接交给线程池处理，不同实现提供各自的调度策略。
pub trait ThreadPool {
    /// 创建新的线程池实例
    ///
    /// # 参数
    /// * `threads`: 线程池中的线程数量，必须为正数
    /// * `logger`: 线程池内部错误的日志输出
    ///
    /// # 返回
    /// * `Result<Self>`: 线程数为 0 或线程创建失败时返回错误
    fn new(threads: u32, logger: &Logger) -> Result<Self>
    where
        Self: Sized;

    /// 向线程池提交任务
    ///
    /// 任务执行时 panic 不会影响线程池运行。线程池已关闭时返回错误。
    fn spawn<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static;
}

mod rayon;
mod shared_queue;

pub use self::rayon::RayonThreadPool;
pub use self::shared_queue::SharedQueueThreadPool;
