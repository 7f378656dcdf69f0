//! 异步叶子命令子系统（io）
//!
//! 框架本身不感知异步；这里的叶子命令把平台异步操作（tokio）交给同线程执行器运行，
//! 并在同一逻辑线程上调用完成原语，使组合命令照常以完成通知驱动：
//! - `IoContext`：基于 `tokio::task::LocalSet` 的同线程执行器；
//! - `completion`：命令完成时就绪的一次性 future；
//! - `ReadFileCommand` / `WriteFileCommand`：磁盘读写，失败通过 `ReportsOutcome` 报告；
//! - `DelayCommand`：可取消的定时叶子，可用于在外部组合超时。
//!
pub mod completion;
pub mod context;
pub mod delay;
pub mod read;
pub mod write;

pub use completion::completion;
pub use context::IoContext;
pub use delay::DelayCommand;
pub use read::ReadFileCommand;
pub use write::{WriteFileCommand, WriteRequest};
