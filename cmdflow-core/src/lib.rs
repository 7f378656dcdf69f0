//! 命令执行框架核心库（cmdflow-core）
//!
//! 以“命令”为单位描述一次性的工作，并通过完成通知把命令组合成更大的工作流：
//! - 基础命令（`command`）：`Initialized → Executing → Completed` 状态机、完成/释放通知；
//! - 可取消命令（`cancelable`）：协作式取消；
//! - 组合命令：顺序（`sequence`）、并行（`parallel`）、缓冲队列（`buffer`）；
//! - 延迟构建（`jit`、`jit_init`）：在执行时刻才创建被包装的命令；
//! - 成功报告（`outcome`）与诊断快照（`inspect`）；
//! - 可选的异步叶子命令（`io`，默认开启）：基于 tokio 的文件读写与延时。
//!
//! 整个命令图运行在单一逻辑线程上：句柄是 `Rc`，内部状态是 `Cell`/`RefCell`，
//! 所有通知都在调用完成原语的线程上同步派发。
//!
//! 典型用法：
//! 1. 用 `#[command]` 宏声明命令结构体并实现 `Command::execute_command`；
//! 2. 用 `SequenceCommand`/`ParallelCommand` 等组合子命令；
//! 3. 调用 `execute`，并通过 `on_completed` 观察完成。
//!
pub mod action;
pub mod buffer;
pub mod cancelable;
pub mod collection;
pub mod command;
pub mod error;
pub mod inspect;
#[cfg(feature = "io")]
pub mod io;
pub mod jit;
pub mod jit_init;
pub mod observer;
pub mod outcome;
pub mod parallel;
pub mod sequence;
pub mod state;

#[cfg(test)]
mod testing;

pub use cmdflow_macros::command;

pub mod prelude {
    pub use crate::action::ActionCommand;
    pub use crate::buffer::BufferCommand;
    pub use crate::cancelable::{Cancelable, CancelableExt, CancelableRef};
    pub use crate::collection::{ChildCollection, CollectionCommand};
    pub use crate::command::{Command, CommandBase, CommandCore, CommandExt, CommandRef};
    pub use crate::error::{CommandError, CommandResult};
    pub use crate::inspect::CommandSnapshot;
    pub use crate::jit::JitCommand;
    pub use crate::jit_init::JitInit;
    pub use crate::observer::Subscription;
    pub use crate::outcome::{CommandFailure, ReportsOutcome};
    pub use crate::parallel::ParallelCommand;
    pub use crate::sequence::SequenceCommand;
    pub use crate::state::{CommandId, CommandState};
}

// 允许在本 crate 内部通过 ::cmdflow_core 进行自引用，
// 以便 `#[command]` 展开后的路径在本 crate 内同样可以解析。
extern crate self as cmdflow_core;
