//! 命令状态与标识
//!
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;

/// 命令的有限状态
///
/// 状态严格单调：`None → Initialized → Executing → Completed`。
/// `None` 只用于尚未构造出具体实例的 JIT 命令。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CommandState {
    None,
    #[default]
    Initialized,
    Executing,
    Completed,
}

/// 进程内唯一的命令标识，用于日志与诊断
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommandId(u64);

thread_local! {
    static NEXT_ID: Cell<u64> = const { Cell::new(1) };
}

impl CommandId {
    /// 分配下一个标识（命令图只在单线程内使用，线程局部计数即可）
    pub(crate) fn next() -> Self {
        NEXT_ID.with(|n| {
            let id = n.get();
            n.set(id + 1);
            Self(id)
        })
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
