//! 命令框架统一错误定义
//!
//! 仅包含“结构性”错误：它们表示状态机被误用，应由调用方立即处理，框架内部从不吞掉。
//! 叶子命令的运行期失败（如 I/O 错误）不属于此处，见 [`CommandFailure`](crate::outcome::CommandFailure)。
//!
use crate::state::CommandState;
use thiserror::Error;

/// 统一错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CommandError {
    // --- 状态机 ---
    #[error("invalid state: command={command}, reason={reason}")]
    InvalidState {
        command: &'static str,
        reason: String,
    },

    // --- 构造 ---
    #[error("construction error: command={command}, reason={reason}")]
    Construction {
        command: &'static str,
        reason: String,
    },

    // --- 契约 ---
    #[error("unsupported operation: command={command}, operation={operation}")]
    UnsupportedOperation {
        command: &'static str,
        operation: &'static str,
    },

    #[error("command abandoned before completion: command={command}")]
    Abandoned { command: &'static str },
}

impl CommandError {
    pub(crate) fn invalid_state(command: &'static str, reason: impl Into<String>) -> Self {
        CommandError::InvalidState {
            command,
            reason: reason.into(),
        }
    }

    pub(crate) fn unexpected_state(
        command: &'static str,
        operation: &str,
        expected: CommandState,
        actual: CommandState,
    ) -> Self {
        CommandError::InvalidState {
            command,
            reason: format!("{operation} requires state {expected:?}, found {actual:?}"),
        }
    }
}

/// 统一 Result 类型别名
pub type CommandResult<T> = Result<T, CommandError>;
