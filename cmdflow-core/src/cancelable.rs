//! 可取消命令（Cancelable Command）
//!
//! 协作式取消：`cancel` 只设置标记，并在命令运行中时调用实现方的 `cancel_command` 钩子。
//! - 执行前取消：推迟到 `execute`，届时跳过工作入口直接完成；
//! - 执行中取消：钩子必须最终调用 `complete_command`，否则命令将停留在 `Executing`；
//! - 已取消或已完成：再次取消不产生任何效果。
//!
use crate::command::{Command, CommandExt};
use crate::error::CommandResult;
use crate::state::CommandState;
use std::rc::Rc;

/// 可取消命令的实现方行为
pub trait Cancelable: Command {
    /// 取消钩子：仅在 `Executing` 时被调用一次，必须（同步或稍后）完成命令
    fn cancel_command(&self) -> CommandResult<()>;
}

/// 可取消命令的统一句柄
pub type CancelableRef = Rc<dyn Cancelable>;

/// 面向调用方的取消操作
pub trait CancelableExt: Cancelable {
    fn was_cancelled(&self) -> bool {
        self.core().was_cancelled()
    }

    fn cancel(&self) -> CommandResult<()> {
        let core = self.core();
        if core.was_cancelled() || core.state() == CommandState::Completed {
            return Ok(());
        }

        core.mark_cancelled();
        tracing::debug!(command = self.name(), id = %core.id(), state = ?core.state(), "cancel requested");

        match self.state() {
            CommandState::Executing => self.cancel_command(),
            _ => Ok(()),
        }
    }
}

impl<C: Cancelable + ?Sized> CancelableExt for C {}
