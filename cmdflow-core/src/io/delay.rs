//! 可取消的定时叶子命令
//!
use crate::cancelable::Cancelable;
use crate::command::{Command, CommandBase, CommandCompletion, CommandCore, CommandExt};
use crate::error::CommandResult;
use crate::io::context::{IoContext, TaskSlot};
use crate::state::CommandState;
use cmdflow_macros::command;
use std::cell::Cell;
use std::rc::{Rc, Weak};
use std::time::Duration;

/// 等待给定时长后完成；取消时立即完成并中止计时
///
/// 超时通过组合表达：在延时命令的完成通知里取消目标命令。
#[command(name = "Delay")]
pub struct DelayCommand {
    this: Weak<DelayCommand>,
    ctx: IoContext,
    duration: Duration,
    task: TaskSlot,
    elapsed: Cell<bool>,
}

impl DelayCommand {
    pub fn new(ctx: &IoContext, duration: Duration) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            core: CommandCore::new(),
            this: this.clone(),
            ctx: ctx.clone(),
            duration,
            task: TaskSlot::default(),
            elapsed: Cell::new(false),
        })
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// 是否因计时结束而完成（而非被取消）
    pub fn elapsed(&self) -> bool {
        self.elapsed.get()
    }

    fn fire(&self) {
        self.task.clear();
        if self.is_disposed() || self.state() != CommandState::Executing {
            return;
        }
        self.elapsed.set(true);
        if let Err(err) = self.complete_command() {
            tracing::warn!(command = self.name(), id = %self.id(), error = %err, "completion observer failed");
        }
    }
}

impl Command for DelayCommand {
    fn execute_command(&self) -> CommandResult<()> {
        let this = self.this.clone();
        let duration = self.duration;
        let handle = self.ctx.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(cmd) = this.upgrade() {
                cmd.fire();
            }
        });
        self.task.set(handle);
        Ok(())
    }

    fn dispose_command(&self) {
        self.task.abort();
    }
}

impl Cancelable for DelayCommand {
    fn cancel_command(&self) -> CommandResult<()> {
        self.task.abort();
        self.complete_command()
    }
}
