//! 读文件叶子命令
//!
use crate::command::{Command, CommandBase, CommandCompletion, CommandCore, CommandExt};
use crate::error::CommandResult;
use crate::io::context::{IoContext, TaskSlot};
use crate::outcome::{CommandFailure, ReportsOutcome};
use crate::state::CommandState;
use cmdflow_macros::command;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

/// 读取整个文件
///
/// I/O 失败不会作为错误返回：命令照常完成，失败通过 `ReportsOutcome` 报告。
/// 读取结果在命令释放后仍然可用，供后续的 JIT 工厂取用。
#[command(name = "ReadFile")]
pub struct ReadFileCommand {
    this: Weak<ReadFileCommand>,
    ctx: IoContext,
    path: PathBuf,
    task: TaskSlot,
    contents: RefCell<Option<Vec<u8>>>,
    failure: RefCell<Option<CommandFailure>>,
}

impl ReadFileCommand {
    pub fn new(ctx: &IoContext, path: impl Into<PathBuf>) -> Rc<Self> {
        let path = path.into();
        Rc::new_cyclic(|this| Self {
            core: CommandCore::new(),
            this: this.clone(),
            ctx: ctx.clone(),
            path,
            task: TaskSlot::default(),
            contents: RefCell::new(None),
            failure: RefCell::new(None),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.contents.borrow().clone()
    }

    /// 取走读取结果
    pub fn take_contents(&self) -> Option<Vec<u8>> {
        self.contents.borrow_mut().take()
    }

    /// 以 UTF-8 解释读取结果；非法编码时返回 `None`
    pub fn text(&self) -> Option<String> {
        self.contents
            .borrow()
            .as_ref()
            .and_then(|bytes| String::from_utf8(bytes.clone()).ok())
    }

    fn finish(&self, result: std::io::Result<Vec<u8>>) {
        self.task.clear();
        if self.is_disposed() || self.state() != CommandState::Executing {
            return;
        }

        match result {
            Ok(bytes) => {
                tracing::debug!(command = self.name(), id = %self.id(), path = %self.path.display(), bytes = bytes.len(), "file read");
                *self.contents.borrow_mut() = Some(bytes);
            }
            Err(err) => {
                tracing::warn!(command = self.name(), id = %self.id(), path = %self.path.display(), error = %err, "file read failed");
                *self.failure.borrow_mut() = Some(CommandFailure::new(format!(
                    "read {}: {err}",
                    self.path.display()
                )));
            }
        }

        if let Err(err) = self.complete_command() {
            tracing::warn!(command = self.name(), id = %self.id(), error = %err, "completion observer failed");
        }
    }
}

impl Command for ReadFileCommand {
    fn execute_command(&self) -> CommandResult<()> {
        let this = self.this.clone();
        let path = self.path.clone();
        let handle = self.ctx.spawn(async move {
            let result = tokio::fs::read(&path).await;
            if let Some(cmd) = this.upgrade() {
                cmd.finish(result);
            }
        });
        self.task.set(handle);
        Ok(())
    }

    fn dispose_command(&self) {
        self.task.abort();
    }
}

impl ReportsOutcome for ReadFileCommand {
    fn failure(&self) -> Option<CommandFailure> {
        self.failure.borrow().clone()
    }
}
