//! 写文件叶子命令
//!
use crate::command::{Command, CommandBase, CommandCompletion, CommandCore, CommandExt};
use crate::error::CommandResult;
use crate::io::context::{IoContext, TaskSlot};
use crate::outcome::{CommandFailure, ReportsOutcome};
use crate::state::CommandState;
use bon::Builder;
use cmdflow_macros::command;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::{Rc, Weak};
use tokio::io::AsyncWriteExt;

/// 写文件请求
#[derive(Clone, Debug, PartialEq, Eq, Builder, Serialize, Deserialize)]
pub struct WriteRequest {
    #[builder(into)]
    pub path: PathBuf,
    #[builder(into)]
    pub contents: Vec<u8>,
    /// 自动创建缺失的父目录
    #[builder(default)]
    #[serde(default)]
    pub create_parents: bool,
    /// 追加而非覆盖
    #[builder(default)]
    #[serde(default)]
    pub append: bool,
}

/// 按 `WriteRequest` 写入文件；I/O 失败通过 `ReportsOutcome` 报告
#[command(name = "WriteFile")]
pub struct WriteFileCommand {
    this: Weak<WriteFileCommand>,
    ctx: IoContext,
    request: WriteRequest,
    task: TaskSlot,
    written: Cell<Option<usize>>,
    failure: RefCell<Option<CommandFailure>>,
}

impl WriteFileCommand {
    pub fn new(ctx: &IoContext, request: WriteRequest) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            core: CommandCore::new(),
            this: this.clone(),
            ctx: ctx.clone(),
            request,
            task: TaskSlot::default(),
            written: Cell::new(None),
            failure: RefCell::new(None),
        })
    }

    pub fn request(&self) -> &WriteRequest {
        &self.request
    }

    /// 成功写入的字节数
    pub fn bytes_written(&self) -> Option<usize> {
        self.written.get()
    }

    fn finish(&self, result: std::io::Result<usize>) {
        self.task.clear();
        if self.is_disposed() || self.state() != CommandState::Executing {
            return;
        }

        let path = self.request.path.display();
        match result {
            Ok(n) => {
                tracing::debug!(command = self.name(), id = %self.id(), path = %path, bytes = n, "file written");
                self.written.set(Some(n));
            }
            Err(err) => {
                tracing::warn!(command = self.name(), id = %self.id(), path = %path, error = %err, "file write failed");
                *self.failure.borrow_mut() = Some(CommandFailure::new(format!("write {path}: {err}")));
            }
        }

        if let Err(err) = self.complete_command() {
            tracing::warn!(command = self.name(), id = %self.id(), error = %err, "completion observer failed");
        }
    }
}

async fn write_file(request: WriteRequest) -> std::io::Result<usize> {
    if request.create_parents {
        if let Some(parent) = request.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .append(request.append)
        .truncate(!request.append)
        .open(&request.path)
        .await?;
    file.write_all(&request.contents).await?;
    file.flush().await?;
    Ok(request.contents.len())
}

impl Command for WriteFileCommand {
    fn execute_command(&self) -> CommandResult<()> {
        let this = self.this.clone();
        let request = self.request.clone();
        let handle = self.ctx.spawn(async move {
            let result = write_file(request).await;
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

impl ReportsOutcome for WriteFileCommand {
    fn failure(&self) -> Option<CommandFailure> {
        self.failure.borrow().clone()
    }
}
