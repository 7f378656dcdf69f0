//! 同线程执行器
//!
use crate::command::{Command, CommandExt};
use crate::error::CommandResult;
use crate::io::completion::completion;
use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;
use tokio::task::{JoinHandle, LocalSet};

/// 叶子命令的异步执行上下文
///
/// 所有任务都在驱动 `run`/`run_until` 的线程上运行，完成原语因此总在命令图所在的线程上被调用。
#[derive(Clone)]
pub struct IoContext {
    local: Rc<LocalSet>,
}

impl Default for IoContext {
    fn default() -> Self {
        Self {
            local: Rc::new(LocalSet::new()),
        }
    }
}

impl IoContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 提交一个任务；任务在上下文被驱动时执行
    pub fn spawn<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + 'static,
    {
        self.local.spawn_local(task)
    }

    /// 驱动上下文直到 `future` 完成
    pub async fn run_until<F: Future>(&self, future: F) -> F::Output {
        self.local.run_until(future).await
    }

    /// 执行命令并等待其完成
    pub async fn run<C: Command + ?Sized>(&self, command: &C) -> CommandResult<()> {
        let done = completion(command)?;
        command.execute()?;
        self.run_until(done).await
    }
}

/// 叶子命令持有的后台任务槽：释放或取消时中止任务
#[derive(Default)]
pub(crate) struct TaskSlot {
    handle: RefCell<Option<JoinHandle<()>>>,
}

impl TaskSlot {
    pub(crate) fn set(&self, handle: JoinHandle<()>) {
        if let Some(previous) = self.handle.borrow_mut().replace(handle) {
            previous.abort();
        }
    }

    pub(crate) fn abort(&self) {
        if let Some(handle) = self.handle.borrow_mut().take() {
            handle.abort();
        }
    }

    pub(crate) fn clear(&self) {
        self.handle.borrow_mut().take();
    }
}
