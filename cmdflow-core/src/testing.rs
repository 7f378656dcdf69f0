//! 单元测试共用的叶子命令与执行日志
//!
use crate::cancelable::Cancelable;
use crate::command::{Command, CommandCompletion, CommandCore, CommandExt};
use crate::error::CommandResult;
use cmdflow_macros::command;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// 记录命令执行/完成/释放顺序的共享日志
#[derive(Clone, Default)]
pub(crate) struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    pub(crate) fn record(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub(crate) fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }
}

/// 执行后等待外部调用 `finish` 才完成
#[command]
pub(crate) struct ManualCommand {
    label: &'static str,
    journal: Journal,
    executions: Cell<usize>,
}

impl ManualCommand {
    pub(crate) fn new(label: &'static str, journal: &Journal) -> Rc<Self> {
        Rc::new(Self {
            core: CommandCore::new(),
            label,
            journal: journal.clone(),
            executions: Cell::new(0),
        })
    }

    pub(crate) fn finish(&self) -> CommandResult<()> {
        self.journal.record(format!("done:{}", self.label));
        self.complete_command()
    }

    pub(crate) fn executions(&self) -> usize {
        self.executions.get()
    }
}

impl Command for ManualCommand {
    fn execute_command(&self) -> CommandResult<()> {
        self.executions.set(self.executions.get() + 1);
        self.journal.record(format!("exec:{}", self.label));
        Ok(())
    }

    fn dispose_command(&self) {
        self.journal.record(format!("dispose:{}", self.label));
    }
}

/// 在 `execute_command` 内同步完成
#[command]
pub(crate) struct ImmediateCommand {
    label: &'static str,
    journal: Journal,
}

impl ImmediateCommand {
    pub(crate) fn new(label: &'static str, journal: &Journal) -> Rc<Self> {
        Rc::new(Self {
            core: CommandCore::new(),
            label,
            journal: journal.clone(),
        })
    }
}

impl Command for ImmediateCommand {
    fn execute_command(&self) -> CommandResult<()> {
        self.journal.record(format!("exec:{}", self.label));
        self.complete_command()
    }

    fn dispose_command(&self) {
        self.journal.record(format!("dispose:{}", self.label));
    }
}

/// 可取消的手动命令；`complete_on_cancel` 控制取消钩子是否立即完成
#[command]
pub(crate) struct ManualCancelable {
    label: &'static str,
    journal: Journal,
    complete_on_cancel: bool,
    cancel_calls: Cell<usize>,
}

impl ManualCancelable {
    pub(crate) fn new(label: &'static str, journal: &Journal, complete_on_cancel: bool) -> Rc<Self> {
        Rc::new(Self {
            core: CommandCore::new(),
            label,
            journal: journal.clone(),
            complete_on_cancel,
            cancel_calls: Cell::new(0),
        })
    }

    pub(crate) fn cancel_calls(&self) -> usize {
        self.cancel_calls.get()
    }

    pub(crate) fn finish(&self) -> CommandResult<()> {
        self.complete_command()
    }
}

impl Command for ManualCancelable {
    fn execute_command(&self) -> CommandResult<()> {
        self.journal.record(format!("exec:{}", self.label));
        Ok(())
    }
}

impl Cancelable for ManualCancelable {
    fn cancel_command(&self) -> CommandResult<()> {
        self.cancel_calls.set(self.cancel_calls.get() + 1);
        self.journal.record(format!("cancel:{}", self.label));
        if self.complete_on_cancel {
            self.complete_command()
        } else {
            Ok(())
        }
    }
}
