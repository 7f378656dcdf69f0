//! 命令（Command）基础抽象
//!
//! 一个命令是只执行一次、完成后自我释放的工作单元：
//! - `execute`：要求处于 `Initialized`，转入 `Executing` 后调用实现方的 `execute_command`；
//! - `complete_command`：要求处于 `Executing`，转入 `Completed`，按注册顺序通知观察者，随后自我释放；
//! - `dispose`：幂等，调用实现方的 `dispose_command` 钩子并清空全部订阅。
//!
//! 所有操作都在调用方线程上同步进行，命令图通过 `Rc`/`Weak` 表达所有权，不跨线程共享。
//!
use crate::error::{CommandError, CommandResult};
use crate::observer::{Observers, Subscription};
use crate::state::{CommandId, CommandState};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

type CompletionObserver = Box<dyn FnOnce() -> CommandResult<()>>;
type DisposalObserver = Box<dyn FnOnce()>;

/// 异构子命令的统一句柄
pub type CommandRef = Rc<dyn Command>;

/// 命令内核：状态机、取消标记、释放标记与两类通知
///
/// 由 `#[command]` 宏注入到命令结构体的 `core` 字段。
pub struct CommandCore {
    id: CommandId,
    state: Cell<CommandState>,
    cancelled: Cell<bool>,
    disposing: Cell<bool>,
    disposed: Cell<bool>,
    // Buffer 之类永不完成的命令禁止订阅完成通知
    completable: bool,
    completed: RefCell<Observers<CompletionObserver>>,
    disposal: RefCell<Observers<DisposalObserver>>,
}

impl CommandCore {
    pub fn new() -> Self {
        Self::with_completion(true)
    }

    /// 创建不允许订阅完成通知的内核（永不完成的命令使用）
    pub fn never_completing() -> Self {
        Self::with_completion(false)
    }

    fn with_completion(completable: bool) -> Self {
        Self {
            id: CommandId::next(),
            state: Cell::new(CommandState::Initialized),
            cancelled: Cell::new(false),
            disposing: Cell::new(false),
            disposed: Cell::new(false),
            completable,
            completed: RefCell::new(Observers::default()),
            disposal: RefCell::new(Observers::default()),
        }
    }

    pub fn id(&self) -> CommandId {
        self.id
    }

    pub fn state(&self) -> CommandState {
        self.state.get()
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled.get()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    pub fn is_disposing(&self) -> bool {
        self.disposing.get()
    }

    pub fn is_completable(&self) -> bool {
        self.completable
    }

    pub(crate) fn mark_cancelled(&self) {
        self.cancelled.set(true);
    }

    fn completion_observers(&self) -> usize {
        self.completed.borrow().len()
    }
}

impl Default for CommandCore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CommandCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandCore")
            .field("id", &self.id)
            .field("state", &self.state.get())
            .field("cancelled", &self.cancelled.get())
            .field("disposed", &self.disposed.get())
            .field("completion_observers", &self.completion_observers())
            .finish()
    }
}

/// 访问命令内核与诊断名称（通常由 `#[command]` 宏实现）
pub trait CommandBase {
    fn core(&self) -> &CommandCore;

    fn name(&self) -> &'static str;
}

/// 命令实现方需要提供的行为
pub trait Command: CommandBase + 'static {
    /// 工作入口：由 `execute` 在进入 `Executing` 后调用。
    /// 实现方必须在工作结束时（同步或稍后）调用 `complete_command`。
    fn execute_command(&self) -> CommandResult<()>;

    /// 释放钩子：释放自身持有的资源（例如子命令）
    fn dispose_command(&self) {}

    /// 当前持有的子命令（用于诊断快照）
    fn children(&self) -> Vec<CommandRef> {
        Vec::new()
    }
}

/// 面向调用方的命令操作，对所有 `Command`（包括 `dyn Command`）自动可用
pub trait CommandExt: Command {
    fn id(&self) -> CommandId {
        self.core().id()
    }

    fn state(&self) -> CommandState {
        self.core().state()
    }

    fn is_disposed(&self) -> bool {
        self.core().is_disposed()
    }

    fn is_disposing(&self) -> bool {
        self.core().is_disposing()
    }

    /// 执行命令；每个实例只能执行一次
    fn execute(&self) -> CommandResult<()> {
        let core = self.core();
        if core.is_disposed() {
            return Err(CommandError::invalid_state(
                self.name(),
                "cannot execute a disposed command",
            ));
        }
        let actual = core.state();
        if actual != CommandState::Initialized {
            return Err(CommandError::unexpected_state(
                self.name(),
                "execute",
                CommandState::Initialized,
                actual,
            ));
        }

        core.state.set(CommandState::Executing);
        tracing::trace!(command = self.name(), id = %core.id(), "executing");

        // 执行前已取消：跳过工作入口，直接完成
        if core.was_cancelled() {
            tracing::debug!(command = self.name(), id = %core.id(), "cancelled before execution");
            return self.complete_command();
        }

        self.execute_command()
    }

    /// 释放命令；可重复调用
    fn dispose(&self) {
        let core = self.core();
        if core.is_disposing() || core.is_disposed() {
            return;
        }

        core.disposing.set(true);
        self.dispose_command();
        core.completed.borrow_mut().clear();
        core.disposed.set(true);
        core.disposing.set(false);
        tracing::trace!(command = self.name(), id = %core.id(), "disposed");

        let observers = core.disposal.borrow_mut().take();
        for observer in observers {
            observer();
        }
    }

    /// 订阅完成通知
    fn on_completed<F>(&self, observer: F) -> CommandResult<Subscription>
    where
        F: FnOnce() + 'static,
    {
        self.try_on_completed(move || {
            observer();
            Ok(())
        })
    }

    /// 订阅完成通知；观察者的错误会从 `complete_command` 返回
    fn try_on_completed<F>(&self, observer: F) -> CommandResult<Subscription>
    where
        F: FnOnce() -> CommandResult<()> + 'static,
    {
        let core = self.core();
        if !core.is_completable() {
            return Err(CommandError::UnsupportedOperation {
                command: self.name(),
                operation: "subscribe to completion",
            });
        }
        ensure_subscribable(self)?;
        Ok(core.completed.borrow_mut().add(Box::new(observer)))
    }

    fn remove_completed(&self, sub: Subscription) -> bool {
        self.core().completed.borrow_mut().remove(sub)
    }

    /// 订阅释放通知
    fn on_disposed<F>(&self, observer: F) -> CommandResult<Subscription>
    where
        F: FnOnce() + 'static,
    {
        ensure_subscribable(self)?;
        Ok(self.core().disposal.borrow_mut().add(Box::new(observer)))
    }

    fn remove_disposed(&self, sub: Subscription) -> bool {
        self.core().disposal.borrow_mut().remove(sub)
    }
}

impl<C: Command + ?Sized> CommandExt for C {}

/// 完成原语：仅供命令实现方在自身的 `execute_command`/`cancel_command`/异步回调中调用
///
/// 与面向调用方的 `CommandExt` 分开，外部编排代码只需导入后者。
/// 观察者返回的错误不会中断通知；全部观察者触发且命令释放后，返回第一个错误。
pub trait CommandCompletion: Command {
    fn complete_command(&self) -> CommandResult<()> {
        let core = self.core();
        let actual = core.state();
        if actual != CommandState::Executing {
            return Err(CommandError::unexpected_state(
                self.name(),
                "complete",
                CommandState::Executing,
                actual,
            ));
        }

        core.state.set(CommandState::Completed);
        tracing::trace!(command = self.name(), id = %core.id(), "completed");

        let observers = core.completed.borrow_mut().take();
        let mut first_err: Option<CommandError> = None;
        for observer in observers {
            if let Err(err) = observer() {
                match first_err {
                    None => first_err = Some(err),
                    Some(_) => {
                        tracing::warn!(command = self.name(), id = %core.id(), error = %err, "completion observer failed");
                    }
                }
            }
        }

        self.dispose();

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<C: Command + ?Sized> CommandCompletion for C {}

fn ensure_subscribable<C: Command + ?Sized>(command: &C) -> CommandResult<()> {
    let core = command.core();
    if core.is_disposed() || core.is_disposing() {
        return Err(CommandError::invalid_state(
            command.name(),
            "cannot subscribe to a disposed command",
        ));
    }
    if core.state() == CommandState::Completed {
        return Err(CommandError::invalid_state(
            command.name(),
            "cannot subscribe to a completed command",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Journal, ManualCommand};

    #[test]
    fn fresh_command_is_initialized() {
        let cmd = ManualCommand::new("a", &Journal::default());
        assert_eq!(cmd.state(), CommandState::Initialized);
        assert!(!cmd.is_disposed());
        assert!(!cmd.is_disposing());
    }

    #[test]
    fn execute_then_complete_fires_once_and_disposes() {
        let journal = Journal::default();
        let cmd = ManualCommand::new("a", &journal);
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        cmd.on_completed(move || f.set(f.get() + 1)).unwrap();

        cmd.execute().unwrap();
        assert_eq!(cmd.state(), CommandState::Executing);
        assert_eq!(fired.get(), 0);

        cmd.finish().unwrap();
        assert_eq!(cmd.state(), CommandState::Completed);
        assert_eq!(fired.get(), 1);
        assert!(cmd.is_disposed());

        // 再次完成：状态非法，且不会重复通知
        let err = cmd.complete_command().unwrap_err();
        assert!(matches!(err, CommandError::InvalidState { .. }));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn execute_twice_is_invalid_state() {
        let cmd = ManualCommand::new("a", &Journal::default());
        cmd.execute().unwrap();
        match cmd.execute().unwrap_err() {
            CommandError::InvalidState { command, reason } => {
                assert_eq!(command, "ManualCommand");
                assert!(reason.contains("Executing"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn complete_before_execute_is_invalid_state() {
        let cmd = ManualCommand::new("a", &Journal::default());
        assert!(matches!(
            cmd.complete_command(),
            Err(CommandError::InvalidState { .. })
        ));
        assert_eq!(cmd.state(), CommandState::Initialized);
    }

    #[test]
    fn observers_fire_in_registration_order() {
        let cmd = ManualCommand::new("a", &Journal::default());
        let order = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let order = order.clone();
            cmd.on_completed(move || order.borrow_mut().push(i)).unwrap();
        }
        cmd.execute().unwrap();
        cmd.finish().unwrap();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn removed_observer_is_not_notified() {
        let cmd = ManualCommand::new("a", &Journal::default());
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let sub = cmd.on_completed(move || f.set(true)).unwrap();
        assert!(cmd.remove_completed(sub));
        cmd.execute().unwrap();
        cmd.finish().unwrap();
        assert!(!fired.get());
    }

    #[test]
    fn dispose_is_idempotent_and_notifies_once() {
        let journal = Journal::default();
        let cmd = ManualCommand::new("a", &journal);
        let disposed = Rc::new(Cell::new(0));
        let d = disposed.clone();
        cmd.on_disposed(move || d.set(d.get() + 1)).unwrap();

        cmd.dispose();
        cmd.dispose();
        assert!(cmd.is_disposed());
        assert_eq!(disposed.get(), 1);
        assert_eq!(journal.entries(), vec!["dispose:a"]);
    }

    #[test]
    fn disposed_command_rejects_execute_and_subscriptions() {
        let cmd = ManualCommand::new("a", &Journal::default());
        cmd.dispose();
        assert!(matches!(cmd.execute(), Err(CommandError::InvalidState { .. })));
        assert!(matches!(
            cmd.on_completed(|| {}),
            Err(CommandError::InvalidState { .. })
        ));
    }

    #[test]
    fn observer_error_is_returned_after_all_observers_fire() {
        let cmd = ManualCommand::new("a", &Journal::default());
        let later = Rc::new(Cell::new(false));
        cmd.try_on_completed(|| {
            Err(CommandError::InvalidState {
                command: "observer",
                reason: "boom".into(),
            })
        })
        .unwrap();
        let l = later.clone();
        cmd.on_completed(move || l.set(true)).unwrap();

        cmd.execute().unwrap();
        let err = cmd.finish().unwrap_err();
        assert!(matches!(err, CommandError::InvalidState { command: "observer", .. }));
        assert!(later.get());
        assert!(cmd.is_disposed());
    }

    #[test]
    fn dispose_during_disposal_observer_is_ignored() {
        let cmd = ManualCommand::new("a", &Journal::default());
        let weak = Rc::downgrade(&cmd);
        cmd.on_disposed(move || {
            if let Some(cmd) = weak.upgrade() {
                cmd.dispose();
            }
        })
        .unwrap();
        cmd.dispose();
        assert!(cmd.is_disposed());
    }
}
