//! JIT 命令（Just-In-Time Command）
//!
//! 包装一个零参数工厂，直到 `execute` 时才构造被包装的命令，
//! 随后转发其完成通知以完成自身。这样可以使用只有在执行时刻才可用的数据。
//!
use crate::command::{Command, CommandBase, CommandCompletion, CommandCore, CommandExt, CommandRef};
use crate::error::{CommandError, CommandResult};
use crate::jit_init::JitInit;
use crate::state::CommandState;
use cmdflow_macros::command;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Factory = Box<dyn FnOnce() -> CommandResult<CommandRef>>;

#[command]
pub struct JitCommand {
    this: Weak<JitCommand>,
    factory: RefCell<Option<Factory>>,
    instance: RefCell<Option<CommandRef>>,
}

impl JitCommand {
    pub fn new<F>(factory: F) -> Rc<Self>
    where
        F: FnOnce() -> CommandRef + 'static,
    {
        Self::with_factory(Box::new(move || Ok(factory())))
    }

    /// 工厂缺失时构造失败
    pub fn try_new(factory: Option<Box<dyn FnOnce() -> CommandRef>>) -> CommandResult<Rc<Self>> {
        match factory {
            Some(factory) => Ok(Self::new(factory)),
            None => Err(CommandError::Construction {
                command: "JitCommand",
                reason: "factory is required".into(),
            }),
        }
    }

    /// 由 JIT-Init 构造：执行时以来源命令的结果构造后续命令
    pub fn from_init<T: Command + ?Sized>(init: JitInit<T>) -> Rc<Self> {
        Self::with_factory(Box::new(move || init.build()))
    }

    /// `from_init(JitInit::new(source, factory))` 的简写
    pub fn after<T, F>(source: Rc<T>, factory: F) -> Rc<Self>
    where
        T: Command + ?Sized,
        F: FnOnce(&T) -> CommandRef + 'static,
    {
        Self::from_init(JitInit::new(source, factory))
    }

    fn with_factory(factory: Factory) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            core: CommandCore::new(),
            this: this.clone(),
            factory: RefCell::new(Some(factory)),
            instance: RefCell::new(None),
        })
    }

    /// 已构造的实例（执行前为 `None`）
    pub fn instance(&self) -> Option<CommandRef> {
        self.instance.borrow().clone()
    }

    /// 被包装实例的状态；尚未构造时为 `CommandState::None`
    pub fn instance_state(&self) -> CommandState {
        self.instance
            .borrow()
            .as_ref()
            .map(|c| c.state())
            .unwrap_or(CommandState::None)
    }
}

impl Command for JitCommand {
    fn execute_command(&self) -> CommandResult<()> {
        let factory = self.factory.borrow_mut().take().ok_or_else(|| {
            CommandError::invalid_state(self.name(), "factory already consumed")
        })?;

        let instance = factory()?;
        tracing::debug!(command = self.name(), id = %self.id(), instance = instance.name(), "instance constructed");
        *self.instance.borrow_mut() = Some(instance.clone());

        let this = self.this.clone();
        instance.try_on_completed(move || match this.upgrade() {
            Some(jit) => jit.complete_command(),
            None => Ok(()),
        })?;
        instance.execute()
    }

    fn dispose_command(&self) {
        self.factory.borrow_mut().take();
        let instance = self.instance.borrow().clone();
        if let Some(instance) = instance {
            if !instance.is_disposed() {
                instance.dispose();
            }
        }
    }

    fn children(&self) -> Vec<CommandRef> {
        self.instance().into_iter().collect()
    }
}
