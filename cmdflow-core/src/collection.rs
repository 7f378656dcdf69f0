//! 组合命令基础（Collection Command）
//!
//! 组合命令独占其子命令：
//! - 仅在自身处于 `Initialized` 时允许添加子命令；
//! - 自身释放时，释放集合中尚未释放的子命令（已在完成时自我释放的子命令会被跳过）。
//!
//! 执行顺序由具体组合（顺序/并行）决定。
//!
use crate::command::{Command, CommandExt, CommandRef};
use crate::error::{CommandError, CommandResult};
use crate::state::CommandState;
use std::cell::RefCell;

/// 有序的子命令集合
#[derive(Default)]
pub struct ChildCollection {
    items: RefCell<Vec<CommandRef>>,
}

impl ChildCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<CommandRef> {
        self.items.borrow().get(index).cloned()
    }

    /// 按当前顺序克隆子命令句柄
    pub fn snapshot(&self) -> Vec<CommandRef> {
        self.items.borrow().clone()
    }

    pub(crate) fn push(&self, child: CommandRef) {
        self.items.borrow_mut().push(child);
    }

    /// 在 `index` 处插入；越界时返回当前长度
    pub(crate) fn insert_all(&self, index: usize, children: Vec<CommandRef>) -> Result<(), usize> {
        let mut items = self.items.borrow_mut();
        if index > items.len() {
            return Err(items.len());
        }
        items.splice(index..index, children);
        Ok(())
    }

    /// 释放尚未释放的子命令，返回本次实际释放的数量
    pub(crate) fn dispose_all(&self) -> usize {
        // 先克隆再释放，避免子命令释放回调期间持有借用
        let children = self.snapshot();
        let mut disposed = 0;
        for child in children.iter().filter(|c| !c.is_disposed()) {
            child.dispose();
            disposed += 1;
        }
        disposed
    }
}

/// 拥有有序子命令集合的组合命令
pub trait CollectionCommand: Command {
    fn collection(&self) -> &ChildCollection;

    fn child_count(&self) -> usize {
        self.collection().len()
    }

    /// 追加子命令；返回自身以便链式调用
    fn add_child(&self, child: CommandRef) -> CommandResult<&Self>
    where
        Self: Sized,
    {
        ensure_unstarted(self, "add child")?;
        self.collection().push(child);
        Ok(self)
    }

    fn add_children<I>(&self, children: I) -> CommandResult<&Self>
    where
        Self: Sized,
        I: IntoIterator<Item = CommandRef>,
    {
        ensure_unstarted(self, "add children")?;
        for child in children {
            self.collection().push(child);
        }
        Ok(self)
    }
}

/// 组合结构只能在启动前修改
pub(crate) fn ensure_unstarted<C: Command + ?Sized>(command: &C, operation: &str) -> CommandResult<()> {
    if command.is_disposed() {
        return Err(CommandError::invalid_state(
            command.name(),
            format!("{operation} on a disposed command"),
        ));
    }
    let actual = command.state();
    if actual != CommandState::Initialized {
        return Err(CommandError::unexpected_state(
            command.name(),
            operation,
            CommandState::Initialized,
            actual,
        ));
    }
    Ok(())
}
