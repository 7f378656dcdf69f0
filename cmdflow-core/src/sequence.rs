//! 顺序命令（Sequential Command）
//!
//! 以游标逐个执行子命令：当前子命令的完成通知到达后才推进游标并执行下一个；
//! 游标越过最后一个子命令时自身完成（无子命令时立即完成）。
//!
//! 同步完成的子命令不会递归地启动下一个：推进在 `drive` 的循环内进行，
//! 调用栈深度与子命令数量无关。
//!
use crate::collection::{ChildCollection, CollectionCommand, ensure_unstarted};
use crate::command::{Command, CommandBase, CommandCompletion, CommandCore, CommandExt, CommandRef};
use crate::error::{CommandError, CommandResult};
use crate::state::CommandState;
use cmdflow_macros::command;
use std::cell::Cell;
use std::rc::{Rc, Weak};

#[command]
pub struct SequenceCommand {
    this: Weak<SequenceCommand>,
    children: ChildCollection,
    cursor: Cell<usize>,
    // `drive` 正在栈上
    driving: Cell<bool>,
    // 当前子命令已在 `drive` 内同步完成
    child_done: Cell<bool>,
}

impl SequenceCommand {
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            core: CommandCore::new(),
            this: this.clone(),
            children: ChildCollection::new(),
            cursor: Cell::new(0),
            driving: Cell::new(false),
            child_done: Cell::new(false),
        })
    }

    pub fn with_children<I>(children: I) -> CommandResult<Rc<Self>>
    where
        I: IntoIterator<Item = CommandRef>,
    {
        let seq = Self::new();
        seq.add_children(children)?;
        Ok(seq)
    }

    /// 在 `index` 处插入子命令；仅在启动前允许
    pub fn insert_child(&self, index: usize, child: CommandRef) -> CommandResult<&Self> {
        self.insert_children(index, [child])
    }

    pub fn insert_children<I>(&self, index: usize, children: I) -> CommandResult<&Self>
    where
        I: IntoIterator<Item = CommandRef>,
    {
        ensure_unstarted(self, "insert children")?;
        self.children
            .insert_all(index, children.into_iter().collect())
            .map_err(|len| {
                CommandError::invalid_state(
                    self.name(),
                    format!("insert index {index} out of range (len {len})"),
                )
            })?;
        Ok(self)
    }

    /// 当前游标（正在执行或下一个将执行的子命令下标）
    pub fn cursor(&self) -> usize {
        self.cursor.get()
    }

    fn execute_current(&self) -> CommandResult<()> {
        self.driving.set(true);
        let result = self.drive();
        self.driving.set(false);
        result
    }

    fn drive(&self) -> CommandResult<()> {
        loop {
            let index = self.cursor.get();
            let Some(child) = self.children.get(index) else {
                tracing::debug!(command = self.name(), id = %self.id(), children = index, "sequence finished");
                return self.complete_command();
            };

            tracing::debug!(command = self.name(), id = %self.id(), index, child = child.name(), "sequence advancing");

            self.child_done.set(false);
            let this = self.this.clone();
            child.try_on_completed(move || match this.upgrade() {
                Some(seq) => seq.child_completed(),
                None => Ok(()),
            })?;
            child.execute()?;

            // 子命令仍在运行：等待其完成通知
            if !self.child_done.get() {
                return Ok(());
            }
            if self.is_disposed() || self.state() != CommandState::Executing {
                return Ok(());
            }
            self.cursor.set(index + 1);
        }
    }

    fn child_completed(&self) -> CommandResult<()> {
        // 中途被释放：不再推进
        if self.is_disposed() || self.state() != CommandState::Executing {
            return Ok(());
        }
        if self.driving.get() {
            self.child_done.set(true);
            return Ok(());
        }
        self.cursor.set(self.cursor.get() + 1);
        self.execute_current()
    }
}

impl CollectionCommand for SequenceCommand {
    fn collection(&self) -> &ChildCollection {
        &self.children
    }
}

impl Command for SequenceCommand {
    fn execute_command(&self) -> CommandResult<()> {
        self.cursor.set(0);
        self.execute_current()
    }

    fn dispose_command(&self) {
        let disposed = self.children.dispose_all();
        tracing::trace!(command = self.name(), id = %self.id(), disposed, "children disposed");
    }

    fn children(&self) -> Vec<CommandRef> {
        self.children.snapshot()
    }
}
