//! 并行命令（Parallel Command）
//!
//! 协作式并发：在调用方线程上依次对全部子命令调用 `execute`，
//! 以倒计数汇合所有完成通知，归零时自身完成。无子命令时在 `execute` 内同步完成。
//!
use crate::collection::{ChildCollection, CollectionCommand};
use crate::command::{Command, CommandBase, CommandCompletion, CommandCore, CommandExt, CommandRef};
use crate::error::CommandResult;
use crate::state::CommandState;
use cmdflow_macros::command;
use std::cell::Cell;
use std::rc::{Rc, Weak};

#[command]
pub struct ParallelCommand {
    this: Weak<ParallelCommand>,
    children: ChildCollection,
    remaining: Cell<usize>,
}

impl ParallelCommand {
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            core: CommandCore::new(),
            this: this.clone(),
            children: ChildCollection::new(),
            remaining: Cell::new(0),
        })
    }

    pub fn with_children<I>(children: I) -> CommandResult<Rc<Self>>
    where
        I: IntoIterator<Item = CommandRef>,
    {
        let par = Self::new();
        par.add_children(children)?;
        Ok(par)
    }

    /// 尚未完成的子命令数量
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }

    fn child_completed(&self) -> CommandResult<()> {
        if self.is_disposed() || self.state() != CommandState::Executing {
            return Ok(());
        }
        let left = self.remaining.get().saturating_sub(1);
        self.remaining.set(left);
        tracing::trace!(command = self.name(), id = %self.id(), remaining = left, "child completed");
        if left == 0 {
            self.complete_command()
        } else {
            Ok(())
        }
    }
}

impl CollectionCommand for ParallelCommand {
    fn collection(&self) -> &ChildCollection {
        &self.children
    }
}

impl Command for ParallelCommand {
    fn execute_command(&self) -> CommandResult<()> {
        let children = self.children.snapshot();
        self.remaining.set(children.len());
        tracing::debug!(command = self.name(), id = %self.id(), children = children.len(), "parallel fan-out");

        if children.is_empty() {
            return self.complete_command();
        }

        // 先全部订阅，确保订阅失败时没有任何子命令被启动
        for child in &children {
            let this = self.this.clone();
            child.try_on_completed(move || match this.upgrade() {
                Some(par) => par.child_completed(),
                None => Ok(()),
            })?;
        }

        for child in &children {
            child.execute()?;
        }
        Ok(())
    }

    fn dispose_command(&self) {
        let disposed = self.children.dispose_all();
        tracing::trace!(command = self.name(), id = %self.id(), disposed, "children disposed");
    }

    fn children(&self) -> Vec<CommandRef> {
        self.children.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::BufferCommand;
    use crate::error::CommandError;
    use crate::testing::{ImmediateCommand, Journal, ManualCommand};

    #[test]
    fn starts_all_children_before_completing() {
        let journal = Journal::default();
        let a = ManualCommand::new("a", &journal);
        let b = ManualCommand::new("b", &journal);
        let par = ParallelCommand::with_children([a.clone() as CommandRef, b.clone()]).unwrap();

        par.execute().unwrap();
        assert_eq!(a.executions(), 1);
        assert_eq!(b.executions(), 1);
        assert_eq!(par.remaining(), 2);
        assert_eq!(par.state(), CommandState::Executing);
    }

    #[test]
    fn completes_once_regardless_of_completion_order() {
        let journal = Journal::default();
        let a = ManualCommand::new("a", &journal);
        let b = ManualCommand::new("b", &journal);
        let par = ParallelCommand::with_children([a.clone() as CommandRef, b.clone()]).unwrap();
        let fired = Rc::new(Cell::new(0));
        let f = fired.clone();
        par.on_completed(move || f.set(f.get() + 1)).unwrap();

        par.execute().unwrap();
        b.finish().unwrap();
        assert_eq!(fired.get(), 0);
        a.finish().unwrap();
        assert_eq!(fired.get(), 1);
        assert_eq!(par.state(), CommandState::Completed);
    }

    #[test]
    fn empty_parallel_completes_synchronously() {
        let par = ParallelCommand::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        par.on_completed(move || f.set(true)).unwrap();
        par.execute().unwrap();
        assert!(fired.get());
    }

    #[test]
    fn synchronous_children_join_within_execute() {
        let journal = Journal::default();
        let par = ParallelCommand::new();
        par.add_child(ImmediateCommand::new("a", &journal))
            .unwrap()
            .add_child(ImmediateCommand::new("b", &journal))
            .unwrap();
        par.execute().unwrap();
        assert_eq!(par.state(), CommandState::Completed);
        assert_eq!(par.remaining(), 0);
    }

    #[test]
    fn buffer_child_is_rejected_before_any_child_starts() {
        let journal = Journal::default();
        let a = ManualCommand::new("a", &journal);
        let par = ParallelCommand::with_children([a.clone() as CommandRef, BufferCommand::new()])
            .unwrap();
        let err = par.execute().unwrap_err();
        assert!(matches!(err, CommandError::UnsupportedOperation { .. }));
        assert_eq!(a.executions(), 0);
    }

    #[test]
    fn dispose_cascades_to_running_children() {
        let journal = Journal::default();
        let a = ManualCommand::new("a", &journal);
        let b = ManualCommand::new("b", &journal);
        let par = ParallelCommand::with_children([a.clone() as CommandRef, b.clone()]).unwrap();
        par.execute().unwrap();
        a.finish().unwrap();
        par.dispose();
        assert!(b.is_disposed());
        assert_eq!(journal.count("dispose:a"), 1);
        assert_eq!(journal.count("dispose:b"), 1);
        // 释放后迟到的完成不会再驱动并行命令
        b.finish().unwrap();
        assert_eq!(par.state(), CommandState::Executing);
    }
}
