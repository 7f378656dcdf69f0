//! JIT-Init：以前一阶段的结果构造下一阶段命令
//!
//! 持有一个已执行的命令实例与一个工厂函数，只提供一个操作：`build`。
//! 它不是命令，也就无法被执行；通常交给 [`JitCommand::from_init`](crate::jit::JitCommand::from_init)
//! 在执行时刻再构造后续命令。
//!
use crate::command::{Command, CommandExt, CommandRef};
use crate::error::{CommandError, CommandResult};
use crate::state::CommandState;
use std::rc::Rc;

pub struct JitInit<T: Command + ?Sized> {
    source: Rc<T>,
    factory: Box<dyn FnOnce(&T) -> CommandRef>,
}

impl<T: Command + ?Sized> JitInit<T> {
    pub fn new<F>(source: Rc<T>, factory: F) -> Self
    where
        F: FnOnce(&T) -> CommandRef + 'static,
    {
        Self {
            source,
            factory: Box::new(factory),
        }
    }

    pub fn source(&self) -> &Rc<T> {
        &self.source
    }

    /// 构造后续命令；要求来源命令已完成
    pub fn build(self) -> CommandResult<CommandRef> {
        let actual = self.source.state();
        if actual != CommandState::Completed {
            return Err(CommandError::unexpected_state(
                self.source.name(),
                "build follow-on command",
                CommandState::Completed,
                actual,
            ));
        }
        let next = (self.factory)(&*self.source);
        tracing::trace!(source = self.source.name(), next = next.name(), "follow-on command built");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ImmediateCommand, Journal, ManualCommand};

    #[test]
    fn build_requires_completed_source() {
        let journal = Journal::default();
        let source = ManualCommand::new("a", &journal);
        let init = JitInit::new(source.clone(), |_| {
            ImmediateCommand::new("b", &Journal::default()) as CommandRef
        });
        assert!(matches!(
            init.build(),
            Err(CommandError::InvalidState { .. })
        ));
    }

    #[test]
    fn build_passes_source_to_factory() {
        let journal = Journal::default();
        let source = ManualCommand::new("a", &journal);
        source.execute().unwrap();
        source.finish().unwrap();

        let j = journal.clone();
        let init = JitInit::new(source.clone(), move |src: &ManualCommand| {
            j.record(format!("built-from:{}", src.executions()));
            ImmediateCommand::new("b", &j) as CommandRef
        });
        let next = init.build().unwrap();
        assert_eq!(next.state(), CommandState::Initialized);
        assert_eq!(journal.count("built-from:1"), 1);
    }
}
