//! 命令树诊断快照
//!
//! 只读视图：用于日志与排障，不用于持久化命令图。
//!
use crate::command::{Command, CommandBase, CommandExt};
use crate::state::{CommandId, CommandState};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandSnapshot {
    pub name: &'static str,
    pub id: CommandId,
    pub state: CommandState,
    pub disposed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CommandSnapshot>,
}

impl CommandSnapshot {
    pub fn capture(command: &dyn Command) -> Self {
        Self {
            name: command.name(),
            id: command.id(),
            state: command.state(),
            disposed: command.is_disposed(),
            children: command
                .children()
                .iter()
                .map(|child| CommandSnapshot::capture(child.as_ref()))
                .collect(),
        }
    }

    /// 以先序遍历统计处于某状态的命令数量
    pub fn count_in(&self, state: CommandState) -> usize {
        let own = usize::from(self.state == state);
        own + self
            .children
            .iter()
            .map(|c| c.count_in(state))
            .sum::<usize>()
    }
}
