//! 动作命令：执行一个闭包后同步完成的叶子命令
//!
use crate::command::{Command, CommandCompletion, CommandCore, CommandExt};
use crate::error::CommandResult;
use cmdflow_macros::command;
use std::cell::RefCell;
use std::rc::Rc;

#[command]
pub struct ActionCommand {
    action: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl ActionCommand {
    pub fn new<F>(action: F) -> Rc<Self>
    where
        F: FnOnce() + 'static,
    {
        Rc::new(Self {
            core: CommandCore::new(),
            action: RefCell::new(Some(Box::new(action))),
        })
    }
}

impl Command for ActionCommand {
    fn execute_command(&self) -> CommandResult<()> {
        let action = self.action.borrow_mut().take();
        if let Some(action) = action {
            action();
        }
        self.complete_command()
    }

    fn dispose_command(&self) {
        self.action.borrow_mut().take();
    }
}
