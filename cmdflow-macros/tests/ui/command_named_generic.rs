use cmdflow_core::command::{Command, CommandBase, CommandCompletion, CommandCore, CommandExt};
use cmdflow_core::error::CommandResult;
use cmdflow_macros::command;
use std::cell::RefCell;

#[command(name = "Collect")]
struct Collect<T: Clone + 'static> {
    items: RefCell<Vec<T>>,
    item: T,
}

impl<T: Clone + 'static> Command for Collect<T> {
    fn execute_command(&self) -> CommandResult<()> {
        self.items.borrow_mut().push(self.item.clone());
        self.complete_command()
    }
}

fn main() {
    let cmd = Collect {
        core: CommandCore::new(),
        items: RefCell::new(Vec::new()),
        item: 7u8,
    };
    cmd.execute().unwrap();
    assert_eq!(cmd.name(), "Collect");
    assert_eq!(*cmd.items.borrow(), vec![7]);
}
