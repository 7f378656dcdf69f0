use cmdflow_core::command::{Command, CommandBase, CommandCompletion, CommandCore, CommandExt};
use cmdflow_core::error::CommandResult;
use cmdflow_macros::command;

#[command]
struct Noop {}

impl Command for Noop {
    fn execute_command(&self) -> CommandResult<()> {
        self.complete_command()
    }
}

fn main() {
    let cmd = Noop {
        core: CommandCore::new(),
    };
    cmd.execute().unwrap();
    assert_eq!(cmd.name(), "Noop");
}
