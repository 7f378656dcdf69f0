use cmdflow_core::command::{
    Command, CommandBase, CommandCompletion, CommandCore, CommandExt, CommandRef,
};
use cmdflow_core::error::CommandResult;
use cmdflow_core::state::CommandState;
use cmdflow_macros::command;
use std::rc::Rc;

#[command]
struct Plain {
    label: &'static str,
}

#[command(name = "renamed")]
struct Renamed {}

impl Command for Plain {
    fn execute_command(&self) -> CommandResult<()> {
        self.complete_command()
    }
}

impl Command for Renamed {
    fn execute_command(&self) -> CommandResult<()> {
        Ok(())
    }
}

#[test]
fn default_name_is_struct_ident() {
    let cmd = Plain {
        core: CommandCore::new(),
        label: "p",
    };
    assert_eq!(cmd.name(), "Plain");
    assert_eq!(cmd.label, "p");
    cmd.execute().unwrap();
    assert_eq!(cmd.state(), CommandState::Completed);
}

#[test]
fn explicit_name_is_used_through_trait_objects() {
    let cmd: CommandRef = Rc::new(Renamed {
        core: CommandCore::new(),
    });
    assert_eq!(cmd.name(), "renamed");
    cmd.execute().unwrap();
    assert_eq!(cmd.state(), CommandState::Executing);
}

#[test]
fn injected_core_gives_distinct_ids() {
    let a = Renamed { core: CommandCore::new() };
    let b = Renamed { core: CommandCore::new() };
    assert_ne!(a.id(), b.id());
}
