//! 一次性完成 future
//!
use crate::command::{Command, CommandExt};
use crate::error::{CommandError, CommandResult};
use std::future::Future;
use tokio::sync::oneshot;

/// 订阅命令的完成通知，返回一个在命令完成时就绪的 future
///
/// 若命令在完成前被释放（订阅随之清空），future 以 `CommandError::Abandoned` 结束。
pub fn completion<C: Command + ?Sized>(
    command: &C,
) -> CommandResult<impl Future<Output = CommandResult<()>> + 'static> {
    let (tx, rx) = oneshot::channel::<()>();
    command.on_completed(move || {
        // 接收端可能已被丢弃，此时无人等待
        let _ = tx.send(());
    })?;

    let name = command.name();
    Ok(async move { rx.await.map_err(|_| CommandError::Abandoned { command: name }) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Journal, ManualCommand};

    #[tokio::test]
    async fn resolves_when_command_completes() {
        let cmd = ManualCommand::new("a", &Journal::default());
        let done = completion(&*cmd).unwrap();
        cmd.execute().unwrap();
        cmd.finish().unwrap();
        done.await.unwrap();
    }

    #[tokio::test]
    async fn disposed_command_is_abandoned() {
        let cmd = ManualCommand::new("a", &Journal::default());
        let done = completion(&*cmd).unwrap();
        cmd.execute().unwrap();
        cmd.dispose();
        match done.await {
            Err(CommandError::Abandoned { command }) => assert_eq!(command, "ManualCommand"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
