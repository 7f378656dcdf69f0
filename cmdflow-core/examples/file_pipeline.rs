//! 读取一个文本文件，统计行数与字数，把报告写到目标文件。
//!
//! 用法：`cargo run --example file_pipeline -- <input> <output>`
//! 日志级别由 `RUST_LOG` 控制，例如 `RUST_LOG=cmdflow_core=debug`。
//!
use anyhow::{Context, Result as AnyResult, bail};
use cmdflow_core::io::{IoContext, ReadFileCommand, WriteFileCommand, WriteRequest};
use cmdflow_core::prelude::*;
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(input), Some(output)) = (args.next(), args.next()) else {
        bail!("usage: file_pipeline <input> <output>");
    };
    let output = PathBuf::from(output);

    let ctx = IoContext::new();
    let read = ReadFileCommand::new(&ctx, input);

    let report_ctx = ctx.clone();
    let target = output.clone();
    let report = JitCommand::after(read.clone(), move |read: &ReadFileCommand| {
        let text = read.text().unwrap_or_default();
        let body = format!(
            "lines: {}\nwords: {}\n",
            text.lines().count(),
            text.split_whitespace().count()
        );
        WriteFileCommand::new(
            &report_ctx,
            WriteRequest::builder()
                .path(target)
                .contents(body)
                .create_parents(true)
                .build(),
        ) as CommandRef
    });

    let pipeline = SequenceCommand::with_children([read.clone() as CommandRef, report.clone()])?;
    ctx.run(&*pipeline).await.context("pipeline did not complete")?;

    let snapshot = CommandSnapshot::capture(&*pipeline);
    tracing::info!(tree = %serde_json::to_string(&snapshot)?, "pipeline finished");

    if let Some(failure) = read.failure() {
        bail!("pipeline failed: {failure}");
    }
    println!("report written to {}", output.display());
    Ok(())
}
