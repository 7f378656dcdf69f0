//! cmdflow 过程宏
//!
//! - `#[command]`：为命令结构体注入命令内核字段并实现 `CommandBase`
//!
mod command;
mod field_utils;

use proc_macro::TokenStream;

/// 命令宏
/// - 追加字段：`core: ::cmdflow_core::command::CommandCore`（若缺失）并置于字段最前
/// - 自动实现 `::cmdflow_core::command::CommandBase`（`core/name`）
/// - 支持参数：`#[command(name = "...")]`，默认使用结构体名作为诊断名称
///
/// 生成的字段需要在构造时显式初始化，例如 `core: CommandCore::new()`。
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    command::expand(attr, item)
}
