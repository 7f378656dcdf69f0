//! 成功/失败报告（叶子失败即数据）
//!
//! 可能在运行期失败的叶子命令（如磁盘 I/O）不返回错误，而是把失败记录下来并照常完成，
//! 让组合命令按确定的流程继续；调用方在完成后检查结果。
//!
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 聚合的失败原因（按发生顺序）
#[derive(Clone, Debug, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}", .reasons.join("; "))]
pub struct CommandFailure {
    reasons: Vec<String>,
}

impl CommandFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reasons: vec![reason.into()],
        }
    }

    pub fn push(&mut self, reason: impl Into<String>) {
        self.reasons.push(reason.into());
    }

    pub fn merge(&mut self, other: CommandFailure) {
        self.reasons.extend(other.reasons);
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    /// 合并多个报告方的失败；全部成功时返回 `None`
    pub fn aggregate<'a, I>(reporters: I) -> Option<CommandFailure>
    where
        I: IntoIterator<Item = &'a dyn ReportsOutcome>,
    {
        let mut merged = CommandFailure::default();
        for reporter in reporters {
            if let Some(failure) = reporter.failure() {
                merged.merge(failure);
            }
        }
        (!merged.is_empty()).then_some(merged)
    }
}

/// 成功报告能力
pub trait ReportsOutcome {
    /// 失败原因；成功或尚未完成时为 `None`
    fn failure(&self) -> Option<CommandFailure>;

    fn was_successful(&self) -> bool {
        self.failure().is_none()
    }
}
