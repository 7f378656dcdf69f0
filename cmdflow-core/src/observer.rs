//! 观察者列表
//!
//! 以注册顺序保存回调，并通过 [`Subscription`] 句柄支持退订。
//! 列表本身不负责调用：调用方先取出（或克隆）回调，再在不持有借用的情况下逐个调用，
//! 以便回调内部可以安全地再注册、退订或触发释放。
//!
use serde::{Deserialize, Serialize};

/// 订阅句柄：用于退订某个已注册的观察者
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subscription(u64);

pub(crate) struct Observers<T> {
    next: u64,
    entries: Vec<(Subscription, T)>,
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            next: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> Observers<T> {
    pub(crate) fn add(&mut self, observer: T) -> Subscription {
        let sub = Subscription(self.next);
        self.next += 1;
        self.entries.push((sub, observer));
        sub
    }

    pub(crate) fn remove(&mut self, sub: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(s, _)| *s != sub);
        self.entries.len() != before
    }

    /// 按注册顺序取出全部观察者并清空列表
    pub(crate) fn take(&mut self) -> Vec<T> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(_, o)| o)
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<T: Clone> Observers<T> {
    /// 按注册顺序克隆观察者（多次触发的通知使用）
    pub(crate) fn snapshot(&self) -> Vec<T> {
        self.entries.iter().map(|(_, o)| o.clone()).collect()
    }
}
