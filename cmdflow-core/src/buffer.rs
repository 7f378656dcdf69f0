//! 缓冲命令（Buffer Command）
//!
//! 永不结束的 FIFO 组合命令：
//! - `add_child` 入队；若缓冲已启动且入队前队列为空，立即执行新子命令；
//! - 同一时刻只执行队首的一个子命令，完成后出队并启动下一个；
//! - 队列排空时进入空闲，每次“排空”只触发一次空闲通知；
//! - 普通完成通知被禁止：订阅会返回 `UnsupportedOperation`；
//! - 无法启动的队首（订阅或执行失败）会被移出队列，错误返回给调用方，处理继续。
//!
//! 同步完成的子命令在 `drain` 的循环内出队，调用栈深度与队列长度无关。
//!
use crate::command::{Command, CommandBase, CommandCore, CommandExt, CommandRef};
use crate::error::{CommandError, CommandResult};
use crate::observer::{Observers, Subscription};
use crate::state::CommandState;
use cmdflow_macros::command;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

type IdleObserver = Rc<dyn Fn()>;

#[command]
pub struct BufferCommand {
    this: Weak<BufferCommand>,
    // 队首即正在执行的子命令
    queue: RefCell<VecDeque<CommandRef>>,
    current: RefCell<Option<Weak<dyn Command>>>,
    idle: Cell<bool>,
    idle_observers: RefCell<Observers<IdleObserver>>,
    // `drain` 正在栈上
    draining: Cell<bool>,
    // 队首已在 `drain` 内同步完成
    head_done: Cell<bool>,
}

impl BufferCommand {
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            core: CommandCore::never_completing(),
            this: this.clone(),
            queue: RefCell::new(VecDeque::new()),
            current: RefCell::new(None),
            idle: Cell::new(true),
            idle_observers: RefCell::new(Observers::default()),
            draining: Cell::new(false),
            head_done: Cell::new(false),
        })
    }

    /// 入队子命令；启动后同样允许
    pub fn add_child(&self, child: CommandRef) -> CommandResult<&Self> {
        if self.is_disposed() || self.is_disposing() {
            return Err(CommandError::invalid_state(
                self.name(),
                "add child on a disposed buffer",
            ));
        }

        let was_empty = {
            let mut queue = self.queue.borrow_mut();
            let was_empty = queue.is_empty();
            queue.push_back(child);
            was_empty
        };

        // 正在排空时由 `drain` 的循环接手新的队首
        if was_empty && self.state() == CommandState::Executing && !self.draining.get() {
            self.run_head()?;
        }
        Ok(self)
    }

    pub fn add_children<I>(&self, children: I) -> CommandResult<&Self>
    where
        I: IntoIterator<Item = CommandRef>,
    {
        for child in children {
            self.add_child(child)?;
        }
        Ok(self)
    }

    /// 释放所有排队（未运行）的子命令并清空队列
    ///
    /// `exclude_current_child` 为真时保留正在运行的子命令作为唯一的队列元素；
    /// 否则运行中的子命令也会被释放，下一次 `add_child` 将重新启动处理。
    /// 清空后若队列为空则标记为空闲，但清空本身从不触发空闲通知。
    pub fn clear(&self, exclude_current_child: bool) {
        let current = self.current_child();
        let drained: Vec<CommandRef> = self.queue.borrow_mut().drain(..).collect();

        let keep = match current {
            Some(cur) if exclude_current_child => Some(cur),
            _ => None,
        };

        let mut disposed = 0;
        for child in drained {
            if let Some(cur) = &keep {
                if Rc::ptr_eq(cur, &child) {
                    continue;
                }
            }
            child.dispose();
            disposed += 1;
        }

        match keep {
            Some(cur) => self.queue.borrow_mut().push_back(cur),
            None => {
                *self.current.borrow_mut() = None;
                self.idle.set(true);
            }
        }

        tracing::debug!(command = self.name(), id = %self.id(), disposed, exclude_current_child, "buffer cleared");
    }

    pub fn is_buffer_idle(&self) -> bool {
        self.idle.get()
    }

    /// 正在执行的子命令（队首的弱引用视图）
    pub fn current_child(&self) -> Option<CommandRef> {
        self.current.borrow().as_ref().and_then(|w| w.upgrade())
    }

    /// 队列中的子命令数量（包含正在执行的子命令）
    pub fn pending_len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// 订阅空闲通知（可多次触发）
    pub fn on_idle<F>(&self, observer: F) -> CommandResult<Subscription>
    where
        F: Fn() + 'static,
    {
        if self.is_disposed() {
            return Err(CommandError::invalid_state(
                self.name(),
                "cannot subscribe to a disposed buffer",
            ));
        }
        Ok(self.idle_observers.borrow_mut().add(Rc::new(observer)))
    }

    pub fn remove_idle(&self, sub: Subscription) -> bool {
        self.idle_observers.borrow_mut().remove(sub)
    }

    fn run_head(&self) -> CommandResult<()> {
        self.draining.set(true);
        let result = self.drain();
        self.draining.set(false);
        result
    }

    fn drain(&self) -> CommandResult<()> {
        let mut first_err: Option<CommandError> = None;
        loop {
            if self.is_disposed() || self.is_disposing() {
                break;
            }

            let head = self.queue.borrow().front().cloned();
            let Some(child) = head else {
                self.become_idle();
                // 空闲观察者可能已入队新的子命令
                if self.queue.borrow().is_empty() {
                    break;
                }
                continue;
            };

            self.idle.set(false);
            self.head_done.set(false);
            *self.current.borrow_mut() = Some(Rc::downgrade(&child));
            tracing::debug!(command = self.name(), id = %self.id(), child = child.name(), "buffer running child");

            if let Err(err) = self.start(&child) {
                tracing::warn!(command = self.name(), id = %self.id(), child = child.name(), error = %err, "buffer child failed to start");
                self.drop_head(&child);
                if first_err.is_none() {
                    first_err = Some(err);
                }
                continue;
            }

            // 队首仍在运行：等待其完成通知
            if !self.head_done.get() {
                break;
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn start(&self, child: &CommandRef) -> CommandResult<()> {
        let this = self.this.clone();
        let finished = Rc::downgrade(child);
        let sub = child.try_on_completed(move || match this.upgrade() {
            Some(buffer) => buffer.child_completed(&finished),
            None => Ok(()),
        })?;
        child.execute().inspect_err(|_| {
            child.remove_completed(sub);
        })
    }

    /// 移出无法启动的队首（若它仍在队首）
    fn drop_head(&self, child: &CommandRef) {
        let mut queue = self.queue.borrow_mut();
        if queue.front().is_some_and(|head| Rc::ptr_eq(head, child)) {
            queue.pop_front();
        }
        drop(queue);
        *self.current.borrow_mut() = None;
    }

    fn child_completed(&self, finished: &Weak<dyn Command>) -> CommandResult<()> {
        if self.is_disposed() || self.is_disposing() {
            return Ok(());
        }

        {
            let mut queue = self.queue.borrow_mut();
            let is_head = match (queue.front(), finished.upgrade()) {
                (Some(head), Some(done)) => Rc::ptr_eq(head, &done),
                _ => false,
            };
            // 不在队首的子命令（例如已被 clear 移出）不驱动缓冲
            if !is_head {
                return Ok(());
            }
            queue.pop_front();
        }
        *self.current.borrow_mut() = None;

        if self.draining.get() {
            self.head_done.set(true);
            return Ok(());
        }
        self.run_head()
    }

    fn become_idle(&self) {
        if self.idle.replace(true) {
            return;
        }
        tracing::debug!(command = self.name(), id = %self.id(), "buffer idle");
        let observers = self.idle_observers.borrow().snapshot();
        for observer in observers {
            observer();
        }
    }
}

impl Command for BufferCommand {
    fn execute_command(&self) -> CommandResult<()> {
        if self.queue.borrow().is_empty() {
            return Ok(());
        }
        self.run_head()
    }

    fn dispose_command(&self) {
        let drained: Vec<CommandRef> = self.queue.borrow_mut().drain(..).collect();
        for child in drained.iter().filter(|c| !c.is_disposed()) {
            child.dispose();
        }
        *self.current.borrow_mut() = None;
        self.idle_observers.borrow_mut().clear();
    }

    fn children(&self) -> Vec<CommandRef> {
        self.queue.borrow().iter().cloned().collect()
    }
}
