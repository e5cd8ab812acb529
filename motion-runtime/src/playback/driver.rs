//! # Driver 模块
//!
//! 可重入的推进器（trampoline）。
//!
//! 播放引擎可能在 `animate` 内部同步调用完成回调，回调又会启动下一步。
//! 如果直接递归，调用栈会随步数增长；推进器把嵌套调用记录为待处理事件，
//! 由最外层的循环依次处理，栈深度保持常数。

use std::cell::Cell;

/// 推进器
#[derive(Debug)]
pub(crate) struct Driver<E: Copy> {
    active: Cell<bool>,
    pending: Cell<Option<E>>,
}

impl<E: Copy> Driver<E> {
    pub(crate) fn new() -> Self {
        Self {
            active: Cell::new(false),
            pending: Cell::new(None),
        }
    }

    /// 处理事件
    ///
    /// 已经在循环中时只记录事件并立即返回，由外层循环调用 `step`。
    /// 每一步最多产生一个后续事件（一次只有一个播放在进行）。
    pub(crate) fn drive(&self, event: E, mut step: impl FnMut(E)) {
        if self.active.get() {
            self.pending.set(Some(event));
            return;
        }

        self.active.set(true);
        let mut next = Some(event);
        while let Some(event) = next {
            step(event);
            next = self.pending.take();
        }
        self.active.set(false);
    }

    /// 是否正在循环中
    pub(crate) fn is_active(&self) -> bool {
        self.active.get()
    }
}
