//! # Chained 模块
//!
//! 链式动画：依次播放若干子动画（顺序或组合），每个子动画完成后推进游标。
//!
//! ## 状态机
//!
//! ```text
//! Idle ──start──► Playing(0) ──完成──► Playing(1) ── ... ──► 一轮结束
//!                     ▲                                        │
//!                     └──────────── looping ───────────────────┤
//!                                                              ▼
//!                                                          Completed
//! ```
//!
//! 每轮结束时游标归零、调用顶层完成回调；非循环模式进入 `Completed`。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, error, trace};

use super::Playable;
use super::driver::Driver;
use crate::error::{AnimResult, AnimationError, AnimationKind};
use crate::options::{EmptyCheck, PlaybackOptions};
use crate::view::{TargetView, ViewRef};

/// 链式动画状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainState {
    /// 尚未开始
    #[default]
    Idle,
    /// 正在播放指定索引的子动画
    Playing(usize),
    /// 已结束（非循环模式播放完一轮，或子动画启动失败）
    Completed,
}

impl ChainState {
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing(_))
    }
}

#[derive(Debug, Clone, Copy)]
enum ChainEvent {
    /// 播放当前游标处的子动画
    Start,
    /// 当前子动画已完成
    SegmentFinished,
}

struct ChainInner {
    view: ViewRef,
    looping: Cell<bool>,
    options: Cell<PlaybackOptions>,
    segments: RefCell<Vec<Box<dyn Playable>>>,
    /// 开始播放时每个子动画的检查结果，`false` 表示跳过
    playable: RefCell<Vec<bool>>,
    on_complete: RefCell<Box<dyn FnMut()>>,
    current_index: Cell<usize>,
    state: Cell<ChainState>,
    cycles: Cell<u64>,
    dispatched: Cell<u64>,
    segments_finished: Cell<u64>,
    driver: Driver<ChainEvent>,
}

/// 链式动画
///
/// 子动画以 `Playable` trait object 保存，调度时不区分具体类型。
pub struct ChainedAnimation {
    inner: Rc<ChainInner>,
}

impl std::fmt::Debug for ChainedAnimation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainedAnimation")
            .field("segments", &self.len())
            .field("looping", &self.is_looping())
            .field("state", &self.state())
            .field("current_index", &self.current_index())
            .finish()
    }
}

impl ChainedAnimation {
    /// 创建空的链式动画（不循环，完成回调为空）
    pub fn new(view: ViewRef) -> Self {
        Self {
            inner: Rc::new(ChainInner {
                view,
                looping: Cell::new(false),
                options: Cell::new(PlaybackOptions::default()),
                segments: RefCell::new(Vec::new()),
                playable: RefCell::new(Vec::new()),
                on_complete: RefCell::new(Box::new(|| {})),
                current_index: Cell::new(0),
                state: Cell::new(ChainState::Idle),
                cycles: Cell::new(0),
                dispatched: Cell::new(0),
                segments_finished: Cell::new(0),
                driver: Driver::new(),
            }),
        }
    }

    /// 设置是否无限循环
    pub fn looping(self, looping: bool) -> Self {
        self.inner.looping.set(looping);
        self
    }

    /// 设置顶层完成回调（每播放完一轮调用一次）
    pub fn on_complete(self, completion: impl FnMut() + 'static) -> Self {
        *self.inner.on_complete.borrow_mut() = Box::new(completion);
        self
    }

    /// 设置播放选项（只影响链本身的空检查）
    pub fn with_options(self, options: PlaybackOptions) -> Self {
        self.inner.options.set(options);
        self
    }

    /// 追加子动画
    pub fn add(self, animation: impl Playable + 'static) -> Self {
        self.inner.segments.borrow_mut().push(Box::new(animation));
        self
    }

    // ========== 查询 ==========

    /// 目标视图（已释放时为 `None`）
    pub fn view(&self) -> Option<Rc<dyn TargetView>> {
        self.inner.view.upgrade()
    }

    pub fn len(&self) -> usize {
        self.inner.segments.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_looping(&self) -> bool {
        self.inner.looping.get()
    }

    pub fn state(&self) -> ChainState {
        self.inner.state.get()
    }

    /// 当前子动画索引（从 0 开始，一轮结束后归零）
    pub fn current_index(&self) -> usize {
        self.inner.current_index.get()
    }

    /// 已完成的轮数
    pub fn cycles(&self) -> u64 {
        self.inner.cycles.get()
    }

    /// 已启动的子动画次数
    pub fn dispatched_segments(&self) -> u64 {
        self.inner.dispatched.get()
    }

    /// 已完成的子动画次数
    pub fn finished_segments(&self) -> u64 {
        self.inner.segments_finished.get()
    }

    /// 一轮的总时长
    pub fn cycle_duration(&self) -> f64 {
        self.inner
            .segments
            .borrow()
            .iter()
            .map(|segment| segment.total_duration())
            .sum()
    }

    // ========== 播放 ==========

    /// 开始播放
    ///
    /// 播放前检查所有子动画；任何一个检查失败都不会开始播放。
    /// 检查结果在本次播放的各轮之间复用，循环时不会重复检查。
    pub fn start_animation(&self) -> AnimResult<()> {
        let inner = &self.inner;
        if inner.state.get().is_playing() {
            return Err(AnimationError::AlreadyPlaying);
        }

        let playable = inner
            .segments
            .borrow()
            .iter()
            .map(|segment| segment.validate())
            .collect::<AnimResult<Vec<bool>>>()?;
        let options = inner.options.get();
        let nothing_to_play = !playable.iter().any(|&ok| ok);
        if options.check_empty(AnimationKind::Chained, nothing_to_play)? == EmptyCheck::Skip {
            return Ok(());
        }
        *inner.playable.borrow_mut() = playable;

        debug!(
            segments = self.len(),
            looping = self.is_looping(),
            "开始链式动画"
        );
        inner.current_index.set(0);
        inner.state.set(ChainState::Playing(0));
        inner.advance(ChainEvent::Start);
        Ok(())
    }
}

impl ChainInner {
    fn advance(self: &Rc<Self>, event: ChainEvent) {
        let this = Rc::clone(self);
        self.driver.drive(event, move |event| this.step(event));
    }

    fn step(self: &Rc<Self>, event: ChainEvent) {
        match event {
            ChainEvent::Start => self.dispatch(),
            ChainEvent::SegmentFinished => self.on_segment_finished(),
        }
    }

    fn on_segment_finished(self: &Rc<Self>) {
        let count = self.segments.borrow().len();
        let next = self.current_index.get() + 1;

        if next >= count {
            self.current_index.set(0);
            self.cycles.set(self.cycles.get() + 1);
            debug!(cycles = self.cycles.get(), "链式动画完成一轮");

            let looping = self.looping.get();
            if !looping {
                self.state.set(ChainState::Completed);
            }
            (self.on_complete.borrow_mut())();
            if !looping {
                return;
            }
        } else {
            self.current_index.set(next);
        }

        self.dispatch();
    }

    fn dispatch(self: &Rc<Self>) {
        let index = self.current_index.get();
        self.state.set(ChainState::Playing(index));

        let segments = self.segments.borrow();
        let Some(segment) = segments.get(index) else {
            error!(index = index, "子动画索引越界，链式动画停止");
            drop(segments);
            self.stop();
            return;
        };

        let playable = self.playable.borrow().get(index).copied().unwrap_or(false);
        if !playable {
            trace!(index = index, "子动画为空，直接跳过");
            drop(segments);
            self.advance(ChainEvent::SegmentFinished);
            return;
        }

        trace!(index = index, kind = %segment.kind(), "播放子动画");
        self.dispatched.set(self.dispatched.get() + 1);
        let this = Rc::clone(self);
        let result = segment.play(Box::new(move |_finished| {
            this.segments_finished.set(this.segments_finished.get() + 1);
            this.advance(ChainEvent::SegmentFinished);
        }));
        drop(segments);

        if let Err(e) = result {
            error!(index = index, error = %e, "子动画启动失败，链式动画停止");
            self.stop();
        }
    }

    /// 中途停止：不调用顶层完成回调
    fn stop(&self) {
        self.current_index.set(0);
        self.state.set(ChainState::Completed);
    }
}
