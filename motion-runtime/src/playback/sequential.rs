//! # Sequential 模块
//!
//! 顺序动画：每个动画单元单独调用一次引擎，前一步完成后才开始下一步。
//!
//! ## 执行模型
//!
//! ```text
//! start_animation(done)
//!   └─ 复制单元列表到本次播放的队列
//!        └─ advance: 出队 → animate(d, mutate, advance)
//!                           ...
//!             队列为空 → done(最后一步的 finished)
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::{debug, trace};

use super::Playable;
use super::driver::Driver;
use crate::engine::{Completion, PlaybackEngine};
use crate::error::{AnimResult, AnimationKind};
use crate::geometry::{AffineTransform, Point, degrees_to_radians};
use crate::options::{EmptyCheck, PlaybackOptions};
use crate::unit::{AnimationUnit, CustomAction, ViewAction};
use crate::view::{Position, TargetView, ViewRef};

/// 顺序动画
///
/// 追加顺序即播放顺序。构建器本身保留单元列表，可以多次播放。
pub struct SequentialAnimation {
    view: ViewRef,
    engine: Rc<dyn PlaybackEngine>,
    options: PlaybackOptions,
    units: Vec<AnimationUnit>,
}

impl std::fmt::Debug for SequentialAnimation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequentialAnimation")
            .field("units", &self.units)
            .finish()
    }
}

impl SequentialAnimation {
    /// 创建空的顺序动画
    pub fn new(view: ViewRef, engine: Rc<dyn PlaybackEngine>) -> Self {
        Self {
            view,
            engine,
            options: PlaybackOptions::default(),
            units: Vec::new(),
        }
    }

    /// 设置播放选项
    pub fn with_options(mut self, options: PlaybackOptions) -> Self {
        self.options = options;
        self
    }

    /// 追加动画单元
    pub fn unit(mut self, unit: AnimationUnit) -> Self {
        self.units.push(unit);
        self
    }

    // ========== 变换 ==========

    /// 追加任意变换
    pub fn transform(self, duration: f64, transform: AffineTransform) -> Self {
        self.unit(AnimationUnit::transform(transform, duration))
    }

    pub fn transform_identity(self, duration: f64) -> Self {
        self.transform(duration, AffineTransform::identity())
    }

    pub fn transform_translation(self, duration: f64, x: f64, y: f64) -> Self {
        self.transform(duration, AffineTransform::translation(x, y))
    }

    /// 旋转（角度）
    pub fn transform_rotation(self, duration: f64, degrees: f64) -> Self {
        self.transform(
            duration,
            AffineTransform::rotation(degrees_to_radians(degrees)),
        )
    }

    pub fn transform_scale(self, duration: f64, sx: f64, sy: f64) -> Self {
        self.transform(duration, AffineTransform::scale(sx, sy))
    }

    // ========== 动作 ==========

    fn push_action(self, duration: f64, action: ViewAction) -> Self {
        self.unit(AnimationUnit::action(action, duration))
    }

    /// 移动中心点到绝对位置
    pub fn action_position(self, duration: f64, x: f64, y: f64) -> Self {
        self.push_action(duration, ViewAction::SetCenter(Point::new(x, y)))
    }

    /// 相对平移中心点
    pub fn action_translate(self, duration: f64, dx: f64, dy: f64) -> Self {
        self.push_action(duration, ViewAction::Translate { dx, dy })
    }

    /// 以中心为锚点缩放 frame
    pub fn action_scale(self, duration: f64, sx: f64, sy: f64) -> Self {
        self.push_action(duration, ViewAction::ScaleFrame { sx, sy })
    }

    pub fn action_alpha(self, duration: f64, alpha: f64) -> Self {
        self.push_action(duration, ViewAction::Alpha(alpha))
    }

    pub fn action_move_to(self, duration: f64, position: Position) -> Self {
        self.push_action(duration, ViewAction::MoveTo(position))
    }

    /// 追加自定义动作
    pub fn action(self, duration: f64, action: impl Fn(&dyn TargetView) + 'static) -> Self {
        self.push_action(duration, ViewAction::Custom(CustomAction::new(action)))
    }

    // ========== 查询 ==========

    pub fn units(&self) -> &[AnimationUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    // ========== 播放 ==========

    /// 开始播放
    ///
    /// `completion` 收到最后一步的 `finished` 参数。
    /// 没有任何单元时按 `PlaybackOptions::empty` 处理，`completion` 不会被调用。
    pub fn start_animation(&self, completion: impl FnOnce(bool) + 'static) -> AnimResult<()> {
        self.start(Box::new(completion))
    }
}

impl Playable for SequentialAnimation {
    fn kind(&self) -> AnimationKind {
        AnimationKind::Sequential
    }

    fn validate(&self) -> AnimResult<bool> {
        if self.options.check_empty(self.kind(), self.is_empty())? == EmptyCheck::Skip {
            return Ok(false);
        }
        for unit in &self.units {
            self.options.check_duration(unit.duration)?;
        }
        Ok(true)
    }

    fn play(&self, completion: Completion) -> AnimResult<()> {
        debug!(steps = self.units.len(), "开始顺序动画");
        let run = Rc::new(SequentialRun {
            view: self.view.clone(),
            engine: Rc::clone(&self.engine),
            queue: RefCell::new(self.units.iter().cloned().collect()),
            completion: RefCell::new(Some(completion)),
            driver: Driver::new(),
        });
        run.advance(true);
        Ok(())
    }

    fn total_duration(&self) -> f64 {
        self.units.iter().map(|unit| unit.duration).sum()
    }

    fn engine_calls(&self) -> usize {
        self.units.len()
    }
}

/// 一次顺序播放的状态
///
/// 由进行中的完成回调持有，最后一步完成后随回调一起释放。
struct SequentialRun {
    view: ViewRef,
    engine: Rc<dyn PlaybackEngine>,
    queue: RefCell<VecDeque<AnimationUnit>>,
    completion: RefCell<Option<Completion>>,
    driver: Driver<bool>,
}

impl SequentialRun {
    fn advance(self: &Rc<Self>, finished: bool) {
        let this = Rc::clone(self);
        self.driver.drive(finished, move |finished| this.step(finished));
    }

    fn step(self: &Rc<Self>, finished: bool) {
        let next = self.queue.borrow_mut().pop_front();
        match next {
            Some(unit) => self.play(unit),
            None => {
                trace!(finished = finished, "顺序动画播放完毕");
                let completion = self.completion.borrow_mut().take();
                if let Some(completion) = completion {
                    completion(finished);
                }
            }
        }
    }

    fn play(self: &Rc<Self>, unit: AnimationUnit) {
        trace!(
            duration = unit.duration,
            remaining = self.queue.borrow().len(),
            "播放动画单元"
        );
        let view = self.view.clone();
        let run = Rc::clone(self);
        let AnimationUnit { mutation, duration } = unit;
        self.engine.animate(
            duration,
            Box::new(move || mutation.apply_to(&view)),
            Box::new(move |finished| run.advance(finished)),
        );
    }
}
