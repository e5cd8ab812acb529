//! # Composite 模块
//!
//! 组合动画：多个变换和动作共享一个时长，在一次引擎调用内同时播放。

use std::rc::Rc;

use tracing::{debug, trace};

use super::Playable;
use crate::engine::{Completion, PlaybackEngine};
use crate::error::{AnimResult, AnimationKind};
use crate::geometry::{AffineTransform, Point, degrees_to_radians};
use crate::options::{EmptyCheck, PlaybackOptions};
use crate::unit::{CustomAction, ViewAction};
use crate::view::{Position, TargetView, ViewRef};

/// 组合动画
///
/// 变换按追加顺序依次连接（最左侧最先应用），随后按追加顺序执行动作。
pub struct CompositeAnimation {
    view: ViewRef,
    engine: Rc<dyn PlaybackEngine>,
    options: PlaybackOptions,
    duration: f64,
    transforms: Vec<AffineTransform>,
    actions: Vec<ViewAction>,
}

impl std::fmt::Debug for CompositeAnimation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeAnimation")
            .field("duration", &self.duration)
            .field("transforms", &self.transforms)
            .field("actions", &self.actions)
            .finish()
    }
}

impl CompositeAnimation {
    /// 创建空的组合动画
    pub fn new(view: ViewRef, engine: Rc<dyn PlaybackEngine>, duration: f64) -> Self {
        Self {
            view,
            engine,
            options: PlaybackOptions::default(),
            duration,
            transforms: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// 设置播放选项
    pub fn with_options(mut self, options: PlaybackOptions) -> Self {
        self.options = options;
        self
    }

    // ========== 变换 ==========

    /// 追加任意变换
    pub fn transform(mut self, transform: AffineTransform) -> Self {
        self.transforms.push(transform);
        self
    }

    pub fn transform_identity(self) -> Self {
        self.transform(AffineTransform::identity())
    }

    pub fn transform_translation(self, x: f64, y: f64) -> Self {
        self.transform(AffineTransform::translation(x, y))
    }

    /// 旋转（角度）
    pub fn transform_rotation(self, degrees: f64) -> Self {
        self.transform(AffineTransform::rotation(degrees_to_radians(degrees)))
    }

    pub fn transform_scale(self, sx: f64, sy: f64) -> Self {
        self.transform(AffineTransform::scale(sx, sy))
    }

    // ========== 动作 ==========

    fn push_action(mut self, action: ViewAction) -> Self {
        self.actions.push(action);
        self
    }

    /// 移动中心点到绝对位置
    pub fn action_position(self, x: f64, y: f64) -> Self {
        self.push_action(ViewAction::SetCenter(Point::new(x, y)))
    }

    /// 相对平移中心点
    pub fn action_translate(self, dx: f64, dy: f64) -> Self {
        self.push_action(ViewAction::Translate { dx, dy })
    }

    /// 以中心为锚点缩放 frame
    pub fn action_scale(self, sx: f64, sy: f64) -> Self {
        self.push_action(ViewAction::ScaleFrame { sx, sy })
    }

    pub fn action_alpha(self, alpha: f64) -> Self {
        self.push_action(ViewAction::Alpha(alpha))
    }

    pub fn action_move_to(self, position: Position) -> Self {
        self.push_action(ViewAction::MoveTo(position))
    }

    /// 追加自定义动作
    pub fn action(self, action: impl Fn(&dyn TargetView) + 'static) -> Self {
        self.push_action(ViewAction::Custom(CustomAction::new(action)))
    }

    // ========== 查询 ==========

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn transforms(&self) -> &[AffineTransform] {
        &self.transforms
    }

    pub fn actions(&self) -> &[ViewAction] {
        &self.actions
    }

    /// 没有任何变换和动作
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty() && self.actions.is_empty()
    }

    /// 所有变换连接后的结果
    pub fn composed_transform(&self) -> Option<AffineTransform> {
        let (first, rest) = self.transforms.split_first()?;
        Some(rest.iter().fold(*first, |acc, t| acc.concatenating(t)))
    }

    // ========== 播放 ==========

    /// 开始播放
    ///
    /// 引擎的 `finished` 参数原样转交给 `completion`。
    pub fn start_animation(&self, completion: impl FnOnce(bool) + 'static) -> AnimResult<()> {
        self.start(Box::new(completion))
    }
}

impl Playable for CompositeAnimation {
    fn kind(&self) -> AnimationKind {
        AnimationKind::Composite
    }

    fn validate(&self) -> AnimResult<bool> {
        if self.options.check_empty(self.kind(), self.is_empty())? == EmptyCheck::Skip {
            return Ok(false);
        }
        self.options.check_duration(self.duration)?;
        Ok(true)
    }

    fn play(&self, completion: Completion) -> AnimResult<()> {
        let view = self.view.clone();
        let transforms = self.transforms.clone();
        let actions = self.actions.clone();

        debug!(
            duration = self.duration,
            transforms = transforms.len(),
            actions = actions.len(),
            "开始组合动画"
        );

        self.engine.animate(
            self.duration,
            Box::new(move || {
                let Some(view) = view.upgrade() else {
                    trace!("目标视图已释放，跳过组合变更");
                    return;
                };
                if let Some((first, rest)) = transforms.split_first() {
                    view.set_transform(*first);
                    for transform in rest {
                        view.set_transform(view.transform().concatenating(transform));
                    }
                }
                for action in &actions {
                    action.apply(view.as_ref());
                }
            }),
            completion,
        );
        Ok(())
    }

    fn total_duration(&self) -> f64 {
        self.duration
    }

    fn engine_calls(&self) -> usize {
        1
    }
}
