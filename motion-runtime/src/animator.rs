//! # Animator 模块
//!
//! 动画工厂：持有播放引擎和默认选项，为视图创建三种构建器。

use std::rc::Rc;

use crate::engine::PlaybackEngine;
use crate::options::PlaybackOptions;
use crate::playback::{ChainedAnimation, CompositeAnimation, SequentialAnimation};
use crate::view::{TargetView, view_ref};

/// 动画工厂
///
/// 构建器只保存视图的弱引用，视图的生命周期仍由调用方管理。
#[derive(Clone)]
pub struct Animator {
    engine: Rc<dyn PlaybackEngine>,
    options: PlaybackOptions,
}

impl std::fmt::Debug for Animator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Animator")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Animator {
    pub fn new(engine: Rc<dyn PlaybackEngine>) -> Self {
        Self {
            engine,
            options: PlaybackOptions::default(),
        }
    }

    /// 设置新建构建器的默认选项
    pub fn with_options(mut self, options: PlaybackOptions) -> Self {
        self.options = options;
        self
    }

    pub fn engine(&self) -> &Rc<dyn PlaybackEngine> {
        &self.engine
    }

    pub fn options(&self) -> PlaybackOptions {
        self.options
    }

    /// 顺序动画
    pub fn sequential<V: TargetView>(&self, view: &Rc<V>) -> SequentialAnimation {
        SequentialAnimation::new(view_ref(view), self.engine.clone()).with_options(self.options)
    }

    /// 组合动画（所有变更共享 `duration`）
    pub fn composite<V: TargetView>(&self, view: &Rc<V>, duration: f64) -> CompositeAnimation {
        CompositeAnimation::new(view_ref(view), self.engine.clone(), duration)
            .with_options(self.options)
    }

    /// 链式动画
    pub fn chained<V: TargetView>(&self, view: &Rc<V>) -> ChainedAnimation {
        ChainedAnimation::new(view_ref(view)).with_options(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TimelineEngine;
    use crate::error::AnimationError;
    use crate::geometry::{Point, Rect};
    use crate::view::BasicView;
    use std::cell::Cell;

    #[test]
    fn test_builders_share_engine() {
        let engine = Rc::new(TimelineEngine::new());
        let animator = Animator::new(engine.clone());
        let view = Rc::new(BasicView::new(Rect::new(0.0, 0.0, 10.0, 10.0)));

        animator
            .sequential(&view)
            .action_translate(0.1, 1.0, 0.0)
            .start_animation(|_| {})
            .unwrap();
        animator
            .composite(&view, 0.2)
            .action_translate(0.0, 1.0)
            .start_animation(|_| {})
            .unwrap();
        // 直接使用工厂持有的引擎
        animator
            .engine()
            .animate(0.3, Box::new(|| {}), Box::new(|_| {}));

        assert_eq!(engine.call_count(), 3);
        assert_eq!(view.center(), Point::new(6.0, 6.0));
    }

    #[test]
    fn test_options_propagate() {
        let engine = Rc::new(TimelineEngine::new());
        let animator = Animator::new(engine.clone()).with_options(PlaybackOptions::strict());
        assert_eq!(animator.options(), PlaybackOptions::strict());
        assert_eq!(Animator::new(engine.clone()).options(), PlaybackOptions::default());
        let view = Rc::new(BasicView::new(Rect::new(0.0, 0.0, 10.0, 10.0)));

        let result = animator
            .composite(&view, f64::NAN)
            .action_alpha(0.0)
            .start_animation(|_| {});
        assert!(matches!(result, Err(AnimationError::InvalidDuration { .. })));

        let lenient = Animator::new(engine.clone()).with_options(PlaybackOptions::lenient());
        assert!(lenient.chained(&view).start_animation().is_ok());
        assert_eq!(engine.call_count(), 0);
    }

    #[test]
    fn test_chain_through_animator() {
        let engine = Rc::new(TimelineEngine::new());
        let animator = Animator::new(engine.clone());
        let view = Rc::new(BasicView::new(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let done = Rc::new(Cell::new(false));
        let flag = done.clone();

        let chain = animator
            .chained(&view)
            .add(animator.sequential(&view).transform_rotation(0.5, 90.0))
            .add(animator.composite(&view, 0.5).transform_identity())
            .on_complete(move || flag.set(true));
        chain.start_animation().unwrap();
        engine.advance(1.0);

        assert!(done.get());
        assert!(view.transform().is_identity());
    }
}
