//! # Motion Runtime
//!
//! 声明式视图动画组合库。
//!
//! ## 架构概述
//!
//! `motion-runtime` 是纯逻辑核心，不做插值，也不依赖任何渲染框架。
//! 它把一组视觉变更打包成闭包，交给宿主提供的 [`PlaybackEngine`] 执行：
//!
//! ```text
//! Builder                             PlaybackEngine
//!    │                                      │
//!    │──── animate(duration, mutate, done) ─►│
//!    │                                      │ 执行 mutate，经过 duration
//!    │◄──────────────── done(finished) ──────│
//!    │ 推进到下一步                          │
//! ```
//!
//! ## 核心类型
//!
//! - [`SequentialAnimation`]：逐个播放变换和动作
//! - [`CompositeAnimation`]：多个变更共享一个时长，同时播放
//! - [`ChainedAnimation`]：依次播放若干子动画，可选无限循环
//! - [`Animator`]：为视图创建上述构建器的工厂
//! - [`TimelineEngine`]：基于虚拟时钟的确定性引擎
//!
//! ## 使用示例
//!
//! ```ignore
//! use motion_runtime::{Animator, TimelineEngine};
//!
//! let engine = Rc::new(TimelineEngine::new());
//! let animator = Animator::new(engine.clone());
//!
//! animator
//!     .chained(&view)
//!     .add(animator.sequential(&view).transform_rotation(0.3, 90.0))
//!     .add(animator.composite(&view, 0.5).transform_scale(2.0, 2.0).action_alpha(0.5))
//!     .looping(true)
//!     .start_animation()?;
//!
//! loop {
//!     engine.advance(1.0 / 60.0);
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`geometry`]：点、矩形、仿射变换
//! - [`view`]：目标视图接口
//! - [`unit`]：动画单元（变换或动作）
//! - [`engine`]：播放引擎接口和虚拟时钟引擎
//! - [`playback`]：三种构建器
//! - [`options`]：播放前检查策略
//! - [`error`]：错误类型定义

pub mod animator;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod options;
pub mod playback;
pub mod unit;
pub mod view;

// 重导出核心类型
pub use animator::Animator;
pub use engine::{
    Completion, EngineOptions, MutationBlock, PlaybackEngine, PlaybackId, PlaybackOutcome,
    PlaybackRecord, TimelineEngine,
};
pub use error::{AnimResult, AnimationError, AnimationKind};
pub use geometry::{AffineTransform, Point, Rect, Size, degrees_to_radians};
pub use options::{DurationPolicy, EmptyPolicy, PlaybackOptions};
pub use playback::{ChainState, ChainedAnimation, CompositeAnimation, Playable, SequentialAnimation};
pub use unit::{AnimationUnit, CustomAction, Mutation, ViewAction};
pub use view::{BasicView, Position, TargetView, ViewGeometry, ViewRef, view_ref};
