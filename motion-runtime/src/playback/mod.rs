//! # Playback 模块
//!
//! 三种动画构建器和它们共同的播放接口。
//!
//! - [`SequentialAnimation`]: 逐个播放，每一步完成后启动下一步
//! - [`CompositeAnimation`]: 所有变更在一次引擎调用内同时播放
//! - [`ChainedAnimation`]: 依次播放若干子动画，可选无限循环
//!
//! 链式动画只通过 [`Playable`] 调度子动画，不做运行时类型判断。

mod chained;
mod composite;
mod driver;
mod sequential;

pub use chained::{ChainState, ChainedAnimation};
pub use composite::CompositeAnimation;
pub use sequential::SequentialAnimation;

use crate::engine::Completion;
use crate::error::{AnimResult, AnimationKind};

/// 可播放的动画
pub trait Playable {
    /// 动画种类
    fn kind(&self) -> AnimationKind;

    /// 播放前检查（空动画、时长）
    ///
    /// 返回 `Ok(false)` 表示按策略跳过，不会播放。
    fn validate(&self) -> AnimResult<bool>;

    /// 跳过检查直接播放
    ///
    /// 调用方负责先调用 `validate`。
    fn play(&self, completion: Completion) -> AnimResult<()>;

    /// 检查后开始播放
    ///
    /// 通过检查后才会调用引擎；被跳过或出错时 `completion` 不会被调用。
    fn start(&self, completion: Completion) -> AnimResult<()> {
        if !self.validate()? {
            return Ok(());
        }
        self.play(completion)
    }

    /// 一次播放请求的总时长（秒）
    fn total_duration(&self) -> f64;

    /// 一次播放调用引擎的次数
    fn engine_calls(&self) -> usize;
}
