//! # Engine 模块
//!
//! 播放引擎接口。
//!
//! 插值、帧时序和渲染全部由宿主框架负责；本库只打包变更闭包，
//! 交给引擎执行，并在完成回调里推进自己的状态。
//!
//! ```text
//! Builder                        PlaybackEngine
//!    │                                 │
//!    │── animate(d, mutate, done) ───►│  执行 mutate，经过 d 秒
//!    │◄──────────── done(finished) ────│
//! ```

mod timeline;

pub use timeline::{EngineOptions, PlaybackId, PlaybackOutcome, PlaybackRecord, TimelineEngine};

/// 变更闭包：在一次动画调用内执行的全部视觉修改
pub type MutationBlock = Box<dyn FnOnce()>;

/// 完成回调：参数表示动画是否正常播放完毕
pub type Completion = Box<dyn FnOnce(bool)>;

/// 播放引擎
///
/// 对应宿主框架的 `animate(withDuration:animations:completion:)`。
///
/// ## 约定
///
/// - `mutate` 恰好执行一次
/// - `completion` 恰好调用一次，可以同步调用也可以异步调用
/// - 时长原样接受，负数和零的处理方式由引擎自己决定
pub trait PlaybackEngine {
    fn animate(&self, duration: f64, mutate: MutationBlock, completion: Completion);
}
