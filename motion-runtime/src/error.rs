//! # Error 模块
//!
//! 定义 motion-runtime 中使用的错误类型。
//!
//! 所有错误都在播放开始前检查，播放过程中不会产生错误。

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 动画种类（用于错误信息和日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Sequential,
    Composite,
    Chained,
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sequential => "sequential",
            Self::Composite => "composite",
            Self::Chained => "chained",
        };
        f.write_str(name)
    }
}

/// 动画错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// 没有任何动画单元
    #[error("{kind} 动画没有任何动画单元")]
    EmptyAnimationSet { kind: AnimationKind },

    /// 链式动画没有任何子动画
    #[error("链式动画没有任何子动画")]
    EmptyChain,

    /// 时长为负数或非有限值
    #[error("无效的动画时长: {duration}")]
    InvalidDuration { duration: f64 },

    /// 链式动画正在播放
    #[error("链式动画正在播放，不能重复启动")]
    AlreadyPlaying,
}

/// Result 类型别名
pub type AnimResult<T> = Result<T, AnimationError>;
