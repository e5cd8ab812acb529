//! # Options 模块
//!
//! 播放前检查的策略配置。

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AnimResult, AnimationError, AnimationKind};

/// 空动画的处理策略
///
/// 无论哪种策略，完成回调都不会被调用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPolicy {
    /// 静默忽略
    Ignore,
    /// 忽略并输出警告
    Warn,
    /// 返回错误
    #[default]
    Error,
}

/// 时长检查策略（负数、NaN、无穷大）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationPolicy {
    /// 原样传给播放引擎
    PassThrough,
    /// 原样传递并输出警告
    #[default]
    Warn,
    /// 返回 `InvalidDuration`
    Reject,
}

/// 播放选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackOptions {
    /// 空动画策略
    #[serde(default)]
    pub empty: EmptyPolicy,
    /// 时长策略
    #[serde(default)]
    pub durations: DurationPolicy,
}

/// 空动画检查结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyCheck {
    /// 有内容，可以播放
    Playable,
    /// 为空，按策略跳过
    Skip,
}

impl PlaybackOptions {
    /// 严格模式：空动画和非法时长都返回错误
    pub fn strict() -> Self {
        Self {
            empty: EmptyPolicy::Error,
            durations: DurationPolicy::Reject,
        }
    }

    /// 宽松模式：与宿主框架行为一致，全部放行
    pub fn lenient() -> Self {
        Self {
            empty: EmptyPolicy::Ignore,
            durations: DurationPolicy::PassThrough,
        }
    }

    /// 检查时长
    pub fn check_duration(&self, duration: f64) -> AnimResult<()> {
        if duration.is_finite() && duration >= 0.0 {
            return Ok(());
        }
        match self.durations {
            DurationPolicy::PassThrough => Ok(()),
            DurationPolicy::Warn => {
                warn!(duration = duration, "动画时长无效，原样传给播放引擎");
                Ok(())
            }
            DurationPolicy::Reject => Err(AnimationError::InvalidDuration { duration }),
        }
    }

    /// 检查空动画
    pub fn check_empty(&self, kind: AnimationKind, is_empty: bool) -> AnimResult<EmptyCheck> {
        if !is_empty {
            return Ok(EmptyCheck::Playable);
        }
        match self.empty {
            EmptyPolicy::Ignore => Ok(EmptyCheck::Skip),
            EmptyPolicy::Warn => {
                warn!(kind = %kind, "动画为空，忽略启动请求");
                Ok(EmptyCheck::Skip)
            }
            EmptyPolicy::Error => Err(match kind {
                AnimationKind::Chained => AnimationError::EmptyChain,
                kind => AnimationError::EmptyAnimationSet { kind },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = PlaybackOptions::default();
        assert_eq!(options.empty, EmptyPolicy::Error);
        assert_eq!(options.durations, DurationPolicy::Warn);
    }

    #[test]
    fn test_check_duration() {
        let strict = PlaybackOptions::strict();
        assert!(strict.check_duration(0.0).is_ok());
        assert!(strict.check_duration(1.5).is_ok());
        assert_eq!(
            strict.check_duration(-0.5),
            Err(AnimationError::InvalidDuration { duration: -0.5 })
        );
        assert!(strict.check_duration(f64::INFINITY).is_err());

        let lenient = PlaybackOptions::lenient();
        assert!(lenient.check_duration(-0.5).is_ok());
        assert!(PlaybackOptions::default().check_duration(-0.5).is_ok());
    }

    #[test]
    fn test_check_empty() {
        let options = PlaybackOptions::default();
        assert_eq!(
            options.check_empty(AnimationKind::Composite, false),
            Ok(EmptyCheck::Playable)
        );
        assert_eq!(
            options.check_empty(AnimationKind::Composite, true),
            Err(AnimationError::EmptyAnimationSet {
                kind: AnimationKind::Composite
            })
        );
        assert_eq!(
            options.check_empty(AnimationKind::Chained, true),
            Err(AnimationError::EmptyChain)
        );

        let lenient = PlaybackOptions::lenient();
        assert_eq!(
            lenient.check_empty(AnimationKind::Sequential, true),
            Ok(EmptyCheck::Skip)
        );
    }

    #[test]
    fn test_check_empty_warn_policy() {
        let warn = PlaybackOptions {
            empty: EmptyPolicy::Warn,
            ..PlaybackOptions::default()
        };
        assert_eq!(
            warn.check_empty(AnimationKind::Composite, true),
            Ok(EmptyCheck::Skip)
        );
        assert_eq!(
            warn.check_empty(AnimationKind::Chained, true),
            Ok(EmptyCheck::Skip)
        );
        assert_eq!(
            warn.check_empty(AnimationKind::Sequential, false),
            Ok(EmptyCheck::Playable)
        );
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: PlaybackOptions = serde_json::from_str(r#"{"durations":"reject"}"#).unwrap();
        assert_eq!(options.durations, DurationPolicy::Reject);
        assert_eq!(options.empty, EmptyPolicy::Error);

        let options: PlaybackOptions =
            serde_json::from_str(r#"{"empty":"warn","durations":"pass_through"}"#).unwrap();
        assert_eq!(options.empty, EmptyPolicy::Warn);
        assert_eq!(options.durations, DurationPolicy::PassThrough);
    }
}
