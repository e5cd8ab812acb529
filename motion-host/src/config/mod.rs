//! # Config 模块
//!
//! 宿主配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (config.json)
//! 3. 默认值（最低）

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use motion_runtime::{EngineOptions, PlaybackOptions, Rect, Size};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};

/// 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// 播放前检查策略
    #[serde(default)]
    pub playback: PlaybackOptions,

    /// 虚拟时钟引擎选项
    #[serde(default)]
    pub engine: EngineOptions,

    /// 场景配置
    #[serde(default)]
    pub scene: SceneConfig,

    /// 演示配置
    #[serde(default)]
    pub demo: DemoConfig,

    /// 调试配置
    #[serde(default)]
    pub debug: DebugConfig,
}

/// 场景配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// 画布尺寸
    #[serde(default = "default_canvas")]
    pub canvas: Size,

    /// 初始视图（从下到上）
    #[serde(default = "default_views")]
    pub views: Vec<ViewConfig>,
}

/// 单个视图的初始状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    pub name: String,
    pub frame: Rect,
    #[serde(default = "default_alpha")]
    pub alpha: f64,
}

impl ViewConfig {
    pub fn new(name: impl Into<String>, frame: Rect) -> Self {
        Self {
            name: name.into(),
            frame,
            alpha: default_alpha(),
        }
    }
}

/// 演示配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoConfig {
    /// 每次推进虚拟时钟的步长（秒）
    #[serde(default = "default_step")]
    pub step: f64,

    /// 播放轮数
    #[serde(default = "default_cycles")]
    pub cycles: u32,

    /// 最多推进次数，超过视为卡住
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

/// 调试配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// 日志级别（error / warn / info / debug / trace / off）
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl DebugConfig {
    /// 解析后的日志级别，无法解析时回退到 INFO
    pub fn level_filter(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::INFO)
    }
}

// 默认值函数
fn default_canvas() -> Size {
    Size::new(800.0, 600.0)
}

fn default_views() -> Vec<ViewConfig> {
    vec![
        ViewConfig::new("backdrop", Rect::new(0.0, 0.0, 800.0, 600.0)),
        ViewConfig::new("card", Rect::new(340.0, 240.0, 120.0, 120.0)),
        ViewConfig::new("badge", Rect::new(40.0, 40.0, 48.0, 48.0)),
    ]
}

fn default_alpha() -> f64 {
    1.0
}

fn default_step() -> f64 {
    1.0 / 60.0
}

fn default_cycles() -> u32 {
    3
}

fn default_max_steps() -> usize {
    100_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas: default_canvas(),
            views: default_views(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            step: default_step(),
            cycles: default_cycles(),
            max_steps: default_max_steps(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并输出警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => {
                info!(path = ?path, "配置文件加载成功");
                config
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "配置文件加载失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 加载配置文件，失败时返回错误
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.engine.time_scale.is_finite() && self.engine.time_scale > 0.0) {
            return Err(ConfigError::Validation(format!(
                "engine.time_scale 必须为正数: {}",
                self.engine.time_scale
            )));
        }
        if self.engine.delivery_budget == 0 {
            return Err(ConfigError::Validation(
                "engine.delivery_budget 不能为 0".to_string(),
            ));
        }
        if self.engine.max_records == 0 {
            return Err(ConfigError::Validation(
                "engine.max_records 不能为 0".to_string(),
            ));
        }

        // 检查画布
        let canvas = self.scene.canvas;
        if !(canvas.width > 0.0 && canvas.height > 0.0) {
            return Err(ConfigError::Validation(format!(
                "画布尺寸必须为正数: {} x {}",
                canvas.width, canvas.height
            )));
        }

        // 检查视图
        let mut names = HashSet::new();
        for view in &self.scene.views {
            if view.name.is_empty() {
                return Err(ConfigError::Validation("视图名称不能为空".to_string()));
            }
            if !names.insert(view.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "视图名称重复: {}",
                    view.name
                )));
            }
            if !(0.0..=1.0).contains(&view.alpha) {
                return Err(ConfigError::Validation(format!(
                    "视图 {} 的透明度必须在 0.0 - 1.0 之间",
                    view.name
                )));
            }
        }

        if !(self.demo.step.is_finite() && self.demo.step > 0.0) {
            return Err(ConfigError::Validation(format!(
                "demo.step 必须为正数: {}",
                self.demo.step
            )));
        }
        if self.demo.cycles == 0 {
            return Err(ConfigError::Validation("demo.cycles 不能为 0".to_string()));
        }

        if LevelFilter::from_str(&self.debug.log_level).is_err() {
            return Err(ConfigError::Validation(format!(
                "无法识别的日志级别: {}",
                self.debug.log_level
            )));
        }

        Ok(())
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(#[from] std::io::Error),
    /// 解析或序列化失败
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    Validation(String),
}
