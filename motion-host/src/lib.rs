//! # Host 层
//!
//! `motion-runtime` 的无界面宿主实现。
//!
//! ## 架构说明
//!
//! Host 层负责：
//! - 配置加载与验证
//! - 视图树（画布、兄弟视图、层级）
//! - 用虚拟时钟引擎驱动演示动画并输出报告
//!
//! Host 层不包含动画编排逻辑，只负责提供视图和推进时钟。

pub mod config;
pub mod demo;
pub mod scene;

pub use config::{AppConfig, ConfigError, DebugConfig, DemoConfig, SceneConfig, ViewConfig};
pub use demo::{Demo, DemoError, DemoReport, Scenario, run_scenario};
pub use scene::{Scene, SceneView, ViewSnapshot};
