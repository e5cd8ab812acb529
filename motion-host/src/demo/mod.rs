//! # Demo 模块
//!
//! 内置演示：在无界面场景上用虚拟时钟引擎播放动画，并生成播放报告。
//!
//! ## 演示列表
//!
//! - `pulse`：卡片缩放 + 淡入淡出，无限循环
//! - `tour`：徽标沿画布四角巡游，逐步旋转
//! - `showcase`：串联多个视图的顺序动画和组合动画，包含层级调整

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use clap::ValueEnum;
use motion_runtime::{
    AnimationError, Animator, ChainState, ChainedAnimation, PlaybackRecord, Position,
    TargetView, TimelineEngine,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{AppConfig, DemoConfig};
use crate::scene::{Scene, SceneView, ViewSnapshot};

/// 徽标与画布边缘的距离
const TOUR_MARGIN: f64 = 64.0;

/// 演示场景
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// 卡片脉冲（循环链）
    Pulse,
    /// 徽标巡游（顺序动画）
    Tour,
    /// 综合演示（顺序 + 组合 + 层级）
    Showcase,
}

impl Scenario {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pulse => "pulse",
            Self::Tour => "tour",
            Self::Showcase => "showcase",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 演示错误
#[derive(Debug, Error)]
pub enum DemoError {
    #[error("场景中没有视图: {0}")]
    MissingView(String),
    #[error("动画启动失败: {0}")]
    Animation(#[from] AnimationError),
    #[error("推进 {steps} 次后仍未完成 {cycles} 轮播放")]
    Stalled { steps: usize, cycles: u32 },
}

/// 播放报告
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub scenario: Scenario,
    /// 完成的轮数
    pub cycles: u32,
    /// 推进虚拟时钟的次数
    pub steps: usize,
    /// 虚拟时间（秒）
    pub elapsed: f64,
    pub engine_calls: usize,
    pub requested_duration: f64,
    /// 结束时仍在进行的播放
    pub in_flight: usize,
    /// 视图层级（从下到上）
    pub z_order: Vec<String>,
    pub views: Vec<ViewSnapshot>,
    pub records: Vec<PlaybackRecord>,
}

impl fmt::Display for DemoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "演示: {} ({} 轮, 推进 {} 次, 虚拟时间 {:.3}s)",
            self.scenario, self.cycles, self.steps, self.elapsed
        )?;
        writeln!(
            f,
            "引擎调用 {} 次, 请求总时长 {:.3}s, 进行中 {}",
            self.engine_calls, self.requested_duration, self.in_flight
        )?;
        for record in &self.records {
            let finished = record
                .finished_at
                .map(|t| format!("{t:.3}"))
                .unwrap_or_else(|| "-".to_string());
            writeln!(
                f,
                "  #{:<4} {:>8.3} -> {:>8}  {:<9} ({:.3}s)",
                record.id.0,
                record.started_at,
                finished,
                format!("{:?}", record.outcome).to_lowercase(),
                record.duration
            )?;
        }
        for view in &self.views {
            writeln!(
                f,
                "  [{}] {:<10} center=({:.1}, {:.1}) size={:.1}x{:.1} alpha={:.2}",
                view.z_index,
                view.name,
                view.geometry.frame.center().x,
                view.geometry.frame.center().y,
                view.geometry.frame.width(),
                view.geometry.frame.height(),
                view.geometry.alpha
            )?;
        }
        write!(f, "层级: {}", self.z_order.join(" < "))
    }
}

/// 演示运行器
///
/// 持有引擎、工厂和场景；每次 `run` 都在同一个场景上继续播放。
pub struct Demo {
    engine: Rc<TimelineEngine>,
    animator: Animator,
    scene: Rc<Scene>,
    settings: DemoConfig,
}

impl Demo {
    pub fn new(config: &AppConfig) -> Self {
        let engine = Rc::new(TimelineEngine::with_options(config.engine));
        let animator = Animator::new(engine.clone()).with_options(config.playback);
        Self {
            engine,
            animator,
            scene: Scene::from_config(&config.scene),
            settings: config.demo.clone(),
        }
    }

    pub fn engine(&self) -> &Rc<TimelineEngine> {
        &self.engine
    }

    pub fn scene(&self) -> &Rc<Scene> {
        &self.scene
    }

    fn view(&self, name: &str) -> Result<Rc<SceneView>, DemoError> {
        self.scene
            .view(name)
            .ok_or_else(|| DemoError::MissingView(name.to_string()))
    }

    /// 构建演示动画
    ///
    /// 每播放完一轮 `passes` 加一。
    pub fn build(
        &self,
        scenario: Scenario,
        passes: Rc<Cell<u32>>,
    ) -> Result<ChainedAnimation, DemoError> {
        let chain = match scenario {
            Scenario::Pulse => self.pulse()?,
            Scenario::Tour => self.tour()?,
            Scenario::Showcase => self.showcase()?,
        };
        Ok(chain.on_complete(move || passes.set(passes.get() + 1)))
    }

    fn pulse(&self) -> Result<ChainedAnimation, DemoError> {
        let card = self.view("card")?;
        let animator = &self.animator;

        Ok(animator
            .chained(&card)
            .looping(true)
            .add(
                animator
                    .composite(&card, 0.3)
                    .transform_scale(1.2, 1.2)
                    .action_alpha(0.6),
            )
            .add(
                animator
                    .composite(&card, 0.3)
                    .transform_identity()
                    .action_alpha(1.0),
            ))
    }

    fn tour(&self) -> Result<ChainedAnimation, DemoError> {
        let badge = self.view("badge")?;
        let canvas = self.scene.canvas();
        let home = badge.center();
        let (left, top) = (TOUR_MARGIN, TOUR_MARGIN);
        let (right, bottom) = (canvas.width - TOUR_MARGIN, canvas.height - TOUR_MARGIN);

        let tour = self
            .animator
            .sequential(&badge)
            .action_move_to(0.0, Position::Front)
            .action_position(0.4, right, top)
            .transform_rotation(0.2, 90.0)
            .action_position(0.4, right, bottom)
            .transform_rotation(0.2, 180.0)
            .action_position(0.4, left, bottom)
            .transform_rotation(0.2, 270.0)
            .action_position(0.4, home.x, home.y)
            .transform_identity(0.2);

        Ok(self.animator.chained(&badge).add(tour))
    }

    fn showcase(&self) -> Result<ChainedAnimation, DemoError> {
        let card = self.view("card")?;
        let badge = self.view("badge")?;
        let backdrop = self.view("backdrop")?;
        let animator = &self.animator;
        let card_center = card.center();
        let badge_home = badge.center();

        let grow = animator
            .sequential(&card)
            .action_scale(0.3, 1.5, 1.5)
            .action_alpha(0.2, 0.8)
            .transform_rotation(0.3, 15.0);
        let badge_in = animator
            .composite(&badge, 0.5)
            .transform_rotation(45.0)
            .transform_scale(1.5, 1.5)
            .action_position(card_center.x, card_center.y)
            .action_move_to(Position::Front);
        let dim = animator
            .composite(&backdrop, 0.4)
            .action_alpha(0.5)
            .action_move_to(Position::Back);
        let restore = animator
            .composite(&card, 0.3)
            .transform_identity()
            .action_scale(1.0 / 1.5, 1.0 / 1.5)
            .action_alpha(1.0);
        let badge_out = animator
            .composite(&badge, 0.3)
            .transform_identity()
            .action_position(badge_home.x, badge_home.y);
        let brighten = animator.composite(&backdrop, 0.2).action_alpha(1.0);

        Ok(animator
            .chained(&card)
            .add(grow)
            .add(badge_in)
            .add(dim)
            .add(restore)
            .add(badge_out)
            .add(brighten))
    }

    /// 播放指定轮数并生成报告
    ///
    /// 非循环动画播放完一轮后重新开始，直到完成 `cycles` 轮。
    pub fn run(&self, scenario: Scenario, cycles: u32) -> Result<DemoReport, DemoError> {
        let passes = Rc::new(Cell::new(0));
        let chain = self.build(scenario, passes.clone())?;

        info!(
            scenario = %scenario,
            cycles = cycles,
            segments = chain.len(),
            cycle_duration = chain.cycle_duration(),
            "开始演示"
        );

        let started_at = self.engine.now();
        let calls_before = self.engine.call_count();
        chain.start_animation()?;

        let mut steps = 0;
        while passes.get() < cycles {
            if steps >= self.settings.max_steps {
                return Err(DemoError::Stalled { steps, cycles });
            }
            steps += 1;

            if chain.state() == ChainState::Completed {
                debug!(passes = passes.get(), "重新开始演示动画");
                chain.start_animation()?;
                continue;
            }
            if self.engine.is_idle() {
                return Err(DemoError::Stalled { steps, cycles });
            }
            self.engine.advance(self.settings.step);
        }

        // 播放 ID 从 1 开始连续分配，本次演示的记录 ID 都大于 calls_before
        let first_id = calls_before as u64;
        let records: Vec<PlaybackRecord> = self
            .engine
            .records()
            .into_iter()
            .filter(|record| record.id.0 > first_id)
            .collect();
        let report = DemoReport {
            scenario,
            cycles: passes.get(),
            steps,
            elapsed: self.engine.now() - started_at,
            engine_calls: self.engine.call_count() - calls_before,
            requested_duration: records.iter().map(|r| r.duration).sum(),
            in_flight: self.engine.in_flight(),
            z_order: self.scene.z_order(),
            views: self.scene.snapshot(),
            records,
        };

        info!(
            scenario = %scenario,
            steps = report.steps,
            engine_calls = report.engine_calls,
            "演示完成"
        );
        Ok(report)
    }
}

/// 按配置运行一个演示
///
/// `cycles` 为 `None` 时使用配置中的轮数。
pub fn run_scenario(
    config: &AppConfig,
    scenario: Scenario,
    cycles: Option<u32>,
) -> Result<DemoReport, DemoError> {
    let demo = Demo::new(config);
    demo.run(scenario, cycles.unwrap_or(config.demo.cycles))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_names() {
        assert_eq!(Scenario::Pulse.to_string(), "pulse");
        assert_eq!(
            Scenario::from_str("showcase", true).unwrap(),
            Scenario::Showcase
        );
        assert_eq!(
            serde_json::to_string(&Scenario::Tour).unwrap(),
            "\"tour\""
        );
    }

    #[test]
    fn test_pulse_counts_cycles() {
        let config = AppConfig::default();
        let report = run_scenario(&config, Scenario::Pulse, Some(4)).unwrap();

        assert_eq!(report.cycles, 4);
        // 每轮两个组合动画，下一轮的第一个已经开始
        assert_eq!(report.engine_calls, 4 * 2 + 1);
        assert_eq!(report.in_flight, 1);
    }

    #[test]
    fn test_tour_returns_home() {
        let config = AppConfig::default();
        let demo = Demo::new(&config);
        let badge = demo.scene().view("badge").unwrap();
        let home = badge.center();

        let report = demo.run(Scenario::Tour, 1).unwrap();

        assert_eq!(report.engine_calls, 9);
        assert_eq!(report.in_flight, 0);
        assert_eq!(badge.center(), home);
        assert!(badge.transform().is_identity());
        assert_eq!(report.z_order.last().map(String::as_str), Some("badge"));
    }

    #[test]
    fn test_missing_view() {
        let mut config = AppConfig::default();
        config.scene.views.retain(|view| view.name != "card");

        assert!(matches!(
            run_scenario(&config, Scenario::Pulse, None),
            Err(DemoError::MissingView(name)) if name == "card"
        ));
    }

    #[test]
    fn test_report_text() {
        let config = AppConfig::default();
        let report = run_scenario(&config, Scenario::Pulse, Some(1)).unwrap();
        let text = report.to_string();

        assert!(text.starts_with("演示: pulse"));
        assert!(text.contains("层级: backdrop < card < badge"));
    }
}
