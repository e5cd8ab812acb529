//! # Timeline 模块
//!
//! 基于虚拟时钟的确定性播放引擎。
//!
//! 不做插值：变更闭包在调用时立即提交（与宿主框架的模型层一致），
//! 完成回调在虚拟时钟越过 `开始时间 + 时长` 后送达。
//! 适合无界面宿主和测试驱动播放。
//!
//! ```rust,ignore
//! let engine = Rc::new(TimelineEngine::new());
//! engine.animate(0.3, Box::new(|| {}), Box::new(|finished| assert!(finished)));
//! engine.advance(0.3);
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::{Completion, MutationBlock, PlaybackEngine};

/// 引擎选项
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    /// 时间缩放倍率（计划完成时间 = 时长 × 倍率）
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,

    /// 零时长或负时长的动画是否同步完成
    #[serde(default)]
    pub immediate_zero_duration: bool,

    /// 单次 `advance` 最多送达的完成回调数
    ///
    /// 零时长的无限循环动画会在同一时刻不断产生新回调，需要上限。
    #[serde(default = "default_delivery_budget")]
    pub delivery_budget: usize,

    /// 最多保留的调用记录数
    ///
    /// 超出时丢弃最早的已完成记录，进行中的记录始终保留。
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

fn default_time_scale() -> f64 {
    1.0
}

fn default_delivery_budget() -> usize {
    10_000
}

fn default_max_records() -> usize {
    100_000
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            time_scale: default_time_scale(),
            immediate_zero_duration: false,
            delivery_budget: default_delivery_budget(),
            max_records: default_max_records(),
        }
    }
}

/// 播放 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaybackId(pub u64);

/// 单次播放的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackOutcome {
    /// 尚未完成
    #[default]
    Pending,
    /// 正常完成
    Finished,
    /// 被跳过（以 `true` 提前完成）
    Skipped,
    /// 被取消（以 `false` 提前完成）
    Cancelled,
}

impl PlaybackOutcome {
    /// 完成回调收到的 `finished` 参数
    pub fn finished_flag(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// 一次 `animate` 调用的记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackRecord {
    pub id: PlaybackId,
    /// 开始时间（虚拟时钟，秒）
    pub started_at: f64,
    /// 调用方请求的原始时长
    pub duration: f64,
    /// 计划完成时间
    pub due_at: f64,
    /// 实际完成时间
    pub finished_at: Option<f64>,
    pub outcome: PlaybackOutcome,
}

/// 进行中的播放
struct InFlight {
    id: PlaybackId,
    due_at: f64,
    completion: Completion,
}

#[derive(Default)]
struct TimelineState {
    now: f64,
    next_id: u64,
    in_flight: Vec<InFlight>,
    /// 按 ID 递增排列
    records: VecDeque<PlaybackRecord>,
}

impl TimelineState {
    fn next_id(&mut self) -> PlaybackId {
        self.next_id += 1;
        PlaybackId(self.next_id)
    }

    /// 取出最早到期的播放（到期时间相同则按开始顺序）
    fn take_earliest(&mut self, limit: f64) -> Option<InFlight> {
        let index = self
            .in_flight
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due_at <= limit)
            .min_by(|(_, a), (_, b)| a.due_at.total_cmp(&b.due_at).then(a.id.cmp(&b.id)))
            .map(|(index, _)| index)?;
        Some(self.in_flight.remove(index))
    }

    fn earliest_due(&self) -> Option<f64> {
        self.in_flight
            .iter()
            .map(|entry| entry.due_at)
            .filter(|due| due.is_finite())
            .min_by(f64::total_cmp)
    }

    fn finish(&mut self, id: PlaybackId, outcome: PlaybackOutcome) {
        let now = self.now;
        if let Ok(index) = self.records.binary_search_by_key(&id, |r| r.id) {
            let record = &mut self.records[index];
            record.finished_at = Some(now);
            record.outcome = outcome;
        }
    }

    /// 丢弃最早的已完成记录，直到不超过 `max`
    fn trim_records(&mut self, max: usize) {
        while self.records.len() > max {
            let front_finished = self
                .records
                .front()
                .is_some_and(|r| r.outcome != PlaybackOutcome::Pending);
            if front_finished {
                self.records.pop_front();
                continue;
            }
            let Some(index) = self
                .records
                .iter()
                .position(|r| r.outcome != PlaybackOutcome::Pending)
            else {
                break;
            };
            self.records.remove(index);
        }
    }
}

/// 虚拟时钟播放引擎
///
/// 所有用户闭包（变更、完成回调）执行期间都不持有内部借用，
/// 闭包里可以再次调用 `animate`。
pub struct TimelineEngine {
    state: RefCell<TimelineState>,
    options: EngineOptions,
}

impl Default for TimelineEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TimelineEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TimelineEngine")
            .field("now", &state.now)
            .field("in_flight", &state.in_flight.len())
            .field("records", &state.records.len())
            .finish()
    }
}

impl TimelineEngine {
    /// 创建新的引擎
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    /// 使用指定选项创建引擎
    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            state: RefCell::new(TimelineState::default()),
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    // ========== 时钟 ==========

    /// 推进虚拟时钟
    ///
    /// 送达期间时钟会先对齐到每个回调的计划完成时间，
    /// 因此回调里启动的下一个动画从上一个动画结束的时刻开始计时。
    /// 达到送达上限时，时钟停在最早未送达回调的计划完成时间。
    ///
    /// # 返回
    /// 本次送达的完成回调数
    pub fn advance(&self, dt: f64) -> usize {
        let target = self.now() + dt.max(0.0);
        let mut delivered = 0;
        let mut exhausted = false;

        loop {
            if delivered >= self.options.delivery_budget {
                exhausted = true;
                break;
            }
            if !self.deliver_next(target) {
                break;
            }
            delivered += 1;
        }

        let mut state = self.state.borrow_mut();
        let undelivered = state
            .in_flight
            .iter()
            .map(|entry| entry.due_at)
            .filter(|due| *due <= target)
            .min_by(f64::total_cmp);
        match undelivered.filter(|_| exhausted) {
            Some(due) => {
                warn!(
                    budget = self.options.delivery_budget,
                    clock = due,
                    "单次推进送达的回调数达到上限，剩余回调留到下次推进"
                );
                state.now = state.now.max(due);
            }
            None => state.now = state.now.max(target),
        }
        delivered
    }

    /// 持续推进直到没有进行中的播放
    ///
    /// 无限循环的动画永远不会空闲，因此需要 `max_deliveries` 上限。
    /// 计划完成时间为无穷大的播放不会被送达。
    pub fn run_until_idle(&self, max_deliveries: usize) -> usize {
        let mut delivered = 0;
        while delivered < max_deliveries {
            let Some(due) = self.state.borrow().earliest_due() else {
                break;
            };
            if !self.deliver_next(due) {
                break;
            }
            delivered += 1;
        }
        delivered
    }

    /// 立即完成所有进行中的播放（`finished = true`）
    ///
    /// 只处理调用时已存在的播放，回调里新启动的播放保持进行中。
    pub fn skip_all(&self) -> usize {
        self.flush(PlaybackOutcome::Skipped)
    }

    /// 取消所有进行中的播放（`finished = false`）
    pub fn cancel_all(&self) -> usize {
        self.flush(PlaybackOutcome::Cancelled)
    }

    fn flush(&self, outcome: PlaybackOutcome) -> usize {
        let mut pending = std::mem::take(&mut self.state.borrow_mut().in_flight);
        pending.sort_by(|a, b| a.due_at.total_cmp(&b.due_at).then(a.id.cmp(&b.id)));

        let count = pending.len();
        for entry in pending {
            self.state.borrow_mut().finish(entry.id, outcome);
            trace!(id = entry.id.0, outcome = ?outcome, "提前结束播放");
            (entry.completion)(outcome.finished_flag());
        }
        count
    }

    /// 送达一个到期回调，没有到期回调时返回 `false`
    fn deliver_next(&self, limit: f64) -> bool {
        let entry = {
            let mut state = self.state.borrow_mut();
            let Some(entry) = state.take_earliest(limit) else {
                return false;
            };
            state.now = state.now.max(entry.due_at);
            state.finish(entry.id, PlaybackOutcome::Finished);
            entry
        };

        trace!(id = entry.id.0, due_at = entry.due_at, "送达完成回调");
        (entry.completion)(true);
        true
    }

    // ========== 查询 ==========

    /// 当前虚拟时间（秒）
    pub fn now(&self) -> f64 {
        self.state.borrow().now
    }

    /// 进行中的播放数量
    pub fn in_flight(&self) -> usize {
        self.state.borrow().in_flight.len()
    }

    /// 是否没有进行中的播放
    pub fn is_idle(&self) -> bool {
        self.in_flight() == 0
    }

    /// `animate` 被调用的总次数（不受记录清理影响）
    pub fn call_count(&self) -> usize {
        self.state.borrow().next_id as usize
    }

    /// 当前保留的记录数
    pub fn record_count(&self) -> usize {
        self.state.borrow().records.len()
    }

    /// 保留记录中请求的时长之和
    pub fn total_requested_duration(&self) -> f64 {
        self.state.borrow().records.iter().map(|r| r.duration).sum()
    }

    /// 保留的调用记录（按调用顺序）
    pub fn records(&self) -> Vec<PlaybackRecord> {
        self.state.borrow().records.iter().cloned().collect()
    }

    /// 清空记录（不影响进行中的播放）
    pub fn clear_records(&self) {
        let mut state = self.state.borrow_mut();
        let TimelineState {
            records, in_flight, ..
        } = &mut *state;
        records.retain(|r| in_flight.iter().any(|entry| entry.id == r.id));
    }
}

impl PlaybackEngine for TimelineEngine {
    fn animate(&self, duration: f64, mutate: MutationBlock, completion: Completion) {
        mutate();

        let immediate =
            self.options.immediate_zero_duration && (duration.is_nan() || duration <= 0.0);

        let mut state = self.state.borrow_mut();
        let id = state.next_id();
        let started_at = state.now;
        let due_at = started_at + duration.max(0.0) * self.options.time_scale;
        state.records.push_back(PlaybackRecord {
            id,
            started_at,
            duration,
            due_at,
            finished_at: None,
            outcome: PlaybackOutcome::Pending,
        });

        if immediate {
            state.finish(id, PlaybackOutcome::Finished);
            state.trim_records(self.options.max_records);
            drop(state);
            trace!(id = id.0, duration = duration, "零时长播放，同步完成");
            completion(true);
        } else {
            state.in_flight.push(InFlight {
                id,
                due_at,
                completion,
            });
            state.trim_records(self.options.max_records);
            trace!(id = id.0, duration = duration, due_at = due_at, "开始播放");
        }
    }
}
