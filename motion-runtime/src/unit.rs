//! # Unit 模块
//!
//! 单个动画步骤的描述：一个视觉变更 + 时长。纯数据，不含播放逻辑。

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::geometry::{AffineTransform, Point};
use crate::view::{Position, TargetView, ViewRef};

/// 自定义动作闭包
#[derive(Clone)]
pub struct CustomAction(Rc<dyn Fn(&dyn TargetView)>);

impl CustomAction {
    pub fn new(action: impl Fn(&dyn TargetView) + 'static) -> Self {
        Self(Rc::new(action))
    }

    pub fn call(&self, view: &dyn TargetView) {
        (self.0)(view)
    }
}

impl fmt::Debug for CustomAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomAction(..)")
    }
}

/// 作用于视图状态的动作
#[derive(Debug, Clone)]
pub enum ViewAction {
    /// 绝对定位（设置中心点）
    SetCenter(Point),
    /// 相对平移中心点
    Translate { dx: f64, dy: f64 },
    /// 以中心为锚点缩放 frame
    ScaleFrame { sx: f64, sy: f64 },
    /// 设置透明度
    Alpha(f64),
    /// 调整层级
    MoveTo(Position),
    /// 任意闭包
    Custom(CustomAction),
}

impl ViewAction {
    /// 在视图上执行动作
    pub fn apply(&self, view: &dyn TargetView) {
        match self {
            Self::SetCenter(center) => view.set_center(*center),
            Self::Translate { dx, dy } => {
                let center = view.center();
                view.set_center(center.offset(*dx, *dy));
            }
            Self::ScaleFrame { sx, sy } => {
                let center = view.center();
                view.set_frame(view.frame().scaled(*sx, *sy));
                view.set_center(center);
            }
            Self::Alpha(alpha) => view.set_alpha(*alpha),
            Self::MoveTo(position) => view.move_to(*position),
            Self::Custom(action) => action.call(view),
        }
    }
}

/// 视觉变更：变换或动作二选一
#[derive(Debug, Clone)]
pub enum Mutation {
    /// 把视图变换设为给定值
    Transform(AffineTransform),
    /// 执行动作
    Action(ViewAction),
}

impl Mutation {
    /// 在视图上执行变更
    pub fn apply(&self, view: &dyn TargetView) {
        match self {
            Self::Transform(transform) => view.set_transform(*transform),
            Self::Action(action) => action.apply(view),
        }
    }

    /// 通过弱引用执行；视图已释放时什么也不做
    pub fn apply_to(&self, view: &ViewRef) {
        match view.upgrade() {
            Some(view) => self.apply(view.as_ref()),
            None => trace!("目标视图已释放，跳过变更"),
        }
    }
}

/// 动画单元
#[derive(Debug, Clone)]
pub struct AnimationUnit {
    /// 视觉变更
    pub mutation: Mutation,
    /// 时长（秒），原样传给播放引擎
    pub duration: f64,
}

impl AnimationUnit {
    /// 创建变换单元
    pub fn transform(transform: AffineTransform, duration: f64) -> Self {
        Self {
            mutation: Mutation::Transform(transform),
            duration,
        }
    }

    /// 创建动作单元
    pub fn action(action: ViewAction, duration: f64) -> Self {
        Self {
            mutation: Mutation::Action(action),
            duration,
        }
    }

    /// 是否为变换单元
    pub fn is_transform(&self) -> bool {
        matches!(self.mutation, Mutation::Transform(_))
    }
}
