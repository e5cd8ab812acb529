//! # View 模块
//!
//! 动画目标视图的接口定义。
//!
//! ## 核心概念
//!
//! - `TargetView`: 宿主视图需要暴露的可变状态（变换、frame、透明度、层级）
//! - `Position`: 层级调整方向
//! - `ViewRef`: 构建器持有的非拥有引用
//!
//! ## 设计说明
//!
//! 与 `Animatable` 一样使用 `&self` 接口 + 内部可变性：
//! 动画闭包只持有视图的弱引用，视图的生命周期由宿主管理。

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::geometry::{AffineTransform, Point, Rect};

/// 层级调整方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// 移到兄弟视图最上层
    Front,
    /// 移到兄弟视图最下层
    Back,
}

/// 动画目标视图
///
/// 宿主视图实现此 trait 后即可被所有构建器驱动。
/// frame 是未应用 `transform` 的布局矩形，center 由 frame 推导。
pub trait TargetView: 'static {
    /// 当前仿射变换
    fn transform(&self) -> AffineTransform;

    /// 设置仿射变换
    fn set_transform(&self, transform: AffineTransform);

    /// 当前 frame
    fn frame(&self) -> Rect;

    /// 设置 frame
    fn set_frame(&self, frame: Rect);

    /// 当前中心点
    fn center(&self) -> Point {
        self.frame().center()
    }

    /// 移动中心点（尺寸不变）
    fn set_center(&self, center: Point) {
        let frame = self.frame();
        self.set_frame(frame.with_center(center));
    }

    /// 当前透明度
    fn alpha(&self) -> f64;

    /// 设置透明度
    fn set_alpha(&self, alpha: f64);

    /// 调整在兄弟视图中的层级
    fn move_to(&self, position: Position);
}

/// 构建器持有的视图引用（不拥有视图）
pub type ViewRef = Weak<dyn TargetView>;

/// 从强引用创建 `ViewRef`
pub fn view_ref<V: TargetView>(view: &Rc<V>) -> ViewRef {
    let view: Rc<dyn TargetView> = view.clone();
    Rc::downgrade(&view)
}

/// 视图几何状态
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewGeometry {
    pub transform: AffineTransform,
    pub frame: Rect,
    pub alpha: f64,
}

impl ViewGeometry {
    pub fn new(frame: Rect) -> Self {
        Self {
            transform: AffineTransform::identity(),
            frame,
            alpha: 1.0,
        }
    }
}

/// 独立的内存视图
///
/// 没有父视图和兄弟视图，层级请求只会被记录下来。
#[derive(Debug)]
pub struct BasicView {
    geometry: RefCell<ViewGeometry>,
    last_move: Cell<Option<Position>>,
}

impl BasicView {
    /// 创建新的视图
    pub fn new(frame: Rect) -> Self {
        Self {
            geometry: RefCell::new(ViewGeometry::new(frame)),
            last_move: Cell::new(None),
        }
    }

    /// 当前几何状态快照
    pub fn geometry(&self) -> ViewGeometry {
        *self.geometry.borrow()
    }

    /// 最近一次层级调整请求
    pub fn last_move(&self) -> Option<Position> {
        self.last_move.get()
    }
}

impl TargetView for BasicView {
    fn transform(&self) -> AffineTransform {
        self.geometry.borrow().transform
    }

    fn set_transform(&self, transform: AffineTransform) {
        self.geometry.borrow_mut().transform = transform;
    }

    fn frame(&self) -> Rect {
        self.geometry.borrow().frame
    }

    fn set_frame(&self, frame: Rect) {
        self.geometry.borrow_mut().frame = frame;
    }

    fn alpha(&self) -> f64 {
        self.geometry.borrow().alpha
    }

    fn set_alpha(&self, alpha: f64) {
        self.geometry.borrow_mut().alpha = alpha;
    }

    fn move_to(&self, position: Position) {
        self.last_move.set(Some(position));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_view_defaults() {
        let view = BasicView::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(view.transform().is_identity());
        assert_eq!(view.alpha(), 1.0);
        assert_eq!(view.last_move(), None);
    }

    #[test]
    fn test_set_center_keeps_size() {
        let view = BasicView::new(Rect::new(0.0, 0.0, 40.0, 20.0));
        view.set_center(Point::new(100.0, 100.0));

        assert_eq!(view.frame(), Rect::new(80.0, 90.0, 40.0, 20.0));
        assert_eq!(view.center(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_view_ref_does_not_own() {
        let view = Rc::new(BasicView::new(Rect::default()));
        let weak = view_ref(&view);
        assert!(weak.upgrade().is_some());

        drop(view);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_position_serialization() {
        let json = serde_json::to_string(&Position::Front).unwrap();
        assert_eq!(json, "\"front\"");
    }
}
