//! # Scene 模块
//!
//! 无界面的视图树：一张画布和若干兄弟视图。
//!
//! 视图按层级从下到上排列，`move_to` 会调整视图在兄弟中的位置。

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use motion_runtime::{AffineTransform, Position, Rect, Size, TargetView, ViewGeometry};
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::SceneConfig;

/// 场景中的视图
#[derive(Debug)]
pub struct SceneView {
    name: String,
    geometry: RefCell<ViewGeometry>,
    scene: Weak<Scene>,
}

impl SceneView {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 当前几何状态快照
    pub fn geometry(&self) -> ViewGeometry {
        *self.geometry.borrow()
    }
}

impl TargetView for SceneView {
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
        match self.scene.upgrade() {
            Some(scene) => scene.reorder(self, position),
            None => trace!(view = %self.name, "视图不在场景中，忽略层级调整"),
        }
    }
}

/// 视图快照（用于报告输出）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub name: String,
    /// 层级（0 为最下层）
    pub z_index: usize,
    #[serde(flatten)]
    pub geometry: ViewGeometry,
}

/// 场景
#[derive(Debug)]
pub struct Scene {
    canvas: Size,
    /// 从下到上
    views: RefCell<Vec<Rc<SceneView>>>,
}

impl Scene {
    /// 创建空场景
    pub fn new(canvas: Size) -> Rc<Self> {
        Rc::new(Self {
            canvas,
            views: RefCell::new(Vec::new()),
        })
    }

    /// 按配置创建场景
    pub fn from_config(config: &SceneConfig) -> Rc<Self> {
        let scene = Self::new(config.canvas);
        for view in &config.views {
            let added = scene.add_view(&view.name, view.frame);
            added.set_alpha(view.alpha);
        }
        debug!(views = config.views.len(), "场景创建完成");
        scene
    }

    /// 在最上层添加视图
    pub fn add_view(self: &Rc<Self>, name: impl Into<String>, frame: Rect) -> Rc<SceneView> {
        let view = Rc::new(SceneView {
            name: name.into(),
            geometry: RefCell::new(ViewGeometry::new(frame)),
            scene: Rc::downgrade(self),
        });
        self.views.borrow_mut().push(view.clone());
        view
    }

    /// 移除视图
    pub fn remove_view(&self, name: &str) -> Option<Rc<SceneView>> {
        let mut views = self.views.borrow_mut();
        let index = views.iter().position(|view| view.name == name)?;
        Some(views.remove(index))
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    /// 按名称查找视图
    pub fn view(&self, name: &str) -> Option<Rc<SceneView>> {
        self.views
            .borrow()
            .iter()
            .find(|view| view.name == name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.views.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.borrow().is_empty()
    }

    /// 视图名称（从下到上）
    pub fn z_order(&self) -> Vec<String> {
        self.views
            .borrow()
            .iter()
            .map(|view| view.name.clone())
            .collect()
    }

    /// 所有视图的快照（从下到上）
    pub fn snapshot(&self) -> Vec<ViewSnapshot> {
        self.views
            .borrow()
            .iter()
            .enumerate()
            .map(|(z_index, view)| ViewSnapshot {
                name: view.name.clone(),
                z_index,
                geometry: view.geometry(),
            })
            .collect()
    }

    fn reorder(&self, target: &SceneView, position: Position) {
        let mut views = self.views.borrow_mut();
        let Some(index) = views
            .iter()
            .position(|view| std::ptr::eq(Rc::as_ptr(view), target))
        else {
            trace!(view = %target.name, "视图已从场景移除，忽略层级调整");
            return;
        };

        let view = views.remove(index);
        match position {
            Position::Front => views.push(view),
            Position::Back => views.insert(0, view),
        }
        trace!(view = %target.name, position = ?position, "调整视图层级");
    }
}
