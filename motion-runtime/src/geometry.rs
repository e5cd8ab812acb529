//! # Geometry 模块
//!
//! 视图动画用到的二维几何类型：点、尺寸、矩形和仿射变换。
//!
//! 仿射变换沿用宿主框架的行向量约定：
//!
//! ```text
//! x' = a·x + c·y + tx
//! y' = b·x + d·y + ty
//! ```
//!
//! `t1.concatenating(t2)` 表示先应用 `t1`，再应用 `t2`。

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// 角度转弧度
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// 二维点
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// 创建新的点
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 原点
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// 平移后的点
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// 二维尺寸
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// 矩形（原点 + 尺寸）
///
/// 视图的 frame 与 center 由同一个矩形推导，修改其中之一会同步另一个。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    /// 创建新的矩形
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// 矩形中心点
    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// 保持尺寸不变，移动到以 `center` 为中心的位置
    pub fn with_center(self, center: Point) -> Self {
        Self {
            origin: Point::new(
                center.x - self.size.width / 2.0,
                center.y - self.size.height / 2.0,
            ),
            size: self.size,
        }
    }

    /// 保持原点不变，按比例缩放尺寸
    pub fn scaled(self, sx: f64, sy: f64) -> Self {
        Self {
            origin: self.origin,
            size: Size::new(self.size.width * sx, self.size.height * sy),
        }
    }
}

/// 二维仿射变换
///
/// 以 3x2 矩阵存储（底行 `[0, 0, 1]` 隐含）：
/// ```text
/// | a  b  0 |
/// | c  d  0 |
/// | tx ty 1 |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    /// 单位变换
    pub const fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// 平移变换
    pub const fn translation(tx: f64, ty: f64) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            tx,
            ty,
        }
    }

    /// 旋转变换（弧度）
    pub fn rotation(radians: f64) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// 非均匀缩放变换
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// 连接另一个变换：先应用 `self`，再应用 `other`
    pub fn concatenating(&self, other: &Self) -> Self {
        Self {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            tx: self.tx * other.a + self.ty * other.c + other.tx,
            ty: self.tx * other.b + self.ty * other.d + other.ty,
        }
    }

    /// 将变换应用到一个点
    pub fn apply_to_point(&self, point: Point) -> Point {
        Point::new(
            self.a * point.x + self.c * point.y + self.tx,
            self.b * point.x + self.d * point.y + self.ty,
        )
    }

    /// 是否为单位变换
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// 逐元素近似比较
    pub fn approx_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.a - other.a).abs() <= epsilon
            && (self.b - other.b).abs() <= epsilon
            && (self.c - other.c).abs() <= epsilon
            && (self.d - other.d).abs() <= epsilon
            && (self.tx - other.tx).abs() <= epsilon
            && (self.ty - other.ty).abs() <= epsilon
    }
}
