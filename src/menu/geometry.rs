use crate::menu::grid::{Angle, AxialCoord};
use crate::menu::{GRID_DIVISIONS, MAX_RING};
use std::f64::consts::PI;

const R60: f64 = PI / 3.0;
const SQRT_3: f64 = 1.732_050_807_568_877_2;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// What lies under a point, relative to one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalHit {
    Center,
    Wedge { angle: Angle, ring: u8, sub: u8 },
    Border(Angle),
}

/// Pixel layout of flat-topped panels.
///
/// Each of the six sectors is cut into a triangular lattice of side
/// `radius / 3`: the inner row forms the central button, rows 1 and 2 hold
/// `2·ring + 1` wedges each, and a band of `border_width` along the outer
/// edge is the border button.
///
/// ```text
///           \    angle=1    /
///             •---•---•---•
///            / \4/3\2/1\0/4\
///  angle=2  •---•---•---•---•   angle=0
///          / \ / \2/1\0/2\3/2\
///         •---•---•---•---•---•
///        / \ / \ /     \1/0\1/0\
///       •-b-•-a-•   C   •-a-•-b-•
///
///  C: center, a: ring 1, b: ring 2, digits: sub-positions
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub radius: f64,
    pub border_width: f64,
}

impl Layout {
    pub fn new(radius: f64, border_width: f64) -> Self {
        Self {
            radius,
            border_width: border_width.max(0.0).min(radius.max(0.0) / 2.0),
        }
    }

    fn unit(&self) -> f64 {
        self.radius / GRID_DIVISIONS as f64
    }

    /// Screen position of the panel at `coord` when the root is centred on
    /// `origin`. Neighbours sit `√3·radius` apart.
    pub fn panel_center(&self, origin: Point, coord: AxialCoord) -> Point {
        let (q, r) = (coord.q as f64, coord.r as f64);
        Point::new(
            origin.x + self.radius * 1.5 * q,
            origin.y - self.radius * SQRT_3 * (q / 2.0 + r),
        )
    }

    pub fn hexagon(&self, center: Point) -> [Point; 6] {
        std::array::from_fn(|i| {
            let theta = R60 * i as f64;
            Point::new(
                center.x + self.radius * theta.cos(),
                center.y - self.radius * theta.sin(),
            )
        })
    }

    /// Maps lattice coordinates of sector `angle` to the screen.
    fn lattice_point(&self, center: Point, angle: Angle, a: f64, b: f64) -> Point {
        let t = angle.index() as f64;
        let unit = self.unit();
        let (u, w) = (t * R60, (t + 2.0) * R60);
        Point::new(
            center.x + (a * u.cos() + b * w.cos()) * unit,
            center.y - (a * u.sin() + b * w.sin()) * unit,
        )
    }

    /// Corners of a wedge triangle.
    pub fn wedge_vertices(&self, center: Point, angle: Angle, ring: u8, sub: u8) -> [Point; 3] {
        let (r, k, odd) = (ring as f64, (sub / 2) as f64, (sub % 2) as f64);
        [
            self.lattice_point(center, angle, r, k),
            self.lattice_point(center, angle, r + 1.0 - odd, ((sub + 1) / 2) as f64),
            self.lattice_point(center, angle, r + 1.0, k + 1.0),
        ]
    }

    /// Corners of the border band along edge `angle`.
    pub fn border_vertices(&self, center: Point, angle: Angle) -> [Point; 4] {
        let t = angle.index() as f64;
        let inner = self.radius - self.border_width * 2.0 / SQRT_3;
        let corner = |theta: f64, len: f64| {
            Point::new(center.x + theta.cos() * len, center.y - theta.sin() * len)
        };
        [
            corner(t * R60, self.radius),
            corner((t + 1.0) * R60, self.radius),
            corner((t + 1.0) * R60, inner),
            corner(t * R60, inner),
        ]
    }

    /// Finds the button of the panel centred on `center` under `point`.
    /// `has_border` tells whether the border button of an edge exists; a
    /// suppressed border leaves its band to the outer wedges.
    pub fn locate(
        &self,
        center: Point,
        point: Point,
        has_border: impl Fn(Angle) -> bool,
    ) -> Option<LocalHit> {
        let (dx, dy) = (point.x - center.x, center.y - point.y);
        let theta = dy.atan2(dx).rem_euclid(2.0 * PI);
        let angle = Angle::from_index(((theta / R60) as usize).min(Angle::COUNT - 1))?;

        // rotate into the frame of sector 0
        let rot = angle.index() as f64 * R60;
        let x = dx * rot.cos() + dy * rot.sin();
        let y = -dx * rot.sin() + dy * rot.cos();

        let unit = self.unit();
        let b = (2.0 / SQRT_3) * y / unit;
        let a = x / unit + b / 2.0;
        let outer = GRID_DIVISIONS as f64;
        if a > outer {
            return None;
        }

        let edge_distance = (outer - a) * SQRT_3 * unit / 2.0;
        if edge_distance <= self.border_width && has_border(angle) {
            return Some(LocalHit::Border(angle));
        }

        let ring = (a.floor().max(0.0) as u8).min(MAX_RING);
        if ring == 0 {
            return Some(LocalHit::Center);
        }
        let k = b.floor().max(0.0);
        let upper = (b - k) > (a - ring as f64);
        let sub = (k as u8 * 2 + upper as u8).min(ring * 2);
        Some(LocalHit::Wedge { angle, ring, sub })
    }
}
