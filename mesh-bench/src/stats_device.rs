//! A device that rasterises nothing, it counts what it is sent and where it
//! lands on screen.

use glam::{Vec2, Vec3};
use log::trace;
use render_trait::{
    IconDraw, LineFlags, MAX_POLY_POINTS, RenderDevice, SceneNode, TextureInfo, TransTexture,
};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct StatsDevice {
    span_based: bool,
    pub polygons: usize,
    pub points: usize,
    /// Polygons by point count
    pub histogram: [usize; MAX_POLY_POINTS + 1],
    pub lines: usize,
    pub icons: usize,
    pub screen_min: Vec2,
    pub screen_max: Vec2,
    /// Screen area covered, counting overdraw
    pub area: f32,
}

impl StatsDevice {
    pub fn new(span_based: bool) -> Self {
        Self {
            span_based,
            polygons: 0,
            points: 0,
            histogram: [0; MAX_POLY_POINTS + 1],
            lines: 0,
            icons: 0,
            screen_min: Vec2::splat(f32::MAX),
            screen_max: Vec2::splat(f32::MIN),
            area: 0.0,
        }
    }

    fn extend_bounds(&mut self, p: Vec2) {
        self.screen_min = self.screen_min.min(p);
        self.screen_max = self.screen_max.max(p);
    }
}

impl RenderDevice for StatsDevice {
    type SpanBuffer = ();

    fn span_based(&self) -> bool {
        self.span_based
    }

    fn draw_gouraud_polygon(
        &mut self,
        _frame: &SceneNode,
        texture: &TextureInfo,
        pts: &[TransTexture],
        poly_flags: u32,
        _span: Option<&()>,
    ) {
        self.polygons += 1;
        self.points += pts.len();
        self.histogram[pts.len().min(MAX_POLY_POINTS)] += 1;

        let mut twice_area = 0.0;
        for (i, p) in pts.iter().enumerate() {
            let q = &pts[(i + 1) % pts.len()];
            twice_area += p.screen_x * q.screen_y - q.screen_x * p.screen_y;
            self.extend_bounds(Vec2::new(p.screen_x, p.screen_y));
        }
        self.area += twice_area.abs() * 0.5;
        trace!(
            "polygon: {} points, texture {}, flags {:#x}",
            pts.len(),
            texture.id,
            poly_flags
        );
    }

    fn draw_3d_line(
        &mut self,
        _frame: &SceneNode,
        _color: Vec3,
        _line_flags: LineFlags,
        _p1: Vec3,
        _p2: Vec3,
    ) {
        self.lines += 1;
    }

    fn draw_icon(
        &mut self,
        _frame: &SceneNode,
        _texture: &TextureInfo,
        icon: &IconDraw,
        _span: Option<&()>,
    ) {
        self.icons += 1;
        self.extend_bounds(Vec2::new(icon.x, icon.y));
        self.extend_bounds(Vec2::new(icon.x + icon.x_size, icon.y + icon.y_size));
    }
}

impl fmt::Display for StatsDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "StatsDevice:")?;
        writeln!(f, "  - polygons: {}", self.polygons)?;
        if self.polygons > 0 {
            writeln!(
                f,
                "  - points/poly: {:.2}",
                self.points as f32 / self.polygons as f32
            )?;
            writeln!(f, "  - by points: {:?}", &self.histogram[3..])?;
            writeln!(
                f,
                "  - screen: {:.1?} to {:.1?}, area {:.0}",
                self.screen_min, self.screen_max, self.area
            )?;
        }
        writeln!(f, "  - lines: {}", self.lines)?;
        write!(f, "  - icons: {}", self.icons)
    }
}

#[cfg(test)]
mod tests {
    use super::StatsDevice;
    use glam::Vec3;
    use math::Rotator;
    use render_trait::{RenderDevice, SceneNode, TextureInfo, TransTexture, Viewport};

    fn point(x: f32, y: f32) -> TransTexture {
        let mut p = TransTexture::default();
        p.screen_x = x;
        p.screen_y = y;
        p
    }

    #[test]
    fn test_counts_polygon_area_and_bounds() {
        let frame =
            SceneNode::new_master(Viewport::new(64, 64, 90.0), Vec3::ZERO, Rotator::ZERO).unwrap();
        let mut device = StatsDevice::new(false);
        let square = [
            point(10.0, 10.0),
            point(20.0, 10.0),
            point(20.0, 20.0),
            point(10.0, 20.0),
        ];
        device.draw_gouraud_polygon(&frame, &TextureInfo::default(), &square, 0, None);
        device.draw_gouraud_polygon(&frame, &TextureInfo::default(), &square[..3], 0, None);

        assert_eq!(device.polygons, 2);
        assert_eq!(device.points, 7);
        assert_eq!(device.histogram[3], 1);
        assert_eq!(device.histogram[4], 1);
        assert!((device.area - 150.0).abs() < 1e-4);
        assert_eq!(device.screen_min.x, 10.0);
        assert_eq!(device.screen_max.y, 20.0);
        assert!(!device.span_based());
    }
}
