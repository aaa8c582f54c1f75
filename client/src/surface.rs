use web_sys::CanvasRenderingContext2d;

use paint_shared::Point;

/// The two primitives a stroke needs from a raster target.
pub trait Surface {
    /// Straight line with round caps, `width` pixels wide.
    fn draw_segment(&mut self, from: Point, to: Point, width: f64, color: &str);
    fn fill_disc(&mut self, center: Point, radius: f64, color: &str);
}

#[derive(Clone)]
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        ctx.set_line_cap("round");
        ctx.set_line_join("round");
        Self { ctx }
    }
}

impl Surface for CanvasSurface {
    fn draw_segment(&mut self, from: Point, to: Point, width: f64, color: &str) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width);
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.stroke();
    }

    fn fill_disc(&mut self, center: Point, radius: f64, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        let _ = self
            .ctx
            .arc(center.x, center.y, radius, 0.0, std::f64::consts::PI * 2.0);
        self.ctx.fill();
    }
}
