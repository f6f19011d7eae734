use crate::constants::{FADE_FILL, SHADOW_BLUR};
use crate::core::{PathCmd, StrandPath};
use web_sys as web;

/// Replays strand paths onto a 2D context.
pub struct CanvasPainter {
    ctx: web::CanvasRenderingContext2d,
}

impl CanvasPainter {
    pub fn new(ctx: web::CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    pub fn clear(&self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    /// Clear, then lay down the translucent fade fill.
    pub fn begin_frame(&self, width: f64, height: f64) {
        self.clear(width, height);
        self.ctx.set_fill_style_str(FADE_FILL);
        self.ctx.fill_rect(0.0, 0.0, width, height);
    }

    pub fn draw(&self, strands: &[StrandPath]) {
        let ctx = &self.ctx;
        for strand in strands {
            let Some(style) = strand.style else {
                continue;
            };
            let color = style.css();
            ctx.begin_path();
            ctx.set_line_width(style.line_width as f64);
            ctx.set_shadow_blur(SHADOW_BLUR);
            ctx.set_shadow_color(&color);
            ctx.set_stroke_style_str(&color);
            ctx.set_global_alpha(style.alpha as f64);
            for cmd in &strand.cmds {
                match *cmd {
                    PathCmd::MoveTo(p) => ctx.move_to(p.x as f64, p.y as f64),
                    PathCmd::QuadTo { ctrl, to } => ctx.quadratic_curve_to(
                        ctrl.x as f64,
                        ctrl.y as f64,
                        to.x as f64,
                        to.y as f64,
                    ),
                    PathCmd::LineTo(p) => ctx.line_to(p.x as f64, p.y as f64),
                }
            }
            ctx.stroke();
        }
        ctx.set_global_alpha(1.0);
        ctx.set_shadow_blur(0.0);
        ctx.set_shadow_color("transparent");
    }
}
