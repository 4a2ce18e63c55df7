//! Drawing surface abstraction. The game loop only talks to [`Renderer`];
//! [`CanvasRenderer`] is the browser implementation on a 2D canvas.

use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::config::Viewport;

/// Axis-aligned rectangle in canvas pixels (origin top-left, y grows down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
    pub fn right(&self) -> f64 {
        self.x + self.width
    }
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub trait Renderer {
    fn clear(&mut self);
    fn draw_background(&mut self);
    fn draw_character(&mut self, rect: Rect);
    fn draw_obstacle(&mut self, rect: Rect, opacity: f64);
    fn draw_text(&mut self, content: &str, position: Point);
}

/// Obstacles fade out near the screen edges: half transparent inside the
/// 10-15% / 80-88% bands, invisible beyond them. Cosmetic only.
pub fn obstacle_opacity(x: f64, surface_width: f64) -> f64 {
    if x < surface_width * 0.1 || x > surface_width * 0.88 {
        0.0
    } else if x < surface_width * 0.15 || x > surface_width * 0.8 {
        0.5
    } else {
        1.0
    }
}

const GROUND_COLOR: &str = "#00b200";
const GROUND_FADE: &str = "rgba(0, 178, 0, 0)";
const TEXT_FONT: &str = "24px Arial";
const GROUND_LINE_THICKNESS: f64 = 3.0;

/// Canvas-backed renderer drawing the character and obstacle sprites.
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
    viewport: Viewport,
    ground_offset: f64,
    character_img: HtmlImageElement,
    obstacle_img: HtmlImageElement,
}

impl CanvasRenderer {
    pub fn new(
        ctx: CanvasRenderingContext2d,
        viewport: Viewport,
        ground_offset: f64,
        character_img: HtmlImageElement,
        obstacle_img: HtmlImageElement,
    ) -> Self {
        Self { ctx, viewport, ground_offset, character_img, obstacle_img }
    }
}

impl Renderer for CanvasRenderer {
    fn clear(&mut self) {
        self.ctx.clear_rect(0.0, 0.0, self.viewport.width, self.viewport.height);
    }

    fn draw_background(&mut self) {
        let ground_y = self.viewport.height - self.ground_offset;
        let gradient = self.ctx.create_linear_gradient(0.0, ground_y, self.viewport.width, ground_y);
        // Stops are constant and in range; add_color_stop only fails on bad input.
        gradient.add_color_stop(0.1, GROUND_FADE).ok();
        gradient.add_color_stop(0.2, GROUND_COLOR).ok();
        gradient.add_color_stop(0.8, GROUND_COLOR).ok();
        gradient.add_color_stop(0.9, GROUND_FADE).ok();
        self.ctx.set_fill_style(&gradient);
        self.ctx.fill_rect(0.0, ground_y, self.viewport.width, GROUND_LINE_THICKNESS);
    }

    fn draw_character(&mut self, rect: Rect) {
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(
                &self.character_img,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
            )
            .ok();
    }

    fn draw_obstacle(&mut self, rect: Rect, opacity: f64) {
        self.ctx.set_global_alpha(opacity);
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(
                &self.obstacle_img,
                rect.x,
                rect.y,
                rect.width,
                rect.height,
            )
            .ok();
        self.ctx.set_global_alpha(1.0);
    }

    fn draw_text(&mut self, content: &str, position: Point) {
        self.ctx.set_fill_style(&JsValue::from_str(GROUND_COLOR));
        self.ctx.set_font(TEXT_FONT);
        self.ctx.fill_text(content, position.x, position.y).ok();
    }
}
