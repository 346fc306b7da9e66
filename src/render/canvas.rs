//! Canvas 2D drawing surface (wasm32 only)

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::{Color, DrawCommand, DrawSurface, TextAlign, TextBaseline, TextStyle};
use crate::Rect;
use crate::assets::{self, AssetError, ImageAsset};
use crate::consts::*;

/// Drawn in place of the backdrop until (or unless) it loads
const SKY_PLACEHOLDER: Color = Color::rgb(112, 197, 206);
/// Drawn in place of the player sprite
const PLAYER_PLACEHOLDER: Color = Color::rgb(150, 105, 60);

/// `DrawSurface` backed by a `<canvas>` element
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    /// Backing-store pixels per logical pixel
    scale: f64,
    images: HashMap<ImageAsset, HtmlImageElement>,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;

        let mut images = HashMap::new();
        for asset in ImageAsset::ALL {
            match load_image(asset) {
                Ok(img) => {
                    images.insert(asset, img);
                }
                Err(e) => log::warn!("Failed to load {}: {:?}", asset.logical_name(), e),
            }
        }

        let mut surface = Self {
            ctx,
            scale: 1.0,
            images,
        };
        surface.resize(canvas);
        Ok(surface)
    }

    /// Size the backing store to the element's CSS box times the device
    /// pixel ratio, keeping the logical coordinate system
    pub fn resize(&mut self, canvas: &HtmlCanvasElement) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let css_w = match canvas.client_width() {
            w if w > 0 => w as f64,
            _ => SCREEN_WIDTH as f64,
        };
        canvas.set_width((css_w * dpr).round() as u32);
        canvas.set_height((css_w * dpr * (SCREEN_HEIGHT / SCREEN_WIDTH) as f64).round() as u32);
        self.scale = canvas.width() as f64 / SCREEN_WIDTH as f64;
        log::debug!("Canvas resized to {}x{}", canvas.width(), canvas.height());
    }

    fn ready_image(&self, asset: ImageAsset) -> Option<&HtmlImageElement> {
        self.images
            .get(&asset)
            .filter(|img| img.complete() && img.natural_width() > 0)
    }

    /// Rectangle path, rounded when `radius > 0`
    fn rect_path(&self, rect: &Rect, radius: f32) {
        let ctx = &self.ctx;
        let (x, y, w, h) = (
            rect.left() as f64,
            rect.top() as f64,
            rect.size.x as f64,
            rect.size.y as f64,
        );
        let r = (radius as f64).min(w / 2.0).min(h / 2.0).max(0.0);
        ctx.begin_path();
        if r == 0.0 {
            ctx.rect(x, y, w, h);
            return;
        }
        ctx.move_to(x + r, y);
        ctx.arc_to(x + w, y, x + w, y + h, r).ok();
        ctx.arc_to(x + w, y + h, x, y + h, r).ok();
        ctx.arc_to(x, y + h, x, y, r).ok();
        ctx.arc_to(x, y, x + w, y, r).ok();
        ctx.close_path();
    }

    fn fill_rect(&self, rect: &Rect, color: Color) {
        self.ctx.set_fill_style(&JsValue::from_str(&color.css()));
        self.ctx.fill_rect(
            rect.left() as f64,
            rect.top() as f64,
            rect.size.x as f64,
            rect.size.y as f64,
        );
    }

    /// Save state and move the origin to `anchor`, rotated counter-clockwise
    fn push_transform(&self, anchor: Vec2, rotation_deg: f32) {
        self.ctx.save();
        self.ctx.translate(anchor.x as f64, anchor.y as f64).ok();
        if rotation_deg != 0.0 {
            self.ctx.rotate(-(rotation_deg as f64).to_radians()).ok();
        }
    }

    fn draw_image(&self, asset: ImageAsset, center: Vec2, size: Vec2, rotation_deg: f32) {
        self.push_transform(center, rotation_deg);
        let local = Rect::from_center(Vec2::ZERO, size);
        match self.ready_image(asset) {
            Some(img) => {
                self.ctx
                    .draw_image_with_html_image_element_and_dw_and_dh(
                        img,
                        local.left() as f64,
                        local.top() as f64,
                        size.x as f64,
                        size.y as f64,
                    )
                    .ok();
            }
            None => match asset {
                ImageAsset::Background => self.fill_rect(&local, SKY_PLACEHOLDER),
                ImageAsset::Player => {
                    self.rect_path(&local, 10.0);
                    self.ctx.set_fill_style(&JsValue::from_str(&PLAYER_PLACEHOLDER.css()));
                    self.ctx.fill();
                }
            },
        }
        self.ctx.restore();
    }

    fn draw_text(&self, text: &str, pos: Vec2, style: &TextStyle, rotation_deg: f32) {
        if text.is_empty() {
            return;
        }
        self.push_transform(pos, rotation_deg);
        let weight = if style.bold { "bold " } else { "" };
        self.ctx
            .set_font(&format!("{}{}px sans-serif", weight, style.size.round()));
        self.ctx.set_text_align(match style.align {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        });
        self.ctx.set_text_baseline(match style.baseline {
            TextBaseline::Top => "top",
            TextBaseline::Middle => "middle",
            TextBaseline::Bottom => "bottom",
        });
        self.ctx.set_fill_style(&JsValue::from_str(&style.color.css()));
        self.ctx.fill_text(text, 0.0, 0.0).ok();
        self.ctx.restore();
    }
}

impl DrawSurface for CanvasSurface {
    fn begin_frame(&mut self) {
        self.ctx
            .set_transform(self.scale, 0.0, 0.0, self.scale, 0.0, 0.0)
            .ok();
        self.ctx
            .clear_rect(0.0, 0.0, SCREEN_WIDTH as f64, SCREEN_HEIGHT as f64);
    }

    fn draw(&mut self, command: DrawCommand) {
        match command {
            DrawCommand::Rect {
                rect,
                fill,
                stroke,
                radius,
            } => {
                self.rect_path(&rect, radius);
                if let Some(color) = fill {
                    self.ctx.set_fill_style(&JsValue::from_str(&color.css()));
                    self.ctx.fill();
                }
                if let Some((color, width)) = stroke {
                    self.ctx.set_stroke_style(&JsValue::from_str(&color.css()));
                    self.ctx.set_line_width(width as f64);
                    self.ctx.stroke();
                }
            }
            DrawCommand::HorizontalGradient { rect, stops } => {
                let gradient = self.ctx.create_linear_gradient(
                    rect.left() as f64,
                    0.0,
                    rect.right() as f64,
                    0.0,
                );
                for (offset, color) in stops {
                    gradient.add_color_stop(offset.clamp(0.0, 1.0), &color.css()).ok();
                }
                self.ctx.set_fill_style(&gradient);
                self.ctx.fill_rect(
                    rect.left() as f64,
                    rect.top() as f64,
                    rect.size.x as f64,
                    rect.size.y as f64,
                );
            }
            DrawCommand::Line {
                from,
                to,
                color,
                width,
            } => {
                self.ctx.begin_path();
                self.ctx.move_to(from.x as f64, from.y as f64);
                self.ctx.line_to(to.x as f64, to.y as f64);
                self.ctx.set_stroke_style(&JsValue::from_str(&color.css()));
                self.ctx.set_line_width(width as f64);
                self.ctx.stroke();
            }
            DrawCommand::Image {
                asset,
                center,
                size,
                rotation_deg,
            } => self.draw_image(asset, center, size, rotation_deg),
            DrawCommand::Text {
                text,
                pos,
                style,
                rotation_deg,
            } => self.draw_text(&text, pos, &style, rotation_deg),
        }
    }
}

/// Start loading an image, walking the candidate paths on each load error
fn load_image(asset: ImageAsset) -> Result<HtmlImageElement, JsValue> {
    let name = asset.logical_name();
    let paths = assets::candidates(name).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let img = HtmlImageElement::new()?;

    let next = Rc::new(Cell::new(1usize));
    let on_error = {
        let img = img.clone();
        let paths = paths.clone();
        Closure::<dyn FnMut()>::new(move || {
            let i = next.get();
            match paths.get(i) {
                Some(path) => {
                    next.set(i + 1);
                    img.set_src(path);
                }
                None => {
                    let err = AssetError::NotFound {
                        name: name.to_string(),
                        searched: paths.clone(),
                    };
                    log::warn!("{} - drawing placeholder", err);
                }
            }
        })
    };
    img.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    on_error.forget();

    img.set_src(&paths[0]);
    Ok(img)
}
