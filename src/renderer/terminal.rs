//! Terminal sink
//!
//! Rasterises a frame into a pixel canvas two pixels per cell (upper half
//! block, foreground = top pixel, background = bottom pixel) and writes it out
//! with queued crossterm commands. The HUD takes the first terminal row.

use std::io::Write;

use crossterm::{
    QueueableCommand, cursor,
    style::{self, Color, Print},
    terminal,
};
use glam::Vec2;

use super::Renderer;
use super::frame::{DrawCmd, Frame};
use crate::assets::{AssetStore, Rgb};
use crate::consts::*;
use crate::hud::HudSnapshot;
use crate::sim::GamePhase;

const SKY: Rgb = (92, 148, 252);
const MENU_BG: Rgb = (0, 0, 0);
const C_HUD: Color = Color::White;
const C_TITLE: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

/// Pixel grid the frame is rasterised into
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Rgb>,
}

impl PixelCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![SKY; width * height],
        }
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    /// Halve every channel
    pub fn dim(&mut self) {
        for (r, g, b) in &mut self.pixels {
            *r /= 2;
            *g /= 2;
            *b /= 2;
        }
    }

    /// Draw every command of `frame`, scaling the viewport onto the canvas
    pub fn rasterize(&mut self, frame: &Frame, assets: &AssetStore) {
        let scale = Vec2::new(
            self.width as f32 / VIEWPORT_WIDTH,
            self.height as f32 / VIEWPORT_HEIGHT,
        );
        for cmd in &frame.commands {
            match cmd {
                DrawCmd::Background => self.fill(SKY),
                DrawCmd::PauseOverlay => self.dim(),
                DrawCmd::Sprite {
                    sprite,
                    pos,
                    size,
                    flip_x,
                    ..
                } => {
                    let sprite = assets.get(*sprite);
                    let min = *pos * scale;
                    let max = (*pos + *size) * scale;
                    let x0 = min.x.floor().max(0.0) as usize;
                    let y0 = min.y.floor().max(0.0) as usize;
                    let x1 = (max.x.ceil().max(0.0) as usize).min(self.width);
                    let y1 = (max.y.ceil().max(0.0) as usize).min(self.height);
                    let span = max - min;
                    if span.x <= 0.0 || span.y <= 0.0 {
                        continue;
                    }
                    for y in y0..y1 {
                        let v = ((y as f32 + 0.5) - min.y) / span.y;
                        for x in x0..x1 {
                            let mut u = ((x as f32 + 0.5) - min.x) / span.x;
                            if *flip_x {
                                u = 1.0 - u;
                            }
                            if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                                continue;
                            }
                            if let Some(rgb) = sprite.sample(u, v) {
                                self.pixels[y * self.width + x] = rgb;
                            }
                        }
                    }
                }
            }
        }
    }
}

fn color((r, g, b): Rgb) -> Color {
    Color::Rgb { r, g, b }
}

/// Renders frames to any terminal-like writer
pub struct TerminalRenderer<W: Write> {
    out: W,
    assets: AssetStore,
    cols: u16,
    rows: u16,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, assets: AssetStore, cols: u16, rows: u16) -> Self {
        Self {
            out,
            assets,
            cols,
            rows,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        self.out.queue(terminal::Clear(terminal::ClearType::All)).ok();
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn canvas(&self) -> PixelCanvas {
        // Row 0 is the HUD; every other row holds two pixels
        PixelCanvas::new(
            self.cols as usize,
            self.rows.saturating_sub(1) as usize * 2,
        )
    }

    fn draw_canvas(&mut self, canvas: &PixelCanvas) -> std::io::Result<()> {
        for row in 0..canvas.height / 2 {
            self.out.queue(cursor::MoveTo(0, row as u16 + 1))?;
            for x in 0..canvas.width {
                let top = canvas.get(x, row * 2);
                let bottom = canvas.get(x, row * 2 + 1);
                self.out.queue(style::SetForegroundColor(color(top)))?;
                self.out.queue(style::SetBackgroundColor(color(bottom)))?;
                self.out.queue(Print('▀'))?;
            }
        }
        self.out.queue(style::ResetColor)?;
        Ok(())
    }

    fn draw_hud(&mut self, hud: &HudSnapshot) -> std::io::Result<()> {
        let line = hud.status_line();
        self.out.queue(cursor::MoveTo(0, 0))?;
        self.out.queue(style::SetForegroundColor(C_HUD))?;
        self.out.queue(Print(format!("{line:<width$}", width = self.cols as usize)))?;
        Ok(())
    }

    fn draw_centered(&mut self, row: u16, text: &str, fg: Color) -> std::io::Result<()> {
        let len = text.chars().count() as u16;
        let col = self.cols.saturating_sub(len) / 2;
        self.out.queue(cursor::MoveTo(col, row))?;
        self.out.queue(style::SetForegroundColor(fg))?;
        self.out.queue(Print(text))?;
        Ok(())
    }

    fn draw_screen(&mut self, lines: &[(&str, Color)]) -> std::io::Result<()> {
        let mut canvas = self.canvas();
        canvas.fill(MENU_BG);
        self.draw_canvas(&canvas)?;
        let top = (self.rows / 2).saturating_sub(lines.len() as u16);
        for (i, (text, fg)) in lines.iter().enumerate() {
            self.out.queue(style::SetBackgroundColor(color(MENU_BG)))?;
            self.draw_centered(top + i as u16 * 2, text, *fg)?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn present(&mut self, frame: &Frame, hud: &HudSnapshot) -> std::io::Result<()> {
        match hud.phase {
            GamePhase::Menu => {
                let credits = format!("CREDITS {}", hud.menu_credits);
                let prompt = if hud.can_start() {
                    "PRESS ENTER TO START"
                } else {
                    "PRESS C TO INSERT COIN"
                };
                self.draw_screen(&[
                    ("PIKA RUN", C_TITLE),
                    (credits.as_str(), C_HUD),
                    (prompt, C_HUD),
                    ("arrows move  z jump  x run  p pause  q quit", C_HINT),
                ])?;
            }
            GamePhase::GameOver => {
                let score = format!("SCORE {}", hud.score);
                self.draw_screen(&[
                    ("GAME OVER", Color::Red),
                    (score.as_str(), C_HUD),
                    ("PRESS ENTER", C_HINT),
                ])?;
            }
            GamePhase::Win => {
                let score = format!("SCORE {}", hud.score);
                self.draw_screen(&[
                    ("COURSE CLEAR!", C_TITLE),
                    (score.as_str(), C_HUD),
                    ("PRESS ENTER", C_HINT),
                ])?;
            }
            GamePhase::Playing | GamePhase::Paused => {
                let mut canvas = self.canvas();
                canvas.rasterize(frame, &self.assets);
                self.draw_canvas(&canvas)?;
                if hud.phase == GamePhase::Paused {
                    let row = self.rows / 2;
                    self.draw_centered(row, "PAUSED", C_TITLE)?;
                }
            }
        }

        self.draw_hud(hud)?;
        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, self.rows.saturating_sub(1)))?;
        self.out.flush()?;
        Ok(())
    }
}
