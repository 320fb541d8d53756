//! Draws the game into a half-block pixel buffer and presents it.
//!
//! Every terminal cell shows two vertically stacked pixels. World units are
//! mapped onto pixels at a fixed `units_per_pixel` ratio and the playfield is
//! centered horizontally; whatever is left of the terminal shows backdrop and
//! ground.

use crossterm::{
    cursor, queue,
    style::{self, Color as CColor},
};
use std::io::{self, Write};

use crate::game::{Game, Phase};
use crate::world::{PIPE_WIDTH, Playfield};

// ── Colors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    const fn lerp(a: Rgb, b: Rgb, t_256: u16) -> Rgb {
        let t = t_256 as i32;
        Rgb(
            (a.0 as i32 + (b.0 as i32 - a.0 as i32) * t / 256) as u8,
            (a.1 as i32 + (b.1 as i32 - a.1 as i32) * t / 256) as u8,
            (a.2 as i32 + (b.2 as i32 - a.2 as i32) * t / 256) as u8,
        )
    }

    const fn dim(self) -> Rgb {
        Rgb(self.0 / 2, self.1 / 2, self.2 / 2)
    }

    fn to_crossterm(self) -> CColor {
        CColor::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

const BACKDROP: Rgb = Rgb(24, 28, 36);
const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const GRASS: Rgb = Rgb(84, 168, 55);
const GRASS_LIGHT: Rgb = Rgb(110, 200, 70);
const DIRT: Rgb = Rgb(210, 185, 110);
const DIRT_DARK: Rgb = Rgb(185, 160, 90);
const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_R: Rgb = Rgb(115, 191, 46);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const BIRD_Y: Rgb = Rgb(245, 200, 66);
const BIRD_HI: Rgb = Rgb(255, 225, 100);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
const HILL_FAR: Rgb = Rgb(120, 195, 75);
const HILL_NEAR: Rgb = Rgb(95, 175, 55);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);
const TEXT_PAUSED: Rgb = Rgb(90, 140, 255);
const TEXT_OVER: Rgb = Rgb(235, 70, 60);
const TEXT_HELP: Rgb = Rgb(150, 150, 160);

// ── Pixel buffer with half-block rendering ──────────────────────────────────

pub struct PixelBuf {
    w: usize,
    h: usize, // pixel height = terminal rows * 2
    px: Vec<Rgb>,
}

impl PixelBuf {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![BACKDROP; w * h],
        }
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.resize(w * h, BACKDROP);
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn set(&mut self, x: i32, y: i32, c: Rgb) {
        if x >= 0 && y >= 0 && (x as usize) < self.w && (y as usize) < self.h {
            self.px[y as usize * self.w + x as usize] = c;
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Rgb {
        self.px[y * self.w + x]
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, c: Rgb) {
        for dy in 0..h {
            for dx in 0..w {
                self.set(x + dx, y + dy, c);
            }
        }
    }

    fn clear(&mut self, c: Rgb) {
        self.px.fill(c);
    }

    /// Queue the whole buffer; the caller flushes.
    fn queue(&self, out: &mut impl Write) -> io::Result<()> {
        queue!(out, cursor::MoveTo(0, 0))?;
        let rows = self.h / 2;
        let mut prev_fg = Rgb(0, 0, 0);
        let mut prev_bg = Rgb(0, 0, 0);
        let mut need_fg = true;
        let mut need_bg = true;

        for row in 0..rows {
            for col in 0..self.w {
                let top = self.get(col, row * 2);
                let bot = self.get(col, row * 2 + 1);

                if top == bot {
                    if need_bg || prev_bg != top {
                        queue!(out, style::SetBackgroundColor(top.to_crossterm()))?;
                        prev_bg = top;
                        need_bg = false;
                    }
                    queue!(out, style::Print(' '))?;
                } else {
                    if need_fg || prev_fg != top {
                        queue!(out, style::SetForegroundColor(top.to_crossterm()))?;
                        prev_fg = top;
                        need_fg = false;
                    }
                    if need_bg || prev_bg != bot {
                        queue!(out, style::SetBackgroundColor(bot.to_crossterm()))?;
                        prev_bg = bot;
                        need_bg = false;
                    }
                    queue!(out, style::Print('\u{2580}'))?; // ▀
                }
            }
            if row + 1 < rows {
                queue!(out, style::ResetColor, style::Print("\r\n"))?;
                need_fg = true;
                need_bg = true;
            }
        }
        queue!(out, style::ResetColor)
    }
}

// ── 3x5 bitmap digits ──────────────────────────────────────────────────────

#[rustfmt::skip]
const DIGITS: [[u8; 15]; 10] = [
    [1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1], // 0
    [0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1], // 1
    [1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1], // 2
    [1,1,1, 0,0,1, 0,1,1, 0,0,1, 1,1,1], // 3
    [1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1], // 4
    [1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1], // 5
    [1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1], // 6
    [1,1,1, 0,0,1, 0,1,0, 0,1,0, 0,1,0], // 7
    [1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1], // 8
    [1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1], // 9
];

fn draw_digit(buf: &mut PixelBuf, x: i32, y: i32, d: u8, fg: Rgb) {
    let glyph = &DIGITS[d as usize];
    for row in 0..5 {
        for col in 0..3 {
            if glyph[row * 3 + col] == 1 {
                let px = x + col as i32;
                let py = y + row as i32;
                buf.set(px + 1, py + 1, SHADOW);
                buf.set(px, py, fg);
            }
        }
    }
}

fn draw_number(buf: &mut PixelBuf, cx: i32, y: i32, n: u32, fg: Rgb) {
    let s = n.to_string();
    let total_w = s.len() as i32 * 4 - 1; // 3px per digit + 1px spacing
    let start_x = cx - total_w / 2;
    for (i, ch) in s.bytes().enumerate() {
        draw_digit(buf, start_x + i as i32 * 4, y, ch - b'0', fg);
    }
}

// ── World to pixels ─────────────────────────────────────────────────────────

/// Where the playfield sits in the pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub left: i32,
    pub width: i32,
    pub height: i32,
    units_per_pixel: f64,
}

impl Frame {
    pub fn new(buf_w: usize, field: &Playfield, units_per_pixel: f64) -> Self {
        let width = (field.width / units_per_pixel).round() as i32;
        let height = (field.height / units_per_pixel).round() as i32;
        Self {
            left: ((buf_w as i32 - width) / 2).max(0),
            width,
            height,
            units_per_pixel,
        }
    }

    pub fn x(&self, world_x: f64) -> i32 {
        self.left + (world_x / self.units_per_pixel).round() as i32
    }

    pub fn y(&self, world_y: f64) -> i32 {
        (world_y / self.units_per_pixel).round() as i32
    }

    /// A world length in pixels, never less than one.
    pub fn span(&self, world_len: f64) -> i32 {
        ((world_len / self.units_per_pixel).round() as i32).max(1)
    }

    fn right(&self) -> i32 {
        self.left + self.width
    }
}

// ── Text overlay ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub col: u16,
    pub row: u16,
    pub text: String,
    pub color: Rgb,
}

/// Overlay text for the current state, in terminal cell coordinates.
pub fn overlay(game: &Game, frame: &Frame, controller: bool, term_rows: u16) -> Vec<TextLine> {
    let left = frame.left.max(0) as u16 + 1;
    let mut lines = vec![
        TextLine {
            col: left,
            row: 0,
            text: format!("Score: {}", game.score()),
            color: WHITE,
        },
        TextLine {
            col: left,
            row: 1,
            text: format!("High: {}", game.high_score()),
            color: WHITE,
        },
        TextLine {
            col: left,
            row: 2,
            text: if controller { "Controller: ON" } else { "Controller: OFF" }.to_string(),
            color: WHITE,
        },
    ];

    let center = |text: &str| -> u16 {
        let cx = frame.left + frame.width / 2;
        (cx - text.chars().count() as i32 / 2).max(0) as u16
    };
    let mid_row = (frame.height / 4).max(3) as u16;
    match game.phase() {
        Phase::Paused => {
            let text = "PAUSED";
            lines.push(TextLine {
                col: center(text),
                row: mid_row,
                text: text.to_string(),
                color: TEXT_PAUSED,
            });
        }
        Phase::GameOver => {
            for (i, (text, color)) in [("GAME OVER", TEXT_OVER), ("R / Start to restart", WHITE)]
                .into_iter()
                .enumerate()
            {
                lines.push(TextLine {
                    col: center(text),
                    row: mid_row + i as u16 * 2,
                    text: text.to_string(),
                    color,
                });
            }
        }
        Phase::Running => {}
    }

    let help = "Space jump  P pause  R restart  Q quit";
    let help_row = (frame.height / 2) as u16 + 1;
    if help_row < term_rows {
        lines.push(TextLine {
            col: center(help),
            row: help_row,
            text: help.to_string(),
            color: TEXT_HELP,
        });
    }
    lines
}

// ── Renderer ────────────────────────────────────────────────────────────────

pub struct Renderer {
    buf: PixelBuf,
    units_per_pixel: f64,
}

impl Renderer {
    pub fn new(cols: u16, rows: u16, units_per_pixel: f64) -> Self {
        Self {
            buf: PixelBuf::new(cols as usize, rows as usize * 2),
            units_per_pixel,
        }
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.buf.resize(cols as usize, rows as usize * 2);
    }

    pub fn buffer(&self) -> &PixelBuf {
        &self.buf
    }

    /// Playfield that fits the current terminal.
    pub fn playfield(&self) -> Playfield {
        Playfield::fit(
            self.buf.width() as f64 * self.units_per_pixel,
            self.buf.height() as f64 * self.units_per_pixel,
        )
    }

    pub fn frame(&self, game: &Game) -> Frame {
        Frame::new(self.buf.width(), game.field(), self.units_per_pixel)
    }

    pub fn draw(&mut self, game: &Game) {
        let frame = self.frame(game);
        // Scenery drifts at a fixed rate while the run is live.
        let scroll = game.frame_count() as f64 * 0.5;

        self.buf.clear(BACKDROP);
        self.draw_sky(&frame);
        self.draw_hills(&frame, scroll);
        self.draw_pipes(game, &frame);
        self.mask_margins(&frame);
        self.draw_ground(&frame, scroll);
        self.draw_bird(game, &frame);
        draw_number(&mut self.buf, frame.left + frame.width / 2, 2, game.score(), WHITE);

        if game.phase() == Phase::GameOver {
            self.darken(&frame);
        }
    }

    pub fn present(&self, out: &mut impl Write, game: &Game, controller: bool) -> io::Result<()> {
        self.buf.queue(out)?;
        let frame = self.frame(game);
        let rows = (self.buf.height() / 2) as u16;
        let cols = self.buf.width();
        for line in overlay(game, &frame, controller, rows) {
            if line.row >= rows || line.col as usize >= cols {
                continue;
            }
            let room = cols - line.col as usize;
            let text: String = line.text.chars().take(room).collect();
            queue!(
                out,
                cursor::MoveTo(line.col, line.row),
                style::SetForegroundColor(line.color.to_crossterm()),
                style::SetBackgroundColor(BACKDROP.to_crossterm()),
                style::Print(text),
                style::ResetColor
            )?;
        }
        out.flush()
    }

    fn draw_sky(&mut self, frame: &Frame) {
        let h = frame.height.max(1);
        for y in 0..frame.height {
            let t = (y * 256 / h) as u16;
            let c = Rgb::lerp(SKY_TOP, SKY_BOT, t);
            for x in frame.left..frame.right() {
                self.buf.set(x, y, c);
            }
        }
    }

    fn draw_hills(&mut self, frame: &Frame, scroll: f64) {
        let base = frame.height;
        let scale = (frame.height as f64 / 48.0).max(0.5);
        for x in frame.left..frame.right() {
            let fx = (x as f64 + scroll * 0.2) * 0.04;
            let h = (fx.sin() * 6.0 + (fx * 1.7).sin() * 3.0) * scale;
            let top = base - h as i32 - (4.0 * scale) as i32;
            for y in top..base {
                self.buf.set(x, y, HILL_FAR);
            }
        }
        for x in frame.left..frame.right() {
            let fx = (x as f64 + scroll * 0.4) * 0.06;
            let h = (fx.sin() * 4.0 + (fx * 2.3).sin() * 2.0) * scale;
            let top = base - h as i32 - (2.0 * scale) as i32;
            for y in top..base {
                self.buf.set(x, y, HILL_NEAR);
            }
        }
    }

    fn draw_pipes(&mut self, game: &Game, frame: &Frame) {
        let pw = frame.span(PIPE_WIDTH);
        let cap_extra = (pw / 6).max(1);
        let cap_h = (pw / 3).max(1);

        for pipe in game.pipes() {
            let px = frame.x(pipe.x);
            let gap_top = frame.y(pipe.top_height());
            let gap_bot = frame.y(pipe.bottom_start());

            // Upper body and cap
            for x in 0..pw {
                let c = pipe_shade(x, pw);
                for y in 0..gap_top - cap_h {
                    self.buf.set(px + x, y, c);
                }
            }
            for x in -cap_extra..(pw + cap_extra) {
                let c = pipe_shade(x + cap_extra, pw + cap_extra * 2);
                for y in (gap_top - cap_h)..gap_top {
                    self.buf.set(px + x, y, c);
                }
                self.buf.set(px + x, gap_top - 1, CAP_DARK);
            }

            // Lower cap and body
            for x in -cap_extra..(pw + cap_extra) {
                let c = pipe_shade(x + cap_extra, pw + cap_extra * 2);
                for y in gap_bot..(gap_bot + cap_h) {
                    self.buf.set(px + x, y, c);
                }
                self.buf.set(px + x, gap_bot, CAP_DARK);
            }
            for x in 0..pw {
                let c = pipe_shade(x, pw);
                for y in (gap_bot + cap_h)..frame.height {
                    self.buf.set(px + x, y, c);
                }
            }
        }
    }

    /// Pipes enter and leave across the playfield edges; hide the overhang.
    fn mask_margins(&mut self, frame: &Frame) {
        for y in 0..frame.height {
            for x in 0..frame.left {
                self.buf.set(x, y, BACKDROP);
            }
            for x in frame.right()..self.buf.width() as i32 {
                self.buf.set(x, y, BACKDROP);
            }
        }
    }

    fn draw_ground(&mut self, frame: &Frame, scroll: f64) {
        let gy = frame.height;
        let depth = (frame.height / 10).max(2);
        for x in frame.left..frame.right() {
            let alt = ((x as f64 + scroll) as i32 / 3) % 2 == 0;
            self.buf.set(x, gy, if alt { GRASS } else { GRASS_LIGHT });
            self.buf.set(x, gy + 1, GRASS);
        }
        for y in (gy + 2)..(gy + depth) {
            for x in frame.left..frame.right() {
                let stripe = ((x as f64 + scroll * 0.8) as i32 + (y - gy) * 2) % 12 < 6;
                self.buf.set(x, y, if stripe { DIRT } else { DIRT_DARK });
            }
        }
    }

    fn draw_bird(&mut self, game: &Game, frame: &Frame) {
        let bird = game.bird();
        let x = frame.x(bird.x);
        let y = frame.y(bird.y);
        let s = frame.span(bird.size);

        self.buf.fill_rect(x, y, s, s, BIRD_Y);
        self.buf.fill_rect(x + 1, y, (s - 2).max(1), 1, BIRD_HI);
        if s < 3 {
            return;
        }

        // Wing flaps every few frames while climbing
        let wing_up = bird.velocity < 0.0 && game.frame_count() % 8 < 4;
        let wing_y = if wing_up { y + s / 3 } else { y + s / 2 };
        self.buf.fill_rect(x, wing_y, (s / 2).max(1), (s / 4).max(1), BIRD_WING);

        let eye = (s / 4).max(1);
        let ex = x + s - eye - 1;
        let ey = y + 1;
        self.buf.fill_rect(ex, ey, eye, eye, BIRD_EYE);
        self.buf.set(ex + eye - 1, ey + eye - 1, BIRD_PUPIL);

        let beak_h = (s / 4).max(1);
        self.buf.fill_rect(x + s - 1, y + s / 2, 2, beak_h, BIRD_BEAK);
    }

    fn darken(&mut self, frame: &Frame) {
        for y in 0..frame.height.min(self.buf.height() as i32) {
            for x in frame.left..frame.right().min(self.buf.width() as i32) {
                let c = self.buf.get(x as usize, y as usize);
                self.buf.set(x, y, c.dim());
            }
        }
    }
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0).clamp(0.0, 256.0) as u16;
    if t < 64 {
        Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256))
    } else if t < 100 {
        Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256))
    } else if t < 160 {
        Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256))
    } else {
        Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Playfield {
        Playfield::new(400.0, 480.0)
    }

    #[test]
    fn test_set_ignores_out_of_bounds() {
        let mut buf = PixelBuf::new(4, 4);
        buf.set(-1, 0, WHITE);
        buf.set(4, 0, WHITE);
        buf.set(0, 4, WHITE);
        assert!(buf.px.iter().all(|&c| c == BACKDROP));
        buf.set(3, 3, WHITE);
        assert_eq!(buf.get(3, 3), WHITE);
    }

    #[test]
    fn test_frame_is_centered_and_scaled() {
        let frame = Frame::new(100, &field(), 8.0);
        assert_eq!(frame.width, 50);
        assert_eq!(frame.height, 60);
        assert_eq!(frame.left, 25);
        assert_eq!(frame.x(0.0), 25);
        assert_eq!(frame.x(400.0), 75);
        assert_eq!(frame.y(240.0), 30);
        assert_eq!(frame.span(1.0), 1);
    }

    #[test]
    fn test_renderer_playfield_follows_terminal() {
        // 120 columns x 40 rows = 120 x 80 pixels = 960 x 640 units
        let r = Renderer::new(120, 40, 8.0);
        assert_eq!(r.playfield(), Playfield::new(400.0, 500.0));
        // 60 x 30 cells = 480 x 480 units
        let r = Renderer::new(60, 30, 8.0);
        assert_eq!(r.playfield(), Playfield::new(400.0, 384.0));
    }

    #[test]
    fn test_bird_and_pipe_are_drawn() {
        let mut game = Game::new(field(), 0);
        game.spawn_pipe(0.0);
        let mut r = Renderer::new(100, 40, 8.0);
        r.draw(&game);
        let frame = r.frame(&game);
        let buf = r.buffer();

        // Center of the bird's body
        let bx = frame.x(game.bird().x + 16.0) as usize;
        let by = frame.y(game.bird().y + 16.0) as usize;
        assert_eq!(buf.get(bx, by), BIRD_Y);

        // The pipe spawns at the right edge, so it is masked off until it scrolls in
        let right = (frame.left + frame.width) as usize;
        assert_eq!(buf.get(right, 0), BACKDROP);

        for _ in 0..20 {
            game.advance_frame();
        }
        r.draw(&game);
        let pw = frame.span(PIPE_WIDTH);
        let px = frame.x(game.pipes()[0].x) as usize;
        assert_eq!(r.buffer().get(px + 1, 0), pipe_shade(1, pw));
    }

    #[test]
    fn test_game_over_darkens_field() {
        let mut game = Game::new(field(), 0);
        let mut r = Renderer::new(100, 40, 8.0);
        r.draw(&game);
        let frame = r.frame(&game);
        let x = frame.left as usize + 1;
        let before = r.buffer().get(x, 0);
        game.end_run();
        r.draw(&game);
        assert_eq!(r.buffer().get(x, 0), before.dim());
    }

    #[test]
    fn test_overlay_banners() {
        let mut game = Game::new(field(), 12);
        let frame = Frame::new(100, &field(), 8.0);
        let texts = |g: &Game| -> Vec<String> {
            overlay(g, &frame, false, 40).into_iter().map(|l| l.text).collect()
        };

        let running = texts(&game);
        assert!(running.contains(&"Score: 0".to_string()));
        assert!(running.contains(&"High: 12".to_string()));
        assert!(running.contains(&"Controller: OFF".to_string()));
        assert!(!running.iter().any(|t| t == "PAUSED" || t == "GAME OVER"));

        game.toggle_pause();
        assert!(texts(&game).contains(&"PAUSED".to_string()));

        game.toggle_pause();
        game.end_run();
        let over = texts(&game);
        assert!(over.contains(&"GAME OVER".to_string()));
        assert!(!over.contains(&"PAUSED".to_string()));
    }

    #[test]
    fn test_present_writes_half_blocks() {
        let game = Game::new(field(), 0);
        let mut r = Renderer::new(60, 20, 8.0);
        r.draw(&game);
        let mut out = Vec::new();
        r.present(&mut out, &game, true).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("Controller: ON"));
        assert!(text.contains('\u{2580}'));
    }
}
