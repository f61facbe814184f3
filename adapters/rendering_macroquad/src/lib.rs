#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Robot Game.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Sprites are drawn as primitive shapes sized to their nominal dimensions, so
//! the adapter needs no image assets.

use anyhow::Result;
use macroquad::input::{is_key_pressed, is_key_released, KeyCode};
use robot_game_core::{Direction, Input, SpriteKey};
use robot_game_rendering::{
    Color, FrameInput, PixelRect, Presentation, RenderingBackend, Scene, SpritePresentation,
};
use std::{collections::VecDeque, time::Duration};

/// Font size of the status line in pixels.
const STATUS_FONT_SIZE: u16 = 24;

/// Distance between the status line and the top-right window corner.
const STATUS_MARGIN: f32 = 20.0;

/// Keys mapped to avatar directions.
const DIRECTION_KEYS: [(KeyCode, Direction); 4] = [
    (KeyCode::Up, Direction::North),
    (KeyCode::Right, Direction::East),
    (KeyCode::Down, Direction::South),
    (KeyCode::Left, Direction::West),
];

#[derive(Debug)]
struct KeyboardInput {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// Arrow key transitions observed this frame.
    inputs: Vec<Input>,
}

impl KeyboardInput {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            inputs: direction_inputs(is_key_released, is_key_pressed),
        }
    }

    fn into_frame_input(self) -> FrameInput {
        FrameInput {
            inputs: self.inputs,
            quit_requested: self.quit_requested,
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame rate metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> bool + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            status_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: window_extent(scene.viewport.pixel_width()),
            window_height: window_extent(scene.viewport.pixel_height()),
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let text_color = to_macroquad_color(status_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardInput::poll();
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                if !update_scene(frame_dt, keyboard.into_frame_input(), &mut scene) {
                    break;
                }

                macroquad::window::clear_background(background);
                for tile in &scene.tiles {
                    fill_rect(tile.rect, to_macroquad_color(tile.color));
                }
                for sprite in &scene.sprites {
                    draw_sprite(sprite);
                }
                draw_status(&scene.status, text_color);

                if show_fps {
                    if let Some(metrics) = fps_counter.record_frame(frame_dt) {
                        log::info!(
                            "FPS: {:.2} (10s avg: {:.2})",
                            metrics.per_second,
                            metrics.trailing_ten_seconds
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Arrow key transitions for one frame.
///
/// Macroquad reports which keys changed during the frame but not in which
/// order. Held keys that were let go are released first, then new presses
/// follow, and keys tapped within the frame are released last.
fn direction_inputs(
    released: impl Fn(KeyCode) -> bool,
    pressed: impl Fn(KeyCode) -> bool,
) -> Vec<Input> {
    let let_go = DIRECTION_KEYS
        .iter()
        .filter(|&&(key, _)| released(key) && !pressed(key))
        .map(|&(_, direction)| Input::Release(direction));
    let presses = DIRECTION_KEYS
        .iter()
        .filter(|&&(key, _)| pressed(key))
        .map(|&(_, direction)| Input::Press(direction));
    let taps = DIRECTION_KEYS
        .iter()
        .filter(|&&(key, _)| released(key) && pressed(key))
        .map(|&(_, direction)| Input::Release(direction));
    let_go.chain(presses).chain(taps).collect()
}

fn window_extent(pixels: u32) -> i32 {
    i32::try_from(pixels).unwrap_or(i32::MAX)
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, frame: Duration) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        self.frame_times.push_back(frame);
        self.window_duration += frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        let trailing_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if trailing_seconds > f32::EPSILON {
            self.frame_times.len() as f32 / trailing_seconds
        } else {
            per_second
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;

        Some(FpsMetrics {
            per_second,
            trailing_ten_seconds,
        })
    }
}

fn fill_rect(rect: PixelRect, color: macroquad::color::Color) {
    macroquad::shapes::draw_rectangle(
        rect.origin.x as f32,
        rect.origin.y as f32,
        rect.size.x as f32,
        rect.size.y as f32,
        color,
    );
}

fn draw_sprite(sprite: &SpritePresentation) {
    let rect = sprite.rect;
    let x = rect.origin.x as f32;
    let y = rect.origin.y as f32;
    let width = rect.size.x as f32;
    let height = rect.size.y as f32;
    let center_x = x + width / 2.0;
    let center_y = y + height / 2.0;

    match sprite.sprite {
        SpriteKey::Robot => {
            let body = to_macroquad_color(Color::from_rgb_u8(70, 130, 200));
            let eye = to_macroquad_color(Color::WHITE);
            macroquad::shapes::draw_rectangle(x, y + height * 0.2, width, height * 0.8, body);
            macroquad::shapes::draw_rectangle(
                x + width * 0.2,
                y,
                width * 0.6,
                height * 0.3,
                body,
            );
            let eye_radius = width * 0.08;
            macroquad::shapes::draw_circle(x + width * 0.35, y + height * 0.15, eye_radius, eye);
            macroquad::shapes::draw_circle(x + width * 0.65, y + height * 0.15, eye_radius, eye);
        }
        SpriteKey::Monster => {
            let skin = to_macroquad_color(Color::from_rgb_u8(140, 40, 160));
            let eye = to_macroquad_color(Color::from_rgb_u8(255, 220, 0));
            macroquad::shapes::draw_circle(center_x, center_y, width.min(height) / 2.0, skin);
            macroquad::shapes::draw_triangle(
                macroquad::math::Vec2::new(x, y),
                macroquad::math::Vec2::new(x + width * 0.3, y + height * 0.3),
                macroquad::math::Vec2::new(x + width * 0.1, y + height * 0.4),
                skin,
            );
            macroquad::shapes::draw_triangle(
                macroquad::math::Vec2::new(x + width, y),
                macroquad::math::Vec2::new(x + width * 0.7, y + height * 0.3),
                macroquad::math::Vec2::new(x + width * 0.9, y + height * 0.4),
                skin,
            );
            macroquad::shapes::draw_circle(center_x, center_y - height * 0.1, width * 0.1, eye);
        }
        SpriteKey::Coin => {
            let radius = width.min(height) / 2.0;
            let gold = to_macroquad_color(Color::from_rgb_u8(240, 200, 40));
            let rim = to_macroquad_color(Color::from_rgb_u8(180, 130, 20));
            macroquad::shapes::draw_circle(center_x, center_y, radius, gold);
            macroquad::shapes::draw_circle_lines(center_x, center_y, radius, 2.0, rim);
        }
    }
}

fn draw_status(text: &str, color: macroquad::color::Color) {
    if text.is_empty() {
        return;
    }

    let dimensions = macroquad::text::measure_text(text, None, STATUS_FONT_SIZE, 1.0);
    let (x, y) = status_origin(
        macroquad::window::screen_width(),
        dimensions.width,
        dimensions.offset_y,
    );
    macroquad::text::draw_text(text, x, y, f32::from(STATUS_FONT_SIZE), color);
}

/// Baseline origin that places the status text inside the top-right margin.
fn status_origin(screen_width: f32, text_width: f32, ascent: f32) -> (f32, f32) {
    let x = (screen_width - text_width - STATUS_MARGIN).max(0.0);
    (x, STATUS_MARGIN + ascent)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
