//! Frame rendering.
//!
//! Drawing goes through the [`Painter`] trait so the loop can run headless
//! in tests. A frame never mutates simulation state beyond advancing the
//! fly-in animations; physics stepping happens elsewhere at its own rate.

use crate::config::DebugConfig;
use crate::geom;
use crate::session::WallSession;
use glam::Vec2;

const COLOR_WALLS: &str = "#ee00ff";
const COLOR_CENTER_WALL: &str = "#ff0000";
const COLOR_BOUNDS: &str = "#00ff00";
const COLOR_CENTER: &str = "#ff0000";
const COLOR_TEXT: &str = "#ffffff";
const COLOR_VELOCITY: &str = "#0000ff";

/// Drawing surface for one frame.
pub trait Painter {
    fn clear(&mut self);
    /// Draw the sticker raster at `path`, centered, rotated and faded.
    #[allow(clippy::too_many_arguments)]
    fn draw_sticker(
        &mut self,
        path: &str,
        center: Vec2,
        angle: f32,
        width: f32,
        height: f32,
        scale: f32,
        alpha: f32,
    );
    fn stroke_rect(&mut self, min: Vec2, max: Vec2, color: &str);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: &str);
    fn line(&mut self, from: Vec2, to: Vec2, color: &str);
    fn text(&mut self, text: &str, at: Vec2, color: &str);
}

/// Painter that draws nothing; for headless runs.
#[derive(Debug, Default)]
pub struct NullPainter;

impl Painter for NullPainter {
    fn clear(&mut self) {}
    fn draw_sticker(&mut self, _: &str, _: Vec2, _: f32, _: f32, _: f32, _: f32, _: f32) {}
    fn stroke_rect(&mut self, _: Vec2, _: Vec2, _: &str) {}
    fn fill_circle(&mut self, _: Vec2, _: f32, _: &str) {}
    fn line(&mut self, _: Vec2, _: Vec2, _: &str) {}
    fn text(&mut self, _: &str, _: Vec2, _: &str) {}
}

/// Debug overlay toggles, driven by the number keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebugFlags {
    pub show_walls: bool,
    pub show_bounds: bool,
    pub show_labels: bool,
    pub show_physics: bool,
    pub show_sticker_size: bool,
}

impl DebugFlags {
    pub fn from_config(config: &DebugConfig) -> Self {
        Self {
            show_walls: config.show_walls,
            show_bounds: config.show_bounds,
            show_labels: config.show_labels,
            show_physics: config.show_physics,
            show_sticker_size: config.show_sticker_size,
        }
    }

    /// Key presets: '1' = everything on, '2' = everything off, '3'..'7'
    /// toggle individual overlays.
    pub fn handle_key(&mut self, key: char) {
        match key {
            '1' => {
                self.show_physics = false;
                self.show_walls = true;
                self.show_labels = true;
                self.show_sticker_size = true;
                self.show_bounds = true;
            }
            '2' => *self = Self::default(),
            '3' => self.show_physics = !self.show_physics,
            '4' => self.show_sticker_size = !self.show_sticker_size,
            '5' => self.show_walls = !self.show_walls,
            '6' => self.show_labels = !self.show_labels,
            '7' => self.show_bounds = !self.show_bounds,
            _ => {}
        }
    }
}

/// Draw one frame: advance animations, then paint stickers and overlays.
pub fn render_frame(
    session: &mut WallSession,
    painter: &mut dyn Painter,
    flags: DebugFlags,
    now_ms: u64,
) {
    session.advance_animations(now_ms);

    painter.clear();

    let target = session
        .controller()
        .target_size(session.sticker_count(), &session.config().stickers);

    for sticker in session.stickers() {
        let Some(state) = session.physics().body(sticker.body) else {
            continue;
        };
        let (width, height) =
            geom::proportional_size(sticker.image.width, sticker.image.height, target as f32);

        painter.draw_sticker(
            &sticker.path,
            state.position,
            state.angle,
            width,
            height,
            sticker.scale,
            sticker.alpha,
        );

        if flags.show_physics {
            let (min, max) = state.bounds();
            painter.stroke_rect(min, max, COLOR_BOUNDS);
            painter.fill_circle(state.position, 3.0, COLOR_CENTER);
            painter.line(
                state.position,
                state.position + state.velocity * 10.0,
                COLOR_VELOCITY,
            );
        }

        if flags.show_sticker_size {
            let below = state.position + Vec2::new(0.0, height / 2.0);
            painter.text(
                &format!("{}x{}", width.round(), height.round()),
                below,
                COLOR_TEXT,
            );
            painter.text(
                &format!("v: {:.2}", state.velocity.length()),
                below + Vec2::new(0.0, 12.0),
                COLOR_TEXT,
            );
        }
    }

    if flags.show_walls {
        for id in session.physics().body_ids() {
            let Some(state) = session.physics().body(id) else {
                continue;
            };
            if !state.is_static && !flags.show_bounds {
                continue;
            }

            let color = match state.label.as_deref() {
                Some("centerBlock") => COLOR_CENTER_WALL,
                Some(_) => COLOR_WALLS,
                None => COLOR_BOUNDS,
            };
            let (min, max) = state.bounds();
            painter.stroke_rect(min, max, color);

            if flags.show_labels {
                let label = state.label.clone().unwrap_or_else(|| id.to_string());
                painter.text(&label, state.position, COLOR_TEXT);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::loader::{ImageLoader, ManualLoader};
    use crate::physics::RigidWorld;

    #[derive(Debug, Default)]
    struct RecordingPainter {
        clears: usize,
        stickers: Vec<String>,
        rects: usize,
        texts: Vec<String>,
    }

    impl Painter for RecordingPainter {
        fn clear(&mut self) {
            self.clears += 1;
        }
        fn draw_sticker(&mut self, path: &str, _: Vec2, _: f32, _: f32, _: f32, _: f32, _: f32) {
            self.stickers.push(path.to_string());
        }
        fn stroke_rect(&mut self, _: Vec2, _: Vec2, _: &str) {
            self.rects += 1;
        }
        fn fill_circle(&mut self, _: Vec2, _: f32, _: &str) {}
        fn line(&mut self, _: Vec2, _: Vec2, _: &str) {}
        fn text(&mut self, text: &str, _: Vec2, _: &str) {
            self.texts.push(text.to_string());
        }
    }

    fn session_with_sticker(tag: &str) -> WallSession {
        let mut config = Config::default();
        config.cache.path = std::env::temp_dir()
            .join(format!("wall_render_{tag}_{}.json", std::process::id()))
            .to_string_lossy()
            .into_owned();
        crate::cache::StickerStore::new(config.cache.path.clone()).clear();

        let mut session = WallSession::new(config, Box::new(RigidWorld::new()), 0);
        let mut loader = ManualLoader::new();
        session.add_sticker("a".into(), "stickers/a.webp", &mut loader);
        loader.complete("a".into(), 512, 512);
        for loaded in loader.poll() {
            session.finish_load(loaded, 0);
        }
        session
    }

    #[test]
    fn frame_draws_each_sticker_once() {
        let mut session = session_with_sticker("draw");
        let mut painter = RecordingPainter::default();

        render_frame(&mut session, &mut painter, DebugFlags::default(), 100);
        assert_eq!(painter.clears, 1);
        assert_eq!(painter.stickers, vec!["stickers/a.webp"]);
        assert_eq!(painter.rects, 0, "no overlays unless enabled");
        session.remove_all();
    }

    #[test]
    fn wall_overlay_draws_labeled_rects() {
        let mut session = session_with_sticker("walls");
        let mut painter = RecordingPainter::default();
        let mut flags = DebugFlags::default();
        flags.handle_key('5');
        flags.handle_key('6');

        render_frame(&mut session, &mut painter, flags, 100);
        // Five walls, stickers skipped without the bounds flag.
        assert_eq!(painter.rects, 5);
        assert!(painter.texts.iter().any(|t| t == "centerBlock"));
        session.remove_all();
    }

    #[test]
    fn render_does_not_move_bodies() {
        let mut session = session_with_sticker("pure");
        let body = session.stickers().next().unwrap().body;
        let before = session.physics().body(body).unwrap().position;

        let mut painter = NullPainter;
        render_frame(&mut session, &mut painter, DebugFlags::default(), 50);
        render_frame(&mut session, &mut painter, DebugFlags::default(), 90);

        let after = session.physics().body(body).unwrap().position;
        assert_eq!(before, after);
        session.remove_all();
    }

    #[test]
    fn key_presets_toggle_flags() {
        let mut flags = DebugFlags::default();
        flags.handle_key('1');
        assert!(flags.show_walls && flags.show_labels && flags.show_bounds);
        assert!(flags.show_sticker_size);
        assert!(!flags.show_physics);

        flags.handle_key('3');
        assert!(flags.show_physics);

        flags.handle_key('2');
        assert!(!flags.show_walls && !flags.show_physics && !flags.show_bounds);

        flags.handle_key('9');
        assert!(!flags.show_walls, "unbound keys change nothing");
    }
}
