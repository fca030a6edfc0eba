use std::fmt;
use std::path::Path;
use std::rc::Rc;

use crate::coords::{Rect, TexRect, Vec2};
use crate::paint::{Color, Paint};
use crate::raster::{FileImageLoader, ImageLoader, RGBA_CHANNELS};
use crate::text::{Font, Text};

use super::backend::{GpuBackend, TextureOwner};
use super::batch::{QuadBatch, QuadType};
use super::config::{ErrorPolicy, RendererConfig};
use super::error::RenderError;
use super::vertex::{Quad, VERTICES_PER_QUAD};

/// Immediate-mode quad batcher.
///
/// Draw calls append quads to one of three fixed-capacity batches (colored,
/// textured, text). A batch is submitted to the backend when a push finds it
/// full, when an image is drawn, or when [`flush`](Self::flush) ends the
/// frame. The backend has a single texture slot; the renderer tracks which
/// [`TextureOwner`] holds it so text re-binds the atlas only after an image
/// took the slot.
pub struct Renderer<B: GpuBackend> {
    backend: B,
    font: Rc<Font>,
    images: Box<dyn ImageLoader>,
    config: RendererConfig,
    batches: [QuadBatch; 3],
    frame_size: Vec2,
    bound: Option<TextureOwner>,
}

impl<B: GpuBackend> Renderer<B> {
    /// Creates a renderer that loads images from disk.
    pub fn new(backend: B, font: Rc<Font>, config: RendererConfig) -> Self {
        Self::with_image_loader(backend, font, config, Box::new(FileImageLoader))
    }

    pub fn with_image_loader(
        backend: B,
        font: Rc<Font>,
        config: RendererConfig,
        images: Box<dyn ImageLoader>,
    ) -> Self {
        let capacity = config.batch_capacity;
        log::debug!(
            "renderer: batch capacity {capacity}, text capacity {}, policy {:?}",
            config.text_capacity,
            config.error_policy
        );
        Self {
            backend,
            font,
            images,
            batches: QuadType::ALL.map(|kind| QuadBatch::new(kind, capacity)),
            config,
            frame_size: Vec2::zero(),
            bound: None,
        }
    }

    // ── frame state ───────────────────────────────────────────────────────

    pub fn clear(&mut self, color: Color) {
        self.backend.clear(color);
    }

    /// Sets the logical frame size used to map vertices to clip space.
    pub fn set_frame_size(&mut self, width: f32, height: f32) {
        self.frame_size = Vec2::new(width, height);
        self.backend.set_frame_size(width, height);
    }

    #[inline]
    pub fn frame_size(&self) -> Vec2 {
        self.frame_size
    }

    // ── draw calls ────────────────────────────────────────────────────────

    /// Draws `rect` with a solid color or an image.
    ///
    /// Solid rects are batched. An image rect binds the image and submits the
    /// textured batch right away, so each image rect costs one draw.
    pub fn draw_rect(&mut self, rect: Rect, paint: impl Into<Paint>) -> Result<(), RenderError> {
        let result = match paint.into() {
            Paint::Solid(color) => {
                self.push(QuadType::Colored, Quad::new(rect, color, TexRect::ZERO))
            }
            Paint::Image(path) => self.draw_image(rect, &path),
        };
        self.check(result)
    }

    /// Draws a laid-out text with its baseline origin moved to `(x, y)`.
    ///
    /// `text` must be laid out against this renderer's font; a text built
    /// for an atlas of another size is rejected with
    /// [`RenderError::AtlasMismatch`].
    pub fn draw_text(&mut self, x: f32, y: f32, text: Text) -> Result<(), RenderError> {
        let result = self.push_text(x, y, text);
        self.check(result)
    }

    /// Formats, lays out and draws text in one call.
    ///
    /// Output is bounded by the configured text capacity.
    pub fn draw_text_fmt(
        &mut self,
        x: f32,
        y: f32,
        size: f32,
        args: fmt::Arguments<'_>,
    ) -> Result<(), RenderError> {
        let result = Text::with_capacity(&self.font, size, self.config.text_capacity, args)
            .map_err(RenderError::from)
            .and_then(|text| self.push_text(x, y, text));
        self.check(result)
    }

    // ── flushing ──────────────────────────────────────────────────────────

    /// Submits all pending quads: colored, then textured, then text.
    pub fn flush(&mut self) {
        for kind in QuadType::ALL {
            self.flush_batch(kind);
        }
    }

    /// Submits the pending quads of one batch.
    ///
    /// The textured flag is always set, even when the batch is empty.
    pub fn flush_batch(&mut self, kind: QuadType) {
        self.backend.set_textured(kind.is_textured());

        let used = self.batches[kind.index()].used();
        if used == 0 {
            return;
        }
        if kind == QuadType::Text {
            self.ensure_atlas_bound();
        }

        let batch = &mut self.batches[kind.index()];
        self.backend.upload_vertices(batch.vertices());
        self.backend.draw((used * VERTICES_PER_QUAD) as u32);
        batch.reset();

        log::trace!("flushed {kind:?} batch: {used} quads");
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn batch(&self, kind: QuadType) -> &QuadBatch {
        &self.batches[kind.index()]
    }

    /// Which owner the backend's texture slot was last bound for.
    pub fn bound_texture(&self) -> Option<TextureOwner> {
        self.bound
    }

    pub fn font(&self) -> &Rc<Font> {
        &self.font
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // ── internals ─────────────────────────────────────────────────────────

    fn draw_image(&mut self, rect: Rect, path: &Path) -> Result<(), RenderError> {
        let image = self.images.load(path)?;
        if image.channels() != RGBA_CHANNELS {
            return Err(RenderError::ChannelMismatch {
                path: path.to_path_buf(),
                expected: RGBA_CHANNELS,
                found: image.channels(),
            });
        }

        self.backend.bind_texture(TextureOwner::Image, &image);
        self.bound = Some(TextureOwner::Image);

        self.push(QuadType::Textured, Quad::new(rect, Color::WHITE, TexRect::FULL))?;
        self.flush_batch(QuadType::Textured);
        Ok(())
    }

    fn push_text(&mut self, x: f32, y: f32, mut text: Text) -> Result<(), RenderError> {
        let atlas = self.font.atlas();
        let expected = (atlas.width(), atlas.height());
        if text.atlas_size() != expected {
            return Err(RenderError::AtlasMismatch {
                expected,
                found: text.atlas_size(),
            });
        }

        text.adjust_text(x, y);
        self.ensure_atlas_bound();

        for (rect, tex) in text.rects().iter().zip(text.tex_rects()) {
            self.push(QuadType::Text, Quad::new(*rect, Color::WHITE, *tex))?;
        }
        Ok(())
    }

    /// Appends `quad`, flushing its batch first when it is full.
    fn push(&mut self, kind: QuadType, quad: Quad) -> Result<(), RenderError> {
        if self.batches[kind.index()].is_full() {
            self.flush_batch(kind);
        }
        self.batches[kind.index()].push(quad)?;
        Ok(())
    }

    fn ensure_atlas_bound(&mut self) {
        if self.bound == Some(TextureOwner::FontAtlas) {
            return;
        }
        log::debug!("binding font atlas");
        self.backend.bind_texture(TextureOwner::FontAtlas, self.font.atlas());
        self.bound = Some(TextureOwner::FontAtlas);
    }

    fn check<T>(&self, result: Result<T, RenderError>) -> Result<T, RenderError> {
        if let Err(e) = &result {
            if self.config.error_policy == ErrorPolicy::Fatal {
                log::error!("fatal render error: {e}");
                std::process::exit(1);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{Bitmap, ImageLoadError};
    use crate::render::{GpuCall, RecordingBackend};
    use crate::text::fixtures::{ascii_font, GRID_16};

    /// Returns a bitmap with `channels` channels for any path except
    /// `missing.png`.
    struct FakeImages {
        channels: u32,
    }

    impl ImageLoader for FakeImages {
        fn load(&self, path: &Path) -> Result<Bitmap, ImageLoadError> {
            if path == Path::new("missing.png") {
                return Err(ImageLoadError {
                    path: path.to_path_buf(),
                    message: "not found".into(),
                });
            }
            Ok(Bitmap::new(4, 2, self.channels))
        }
    }

    fn renderer_with(capacity: usize, channels: u32) -> Renderer<RecordingBackend> {
        Renderer::with_image_loader(
            RecordingBackend::new(),
            Rc::new(ascii_font()),
            RendererConfig {
                batch_capacity: capacity,
                error_policy: ErrorPolicy::Propagate,
                ..Default::default()
            },
            Box::new(FakeImages { channels }),
        )
    }

    fn renderer(capacity: usize) -> Renderer<RecordingBackend> {
        renderer_with(capacity, RGBA_CHANNELS)
    }

    fn rect(i: usize) -> Rect {
        let x = i as f32 * 10.0;
        Rect::new(x, 0.0, x + 5.0, 5.0)
    }

    // ── batching ──────────────────────────────────────────────────────────

    #[test]
    fn solid_rects_accumulate_without_draws() {
        let mut r = renderer(4);
        for i in 0..3 {
            r.draw_rect(rect(i), Color::BLACK).unwrap();
        }
        assert_eq!(r.batch(QuadType::Colored).used(), 3);
        assert!(r.backend().draws().is_empty());
    }

    #[test]
    fn third_rect_flushes_a_full_batch_of_two() {
        let mut r = renderer(2);
        r.draw_rect(rect(0), Color::RED).unwrap();
        r.draw_rect(rect(1), Color::RED).unwrap();
        assert!(r.backend().draws().is_empty());

        r.draw_rect(rect(2), Color::RED).unwrap();
        assert_eq!(r.backend().draws(), vec![12]);
        assert_eq!(r.batch(QuadType::Colored).used(), 1);

        let upload = r.backend().calls().iter().find_map(|c| match c {
            GpuCall::Upload(v) => Some(v.clone()),
            _ => None,
        });
        let upload = upload.unwrap();
        assert_eq!(upload.len(), 12);
        assert_eq!(upload[0].position, [0.0, 0.0]);
        assert_eq!(upload[6].position, [10.0, 0.0]);
        assert!(upload.iter().all(|v| v.tex_coords == [0.0, 0.0]));
    }

    #[test]
    fn auto_flush_count_matches_capacity() {
        for capacity in [1usize, 2, 3, 7] {
            for n in 1usize..=20 {
                let mut r = renderer(capacity);
                for i in 0..n {
                    r.draw_rect(rect(i), Color::GREEN).unwrap();
                }
                let draws = r.backend().draws();
                assert_eq!(draws.len(), (n - 1) / capacity, "n={n} capacity={capacity}");
                assert!(draws.iter().all(|&d| d as usize == capacity * 6));
                assert_eq!(
                    r.batch(QuadType::Colored).used(),
                    n - capacity * ((n - 1) / capacity)
                );
            }
        }
    }

    #[test]
    fn flush_submits_used_quads_and_resets() {
        let mut r = renderer(16);
        for i in 0..5 {
            r.draw_rect(rect(i), Color::BLUE).unwrap();
        }
        r.flush_batch(QuadType::Colored);
        assert_eq!(r.backend().draws(), vec![30]);
        assert_eq!(r.batch(QuadType::Colored).used(), 0);
    }

    #[test]
    fn empty_flush_only_sets_the_textured_flag() {
        let mut r = renderer(4);
        r.flush_batch(QuadType::Textured);
        assert_eq!(r.backend().calls(), &[GpuCall::SetTextured(true)]);
    }

    #[test]
    fn flush_runs_colored_then_textured_then_text() {
        let mut r = renderer(8);
        r.draw_rect(rect(0), Color::RED).unwrap();
        r.draw_text_fmt(0.0, 0.0, 16.0, format_args!("ab")).unwrap();
        r.backend_mut().take_calls();

        r.flush();
        let flags: Vec<bool> = r
            .backend()
            .calls()
            .iter()
            .filter_map(|c| match c {
                GpuCall::SetTextured(t) => Some(*t),
                _ => None,
            })
            .collect();
        assert_eq!(flags, vec![false, true, true]);
        assert_eq!(r.backend().draws(), vec![6, 12]);
        assert!(QuadType::ALL.iter().all(|&k| r.batch(k).is_empty()));
    }

    // ── images ────────────────────────────────────────────────────────────

    #[test]
    fn image_rect_binds_and_draws_immediately() {
        let mut r = renderer(8);
        for i in 0..3 {
            r.draw_rect(rect(i), Color::BLACK).unwrap();
        }
        r.backend_mut().take_calls();

        r.draw_rect(Rect::new(100.0, 100.0, 200.0, 200.0), Paint::image("image.png"))
            .unwrap();

        let calls = r.backend().calls();
        assert_eq!(
            calls[0],
            GpuCall::BindTexture {
                owner: TextureOwner::Image,
                width: 4,
                height: 2
            }
        );
        assert_eq!(calls[1], GpuCall::SetTextured(true));
        let GpuCall::Upload(vertices) = &calls[2] else {
            panic!("expected an upload, got {:?}", calls[2]);
        };
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0].tex_coords, [0.0, 0.0]);
        assert_eq!(vertices[5].tex_coords, [1.0, 1.0]);
        assert!(vertices.iter().all(|v| v.color == [1.0; 4]));
        assert_eq!(calls[3], GpuCall::Draw(6));

        assert_eq!(r.batch(QuadType::Textured).used(), 0);
        assert_eq!(r.batch(QuadType::Colored).used(), 3);
        assert_eq!(r.bound_texture(), Some(TextureOwner::Image));
    }

    #[test]
    fn image_with_wrong_channel_count_is_rejected() {
        let mut r = renderer_with(8, 3);
        let err = r
            .draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Paint::image("rgb.png"))
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::ChannelMismatch {
                expected: 4,
                found: 3,
                ..
            }
        ));
        assert!(r.backend().calls().is_empty());
    }

    #[test]
    fn missing_image_is_reported() {
        let mut r = renderer(8);
        let err = r
            .draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), "missing.png")
            .unwrap_err();
        assert!(matches!(err, RenderError::Image(_)));
        assert!(r.backend().draws().is_empty());
    }

    // ── text ──────────────────────────────────────────────────────────────

    #[test]
    fn text_pushes_one_quad_per_character() {
        let font = Rc::new(ascii_font());
        let mut r = renderer(32);
        let text = Text::new(&font, 16.0, format_args!("Hello, {}", "Bob")).unwrap();
        let expected = text.tex_rects().to_vec();

        r.draw_text(100.0, 300.0, text).unwrap();

        assert_eq!(r.batch(QuadType::Text).used(), 10);
        assert_eq!(r.backend().binds(), vec![TextureOwner::FontAtlas]);

        let quads = r.batch(QuadType::Text).quads();
        // 'H' sits at pen 0 with offset (1, -16), moved by (100, 300).
        assert_eq!(quads[0].vertices[0].position, [101.0, 284.0]);
        assert_eq!(quads[0].vertices[5].position, [117.0, 300.0]);
        for (quad, tex) in quads.iter().zip(&expected) {
            assert_eq!(quad.vertices[0].tex_coords, [tex.s0, tex.t0]);
            assert_eq!(quad.vertices[5].tex_coords, [tex.s1, tex.t1]);
            assert_eq!(quad.vertices[0].color, [1.0; 4]);
        }
    }

    #[test]
    fn long_text_flushes_the_text_batch() {
        let mut r = renderer(4);
        r.draw_text_fmt(0.0, 0.0, 16.0, format_args!("0123456789")).unwrap();
        assert_eq!(r.backend().draws(), vec![24, 24]);
        assert_eq!(r.batch(QuadType::Text).used(), 2);
    }

    #[test]
    fn atlas_is_rebound_after_an_image() {
        let mut r = renderer(8);
        r.draw_text_fmt(0.0, 0.0, 16.0, format_args!("hi")).unwrap();
        r.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), "image.png").unwrap();
        r.flush();
        assert_eq!(
            r.backend().binds(),
            vec![
                TextureOwner::FontAtlas,
                TextureOwner::Image,
                TextureOwner::FontAtlas
            ]
        );
        assert_eq!(r.bound_texture(), Some(TextureOwner::FontAtlas));
    }

    #[test]
    fn atlas_stays_bound_without_images() {
        let mut r = renderer(8);
        r.draw_text_fmt(0.0, 0.0, 16.0, format_args!("one")).unwrap();
        r.flush();
        r.draw_text_fmt(0.0, 20.0, 16.0, format_args!("two")).unwrap();
        r.flush();
        assert_eq!(r.backend().binds(), vec![TextureOwner::FontAtlas]);
    }

    #[test]
    fn text_outside_the_font_range_is_an_error() {
        let mut r = renderer(8);
        let err = r
            .draw_text_fmt(0.0, 0.0, 16.0, format_args!("caf\u{e9}"))
            .unwrap_err();
        assert!(matches!(err, RenderError::Font(_)));
        assert_eq!(r.batch(QuadType::Text).used(), 0);
    }

    #[test]
    fn text_from_another_atlas_is_rejected() {
        let digits =
            Font::from_bytes(Bitmap::new(64, 64, 4), 48..=57, 16.0, &[], &GRID_16).unwrap();
        let text = Text::new(&digits, 16.0, format_args!("42")).unwrap();

        let mut r = renderer(8);
        let err = r.draw_text(0.0, 0.0, text).unwrap_err();
        assert!(matches!(
            err,
            RenderError::AtlasMismatch {
                expected: (256, 128),
                found: (64, 64)
            }
        ));
        assert_eq!(r.batch(QuadType::Text).used(), 0);
        assert!(r.backend().binds().is_empty());
    }

    #[test]
    fn text_fmt_respects_the_configured_capacity() {
        let mut r = Renderer::with_image_loader(
            RecordingBackend::new(),
            Rc::new(ascii_font()),
            RendererConfig {
                batch_capacity: 64,
                text_capacity: 5,
                error_policy: ErrorPolicy::Propagate,
            },
            Box::new(FakeImages { channels: 4 }),
        );
        r.draw_text_fmt(0.0, 0.0, 16.0, format_args!("{}", "abcdefgh")).unwrap();
        assert_eq!(r.batch(QuadType::Text).used(), 5);
    }

    // ── frame state ───────────────────────────────────────────────────────

    #[test]
    fn frame_size_and_clear_are_forwarded() {
        let mut r = renderer(4);
        r.set_frame_size(800.0, 450.0);
        r.clear(Color::RED);
        assert_eq!(r.frame_size(), Vec2::new(800.0, 450.0));
        assert_eq!(
            r.backend().calls(),
            &[
                GpuCall::FrameSize {
                    width: 800.0,
                    height: 450.0
                },
                GpuCall::Clear(Color::RED),
            ]
        );
    }

    // ── error policy ──────────────────────────────────────────────────────

    const FATAL_CHILD_ENV: &str = "TESSERA_FATAL_DRAW_CHILD";

    #[test]
    fn default_policy_is_fatal() {
        assert_eq!(ErrorPolicy::default(), ErrorPolicy::Fatal);
        assert_eq!(RendererConfig::default().error_policy, ErrorPolicy::Fatal);
    }

    #[test]
    fn fatal_policy_exits_with_status_one() {
        if std::env::var_os(FATAL_CHILD_ENV).is_some() {
            let mut r = Renderer::with_image_loader(
                RecordingBackend::new(),
                Rc::new(ascii_font()),
                RendererConfig::default(),
                Box::new(FakeImages { channels: 4 }),
            );
            let _ = r.draw_rect(Rect::new(0.0, 0.0, 1.0, 1.0), "missing.png");
            // Only reached when the failed draw returned instead of exiting.
            std::process::exit(0);
        }

        let status = std::process::Command::new(std::env::current_exe().unwrap())
            .args([
                "--exact",
                "render::renderer::tests::fatal_policy_exits_with_status_one",
                "--test-threads=1",
            ])
            .env(FATAL_CHILD_ENV, "1")
            .status()
            .unwrap();
        assert_eq!(status.code(), Some(1));
    }
}
