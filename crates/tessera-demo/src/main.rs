use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use winit::dpi::{LogicalPosition, LogicalSize};

use tessera_engine::coords::Rect;
use tessera_engine::core::{App, AppControl, FrameCtx};
use tessera_engine::device::GpuInit;
use tessera_engine::logging::{init_logging, LoggingConfig};
use tessera_engine::paint::{Color, Paint};
use tessera_engine::raster::Bitmap;
use tessera_engine::render::RendererConfig;
use tessera_engine::text::Font;
use tessera_engine::window::{Runtime, RuntimeConfig};

/// Assets and window placement for the demo scene.
#[derive(Debug, Clone)]
struct DemoConfig {
    font_path: PathBuf,
    image_path: PathBuf,
    atlas_size: (u32, u32),
    font_size: f32,
    codepoints: RangeInclusive<u32>,
    title: String,
    position: (f64, f64),
    size: (f64, f64),
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            font_path: PathBuf::from("./assets/JetBrainsMono-Regular.ttf"),
            image_path: PathBuf::from("./assets/image.png"),
            // Large enough for ASCII at 100px.
            atlas_size: (1000, 1000),
            font_size: 100.0,
            codepoints: 0..=127,
            title: "tessera demo".to_string(),
            position: (1000.0, 100.0),
            size: (800.0, 450.0),
        }
    }
}

struct Demo {
    image: Paint,
}

impl App for Demo {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> Result<AppControl> {
        let r = &mut *ctx.renderer;
        r.clear(Color::RED);
        r.draw_rect(Rect::new(300.0, 100.0, 400.0, 200.0), Color::BLACK)?;
        r.draw_rect(Rect::new(100.0, 100.0, 200.0, 200.0), self.image.clone())?;
        r.draw_text_fmt(100.0, 300.0, 50.0, format_args!("Hello, {}", "Bob"))?;

        if ctx.time.frame_index % 600 == 0 {
            log::debug!(
                "frame {} ({:.0} fps, {}x{})",
                ctx.time.frame_index,
                ctx.time.fps(),
                ctx.width(),
                ctx.height()
            );
        }
        Ok(AppControl::Continue)
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = DemoConfig::default();
    let (atlas_w, atlas_h) = config.atlas_size;
    let font = Font::new(
        Bitmap::new(atlas_w, atlas_h, 4),
        config.codepoints.clone(),
        config.font_size,
        &config.font_path,
    )
    .context("failed to build the font atlas")?;

    let runtime = RuntimeConfig {
        title: config.title.clone(),
        position: Some(LogicalPosition::new(config.position.0, config.position.1)),
        initial_size: LogicalSize::new(config.size.0, config.size.1),
    };

    Runtime::run(
        runtime,
        GpuInit::default(),
        RendererConfig::default(),
        Rc::new(font),
        Demo {
            image: Paint::image(config.image_path),
        },
    )?;

    println!("EXIT_SUCCESS");
    Ok(())
}
