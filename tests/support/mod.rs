#![allow(dead_code)]

use std::{io::Cursor, path::PathBuf};

use bannerforge::{BannerResult, Rgba8, TextPainter, TextRun, Typeface};

/// Draws every run as one solid block, half an em wide per character.
pub struct BlockPainter;

impl TextPainter for BlockPainter {
    fn measure(&mut self, text: &str, size_px: f32) -> BannerResult<f32> {
        Ok(text.chars().count() as f32 * size_px * 0.5)
    }

    fn fill_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        run: &TextRun,
    ) -> BannerResult<()> {
        let width = f64::from(self.measure(&run.text, run.size_px)?);
        let left = run.align.left_edge(run.x, width);
        let Rgba8 { r, g, b, a } = run.color;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            left,
            run.baseline - f64::from(run.size_px) * 0.7,
            left + width,
            run.baseline,
        ));
        Ok(())
    }
}

pub struct BlockFace;

impl Typeface for BlockFace {
    fn painter(&self) -> BannerResult<Box<dyn TextPainter>> {
        Ok(Box::new(BlockPainter))
    }
}

pub fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "bannerforge_it_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

pub fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba(rgba),
    ))
    .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
    .unwrap();
    buf
}

/// Write a template for every mapped day and variant into `dir`.
pub fn write_templates(dir: &std::path::Path, rgba: [u8; 4]) {
    std::fs::create_dir_all(dir).unwrap();
    let bytes = png(6, 6, rgba);
    for slug in ["gcsegunda", "gcterca", "gcquarta", "gcquinta", "gcsexta", "gcsabado"] {
        for variant in ["feed", "story"] {
            std::fs::write(dir.join(format!("{slug}{variant}.png")), &bytes).unwrap();
        }
    }
}

/// A real font from the host, if one can be found.
pub fn system_font() -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(p) = std::env::var("BANNERFORGE_TEST_FONT") {
        candidates.push(PathBuf::from(p));
    }
    candidates.extend(
        [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/Library/Fonts/Arial.ttf",
        ]
        .map(PathBuf::from),
    );
    candidates.into_iter().find(|p| p.is_file())
}
