use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::foundation::{
    core::Rgba8,
    error::{BannerError, BannerResult},
};
use crate::render::layout::TextRun;

/// Measures and draws text onto a render context.
///
/// Painters hold mutable shaping state, so each render worker owns one.
pub trait TextPainter {
    /// Advance width of `text` at `size_px`, in pixels.
    fn measure(&mut self, text: &str, size_px: f32) -> BannerResult<f32>;

    /// Draw `run` so that its first line sits on `run.baseline`.
    fn fill_text(&mut self, ctx: &mut vello_cpu::RenderContext, run: &TextRun)
    -> BannerResult<()>;
}

/// A shareable typeface that hands out per-worker painters.
pub trait Typeface: Send + Sync {
    fn painter(&self) -> BannerResult<Box<dyn TextPainter>>;
}

/// Typeface backed by raw TrueType/OpenType bytes.
#[derive(Clone, Debug)]
pub struct FontFace {
    bytes: Arc<Vec<u8>>,
}

impl FontFace {
    pub fn from_bytes(bytes: Vec<u8>) -> BannerResult<Self> {
        if bytes.is_empty() {
            return Err(BannerError::validation("font file is empty"));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
        })
    }

    pub fn from_path(path: &Path) -> BannerResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }
}

impl Typeface for FontFace {
    fn painter(&self) -> BannerResult<Box<dyn TextPainter>> {
        Ok(Box::new(ParleyPainter::new(&self.bytes)?))
    }
}

/// Shapes with parley and rasterizes glyph runs through `vello_cpu`.
pub struct ParleyPainter {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    family: String,
    font: vello_cpu::peniko::FontData,
}

impl ParleyPainter {
    pub fn new(font_bytes: &[u8]) -> BannerResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            BannerError::validation("no font families registered from font bytes")
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| BannerError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font: vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
                0,
            ),
        })
    }

    /// Every banner field is set bold in the registered family.
    fn field_styles(
        &self,
        size_px: f32,
        color: Rgba8,
    ) -> [parley::style::StyleProperty<'static, Rgba8>; 4] {
        use parley::style::{FontStack, FontWeight, StyleProperty};
        [
            StyleProperty::FontStack(FontStack::Source(std::borrow::Cow::Owned(
                self.family.clone(),
            ))),
            StyleProperty::FontSize(size_px),
            StyleProperty::FontWeight(FontWeight::BOLD),
            StyleProperty::Brush(color),
        ]
    }

    fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        color: Rgba8,
    ) -> BannerResult<parley::Layout<Rgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(BannerError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let styles = self.field_styles(size_px, color);
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        for style in styles {
            builder.push_default(style);
        }

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

impl TextPainter for ParleyPainter {
    fn measure(&mut self, text: &str, size_px: f32) -> BannerResult<f32> {
        Ok(self.layout(text, size_px, Rgba8::BLACK)?.width())
    }

    fn fill_text(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        run: &TextRun,
    ) -> BannerResult<()> {
        let layout = self.layout(&run.text, run.size_px, run.color)?;
        let Some(first) = layout.lines().next() else {
            return Ok(());
        };
        let left = run.align.left_edge(run.x, f64::from(layout.width()));
        let top = run.baseline - f64::from(first.metrics().baseline);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((left, top)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(glyph_run) = item else {
                    continue;
                };

                let brush = glyph_run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = glyph_run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(glyph_run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
