use std::{
    io::Cursor,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;

use crate::foundation::{
    core::{Canvas, Variant, unpremultiply_in_place},
    error::{BannerError, BannerResult},
};
use crate::ingest::Record;
use crate::output::OutputNamer;
use crate::render::{layout::plan_text, text::TextPainter};
use crate::templates::{PreparedImage, TemplateFetcher, TemplateReference};

/// A banner written to the output namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub record: String,
    pub variant: Variant,
    pub path: PathBuf,
    /// Encoded PNG size.
    pub bytes: u64,
}

impl Artifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Rasterize `record` over `background` for `variant` and return straight-alpha RGBA8.
pub fn compose(
    painter: &mut dyn TextPainter,
    record: &Record,
    variant: Variant,
    background: &PreparedImage,
) -> BannerResult<image::RgbaImage> {
    let canvas = variant.canvas();
    let (w, h) = canvas.to_u16()?;
    let mut ctx = vello_cpu::RenderContext::new(w, h);

    draw_background(&mut ctx, canvas, background)?;

    let runs = plan_text(record, variant, |text, size| painter.measure(text, size))?;
    for run in &runs {
        painter.fill_text(&mut ctx, run)?;
    }

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    let mut rgba = pixmap.data_as_u8_slice().to_vec();
    unpremultiply_in_place(&mut rgba);
    image::RgbaImage::from_raw(canvas.width, canvas.height, rgba)
        .ok_or_else(|| BannerError::validation("rendered pixmap has unexpected length"))
}

/// Stretch the template over the full canvas.
fn draw_background(
    ctx: &mut vello_cpu::RenderContext,
    canvas: Canvas,
    background: &PreparedImage,
) -> BannerResult<()> {
    if background.width == 0 || background.height == 0 {
        return Err(BannerError::validation("template image is empty"));
    }
    let pixmap = premul_pixmap(&background.rgba8_premul, background.width, background.height)?;
    let (bw, bh) = (f64::from(background.width), f64::from(background.height));

    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_transform(vello_cpu::kurbo::Affine::scale_non_uniform(
        f64::from(canvas.width) / bw,
        f64::from(canvas.height) / bh,
    ));
    ctx.set_paint(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    });
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, bw, bh));
    Ok(())
}

fn premul_pixmap(rgba8_premul: &[u8], width: u32, height: u32) -> BannerResult<vello_cpu::Pixmap> {
    let (w, h) = Canvas { width, height }.to_u16()?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(BannerError::validation("template byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let pixels = rgba8_premul
        .chunks_exact(4)
        .map(|px| {
            may_have_opacities |= px[3] != 255;
            vello_cpu::peniko::color::PremulRgba8 {
                r: px[0],
                g: px[1],
                b: px[2],
                a: px[3],
            }
        })
        .collect();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

pub fn encode_png(img: &image::RgbaImage) -> BannerResult<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// A banner encoded in memory, not yet written to the output namespace.
#[derive(Clone, Debug)]
pub struct RenderedBanner {
    pub variant: Variant,
    pub png: Vec<u8>,
}

/// A variant written under its staging name, waiting to be moved into place.
struct Staged {
    tmp: PathBuf,
    artifact: Artifact,
}

fn staging_path(path: &Path, stage: usize) -> PathBuf {
    let file = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    path.with_file_name(format!(".{file}.{stage}.partial"))
}

fn discard(staged: &[Staged]) {
    for s in staged {
        if let Err(e) = std::fs::remove_file(&s.tmp) {
            tracing::warn!(
                path = %s.tmp.display(),
                error = %e,
                "failed to remove staged banner"
            );
        }
    }
}

/// Draws banners for records and commits them to the output namespace.
pub struct BannerRenderer {
    fetcher: Arc<TemplateFetcher>,
    namer: OutputNamer,
}

impl BannerRenderer {
    pub fn new(fetcher: Arc<TemplateFetcher>, namer: OutputNamer) -> Self {
        Self { fetcher, namer }
    }

    pub fn namer(&self) -> &OutputNamer {
        &self.namer
    }

    /// Fetch the template, draw the overlays and encode the PNG. Nothing is written.
    ///
    /// Any failure comes back as [`BannerError::Render`] naming the record and variant.
    #[tracing::instrument(skip_all, fields(record = record.name(), variant = %template.variant))]
    pub fn draw(
        &self,
        painter: &mut dyn TextPainter,
        record: &Record,
        template: &TemplateReference,
    ) -> BannerResult<RenderedBanner> {
        self.draw_inner(painter, record, template)
            .map(|png| RenderedBanner {
                variant: template.variant,
                png,
            })
            .map_err(|e| BannerError::render(record.name(), template.variant, e))
    }

    fn draw_inner(
        &self,
        painter: &mut dyn TextPainter,
        record: &Record,
        template: &TemplateReference,
    ) -> BannerResult<Vec<u8>> {
        let background = self.fetcher.load(&template.locator)?;
        let img = compose(painter, record, template.variant, &background)?;
        encode_png(&img)
    }

    /// Write a record's banners so that none lands unless all were staged.
    ///
    /// Each PNG goes to a staging file unique to `stage` next to its final path, then all are
    /// renamed into place. A failure removes only this call's staging files, never a file
    /// another record may own.
    pub fn commit<const N: usize>(
        &self,
        record: &Record,
        banners: [RenderedBanner; N],
        stage: usize,
    ) -> BannerResult<[Artifact; N]> {
        let mut staged = Vec::with_capacity(N);
        for banner in &banners {
            match self.stage(record, banner, stage) {
                Ok(s) => staged.push(s),
                Err(e) => {
                    discard(&staged);
                    return Err(e);
                }
            }
        }

        for (i, s) in staged.iter().enumerate() {
            if let Err(e) = std::fs::rename(&s.tmp, s.artifact.path()) {
                discard(&staged[i..]);
                let cause = anyhow::Error::new(e)
                    .context(format!("move banner into '{}'", s.artifact.path().display()));
                return Err(BannerError::render(
                    record.name(),
                    s.artifact.variant,
                    cause.into(),
                ));
            }
            tracing::debug!(
                path = %s.artifact.path().display(),
                bytes = s.artifact.bytes,
                "banner written"
            );
        }

        let artifacts: Vec<Artifact> = staged.into_iter().map(|s| s.artifact).collect();
        artifacts
            .try_into()
            .map_err(|_| BannerError::validation("staged banner count mismatch"))
    }

    fn stage(
        &self,
        record: &Record,
        banner: &RenderedBanner,
        stage: usize,
    ) -> BannerResult<Staged> {
        let write = || -> BannerResult<Staged> {
            let path = self.namer.resolve(record, banner.variant)?;
            let tmp = staging_path(&path, stage);
            std::fs::write(&tmp, &banner.png)
                .with_context(|| format!("write '{}'", tmp.display()))?;
            Ok(Staged {
                tmp,
                artifact: Artifact {
                    record: record.name().to_string(),
                    variant: banner.variant,
                    path,
                    bytes: banner.png.len() as u64,
                },
            })
        };
        write().map_err(|e| BannerError::render(record.name(), banner.variant, e))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/banner.rs"]
mod tests;
