use std::{collections::HashMap, io::Cursor, path::PathBuf};

use super::*;
use crate::foundation::error::BannerError;
use crate::render::{TextPainter, TextRun};

struct NullPainter;

impl TextPainter for NullPainter {
    fn measure(&mut self, text: &str, size_px: f32) -> BannerResult<f32> {
        Ok(text.len() as f32 * size_px * 0.5)
    }

    fn fill_text(&mut self, _: &mut vello_cpu::RenderContext, _: &TextRun) -> BannerResult<()> {
        Ok(())
    }
}

struct NullFace;

impl Typeface for NullFace {
    fn painter(&self) -> BannerResult<Box<dyn TextPainter>> {
        Ok(Box::new(NullPainter))
    }
}

/// Serves PNGs from memory.
struct MemorySource(HashMap<String, Vec<u8>>);

impl TemplateSource for MemorySource {
    fn fetch(&self, locator: &str) -> BannerResult<Vec<u8>> {
        self.0
            .get(locator)
            .cloned()
            .ok_or_else(|| BannerError::validation(format!("no template at '{locator}'")))
    }
}

fn png() -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        2,
        2,
        image::Rgba([9, 9, 9, 255]),
    ))
    .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
    .unwrap();
    buf
}

fn pipeline(name: &str) -> (BannerPipeline, PathBuf) {
    let out = std::env::temp_dir().join(format!(
        "bannerforge_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let mut config = BannerConfig {
        output_root: out.clone(),
        ..BannerConfig::default()
    };
    config.retry.attempts = 1;
    config.retry.delay_ms = 0;

    let templates = HashMap::from([
        ("mem://feed.png".to_string(), png()),
        ("mem://story.png".to_string(), png()),
    ]);
    let pipeline =
        BannerPipeline::with_source(config, Arc::new(NullFace), Arc::new(MemorySource(templates)))
            .unwrap();
    (pipeline, out)
}

fn fields(group: &str) -> RecordFields {
    RecordFields {
        name: "GC Luz".to_string(),
        day: "Domingo".to_string(),
        time: "18h".to_string(),
        neighborhood: "Centro".to_string(),
        address: "Rua A".to_string(),
        leaders: "Ana".to_string(),
        phone: "1".to_string(),
        group: group.to_string(),
    }
}

#[test]
fn single_record_renders_both_variants_flat() {
    let (pipeline, out) = pipeline("pipeline_single");
    let events = pipeline.subscribe();

    // Explicit locators bypass the day table, so even an unmapped day renders.
    let [feed, story] = pipeline
        .generate_single(fields("Carlos"), "mem://feed.png", "mem://story.png")
        .unwrap();
    assert_eq!(feed.path(), out.join("GC_Luz-feed.png"));
    assert_eq!(story.path(), out.join("GC_Luz-story.png"));
    assert!(feed.path().is_file() && story.path().is_file());
    assert!(!out.join("Carlos").exists());
    assert_eq!(events.try_iter().count(), 0);

    std::fs::remove_dir_all(&out).ok();
}

#[test]
fn single_record_validation_and_template_errors() {
    let (pipeline, out) = pipeline("pipeline_single_err");

    let mut incomplete = fields("");
    incomplete.phone = "   ".to_string();
    let err = pipeline
        .generate_single(incomplete, "mem://feed.png", "mem://story.png")
        .unwrap_err();
    assert!(matches!(err, BannerError::Validation(_)));

    let err = pipeline
        .generate_single(fields(""), "mem://feed.png", "mem://missing.png")
        .unwrap_err();
    assert!(matches!(
        err,
        BannerError::Render {
            variant: Variant::Story,
            ..
        }
    ));
    // The feed drew fine but is not written without its story.
    assert!(!out.join("GC_Luz-feed.png").exists());

    std::fs::remove_dir_all(&out).ok();
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let mut config = BannerConfig::default();
    config.retry.attempts = 0;
    assert!(BannerPipeline::new(config, Arc::new(NullFace)).is_err());
}
