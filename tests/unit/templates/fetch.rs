use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};

use super::*;

fn png_bytes(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Fails the first `failures` fetches, then serves a 2x2 PNG.
struct FlakySource {
    failures: u32,
    calls: AtomicU32,
}

impl TemplateSource for FlakySource {
    fn fetch(&self, locator: &str) -> BannerResult<Vec<u8>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n <= self.failures {
            return Err(BannerError::validation(format!("{locator} unavailable")));
        }
        Ok(png_bytes(2, 2, [10, 20, 30, 255]))
    }
}

fn fast_policy(attempts: u32) -> RetryPolicy {
    RetryPolicy::new(attempts, Duration::ZERO)
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = png_bytes(1, 1, [100, 50, 200, 128]);
    let prepared = decode_image(&buf).unwrap();
    assert_eq!(prepared.width, 1);
    assert_eq!(prepared.height, 1);
    assert_eq!(
        prepared.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode_image(b"not an image").is_err());
}

#[test]
fn transient_failures_are_retried() {
    let source = Arc::new(FlakySource {
        failures: 3,
        calls: AtomicU32::new(0),
    });
    let fetcher = TemplateFetcher::new(source.clone(), fast_policy(5));
    let img = fetcher.load("t/gcsegundafeed.png").unwrap();
    assert_eq!((img.width, img.height), (2, 2));
    assert_eq!(source.calls.load(Ordering::SeqCst), 4);
}

#[test]
fn exhaustion_reports_attempt_count() {
    let source = Arc::new(FlakySource {
        failures: u32::MAX,
        calls: AtomicU32::new(0),
    });
    let fetcher = TemplateFetcher::new(source.clone(), fast_policy(5));
    let err = fetcher.load("https://down.example/t.png").unwrap_err();
    let BannerError::TemplateFetch {
        locator, attempts, ..
    } = err
    else {
        panic!("expected template fetch error");
    };
    assert_eq!(locator, "https://down.example/t.png");
    assert_eq!(attempts, 5);
    assert_eq!(source.calls.load(Ordering::SeqCst), 5);
}

#[test]
fn successful_loads_are_cached_failures_are_not() {
    let source = Arc::new(FlakySource {
        failures: 1,
        calls: AtomicU32::new(0),
    });
    let fetcher = TemplateFetcher::new(source.clone(), fast_policy(1));
    assert!(fetcher.load("a.png").is_err());
    fetcher.load("a.png").unwrap();
    fetcher.load("a.png").unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn default_source_reads_files() {
    let dir = std::env::temp_dir().join(format!(
        "bannerforge_fetch_file_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("gcterca_feed.png");
    std::fs::write(&path, png_bytes(3, 1, [0, 0, 0, 255])).unwrap();

    let source = DefaultTemplateSource::default();
    let bytes = source.fetch(path.to_str().unwrap()).unwrap();
    assert_eq!(decode_image(&bytes).unwrap().width, 3);
    assert!(source.fetch(dir.join("missing.png").to_str().unwrap()).is_err());

    std::fs::remove_dir_all(&dir).ok();
}
