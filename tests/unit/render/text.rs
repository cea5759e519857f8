use super::*;
use crate::foundation::core::TextAlign;

fn system_font() -> Option<Vec<u8>> {
    let candidates = [
        std::env::var("BANNERFORGE_TEST_FONT").unwrap_or_default(),
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf".to_string(),
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string(),
        "/Library/Fonts/Arial.ttf".to_string(),
    ];
    candidates
        .iter()
        .filter(|p| !p.is_empty())
        .find_map(|p| std::fs::read(p).ok())
}

#[test]
fn empty_font_bytes_are_rejected() {
    assert!(FontFace::from_bytes(Vec::new()).is_err());
    assert!(ParleyPainter::new(b"not a font").is_err());
}

#[test]
fn measure_grows_with_text_and_size() {
    let Some(bytes) = system_font() else {
        return;
    };
    let face = FontFace::from_bytes(bytes).unwrap();
    let mut painter = face.painter().unwrap();

    let short = painter.measure("GC", 40.0).unwrap();
    let long = painter.measure("GC Vida Nova", 40.0).unwrap();
    let big = painter.measure("GC", 80.0).unwrap();
    assert!(short > 0.0);
    assert!(long > short);
    assert!((big / short - 2.0).abs() < 0.1);
    assert!(painter.measure("GC", 0.0).is_err());
}

#[test]
fn fill_text_paints_near_the_anchor() {
    let Some(bytes) = system_font() else {
        return;
    };
    let mut painter = ParleyPainter::new(&bytes).unwrap();
    let mut ctx = vello_cpu::RenderContext::new(200, 100);
    let run = TextRun {
        text: "HH".to_string(),
        x: 100.0,
        baseline: 60.0,
        size_px: 40.0,
        color: Rgba8::opaque(255, 0, 0),
        align: TextAlign::Center,
    };
    painter.fill_text(&mut ctx, &run).unwrap();

    let mut pixmap = vello_cpu::Pixmap::new(200, 100);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    let data = pixmap.data_as_u8_slice();

    let mut min_x = u32::MAX;
    let mut max_x = 0;
    let mut max_y = 0;
    for (i, px) in data.chunks_exact(4).enumerate() {
        if px[3] > 128 {
            let (x, y) = (i as u32 % 200, i as u32 / 200);
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
            assert!(px[0] > px[1] && px[0] > px[2]);
        }
    }
    assert!(max_x > 0, "nothing was drawn");
    // Centered on x=100 and resting on the baseline.
    assert!(min_x < 100 && max_x > 100);
    assert!(((min_x + max_x) as i32 / 2 - 100).abs() <= 6);
    assert!((58..=62).contains(&max_y));
}

#[test]
fn fields_are_shaped_bold() {
    let Some(bytes) = system_font() else {
        return;
    };
    let painter = ParleyPainter::new(&bytes).unwrap();
    let styles = painter.field_styles(40.0, Rgba8::BLACK);
    assert!(styles.iter().any(|s| matches!(
        s,
        parley::style::StyleProperty::FontWeight(w) if *w == parley::style::FontWeight::BOLD
    )));
    assert!(styles.iter().any(|s| matches!(
        s,
        parley::style::StyleProperty::FontSize(size) if *size == 40.0
    )));
}
