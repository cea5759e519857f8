use crate::foundation::{
    core::{Rgba8, TextAlign, Variant},
    error::BannerResult,
};
use crate::ingest::Record;
use crate::templates::title_tone;

/// Anchor (baseline), size, color and alignment of one overlay field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldStyle {
    pub x: f64,
    pub y: f64,
    pub size_px: f32,
    pub color: Rgba8,
    pub align: TextAlign,
}

const fn field(x: f64, y: f64, size_px: f32, align: TextAlign) -> FieldStyle {
    FieldStyle {
        x,
        y,
        size_px,
        color: Rgba8::BLACK,
        align,
    }
}

/// Field placement for one variant.
///
/// The title color is decided per day (see [`title_tone`]); the leaders line is anchored below
/// the wrapped address, so only its x, size and alignment are used.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariantLayout {
    pub title: FieldStyle,
    pub day: FieldStyle,
    pub time: FieldStyle,
    pub neighborhood: FieldStyle,
    pub address: FieldStyle,
    pub leaders: FieldStyle,
}

const FEED_LAYOUT: VariantLayout = VariantLayout {
    title: field(540.0, 720.0, 60.0, TextAlign::Center),
    day: field(480.0, 856.0, 40.0, TextAlign::Left),
    time: field(655.0, 856.0, 40.0, TextAlign::Left),
    neighborhood: field(540.0, 920.0, 25.0, TextAlign::Center),
    address: field(540.0, 980.0, 25.0, TextAlign::Center),
    leaders: field(540.0, 1010.0, 25.0, TextAlign::Center),
};

const STORY_LAYOUT: VariantLayout = VariantLayout {
    title: field(540.0, 1095.0, 60.0, TextAlign::Center),
    day: field(465.0, 1460.0, 48.0, TextAlign::Left),
    time: field(655.0, 1460.0, 48.0, TextAlign::Left),
    neighborhood: field(540.0, 1540.0, 35.0, TextAlign::Center),
    address: field(540.0, 1590.0, 35.0, TextAlign::Center),
    leaders: field(540.0, 1635.0, 35.0, TextAlign::Center),
};

impl VariantLayout {
    pub fn for_variant(variant: Variant) -> &'static VariantLayout {
        match variant {
            Variant::Feed => &FEED_LAYOUT,
            Variant::Story => &STORY_LAYOUT,
        }
    }
}

/// Word-wrap parameters for the address block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WrapSpec {
    pub max_width_px: f32,
    pub line_height: f64,
    /// Space between the last address line and the leaders line.
    pub gap: f64,
}

pub const ADDRESS_WRAP: WrapSpec = WrapSpec {
    max_width_px: 800.0,
    line_height: 36.0,
    gap: 10.0,
};

/// Day label shown on the banner: text before any hyphen, first word, upper-cased.
///
/// `"Segunda-feira"` becomes `"SEGUNDA"`.
pub fn day_label(day: &str) -> String {
    let head = day.split('-').next().unwrap_or_default();
    head.split(' ')
        .next()
        .unwrap_or_default()
        .trim()
        .to_uppercase()
}

/// Greedily pack words into lines no wider than `max_width`.
///
/// A line is closed when appending the next word would exceed the width; a single word wider
/// than `max_width` gets a line of its own.
pub fn wrap_words<F>(text: &str, max_width: f32, mut measure: F) -> BannerResult<Vec<String>>
where
    F: FnMut(&str) -> BannerResult<f32>,
{
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{line} {word}");
        if measure(&candidate)? > max_width {
            lines.push(std::mem::replace(&mut line, word.to_string()));
        } else {
            line = candidate;
        }
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    Ok(lines)
}

/// One positioned line of overlay text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub x: f64,
    /// Baseline y.
    pub baseline: f64,
    pub size_px: f32,
    pub color: Rgba8,
    pub align: TextAlign,
}

impl TextRun {
    fn at(text: impl Into<String>, style: &FieldStyle) -> Self {
        Self {
            text: text.into(),
            x: style.x,
            baseline: style.y,
            size_px: style.size_px,
            color: style.color,
            align: style.align,
        }
    }
}

/// Lay out every overlay field of `record` for `variant`.
///
/// `measure(text, size_px)` returns the advance width of `text` in pixels; it is only used to
/// wrap the address.
pub fn plan_text<F>(record: &Record, variant: Variant, mut measure: F) -> BannerResult<Vec<TextRun>>
where
    F: FnMut(&str, f32) -> BannerResult<f32>,
{
    let layout = VariantLayout::for_variant(variant);
    let mut runs = Vec::with_capacity(8);

    let mut title = TextRun::at(record.name().to_uppercase(), &layout.title);
    title.color = title_tone(record.day()).color();
    runs.push(title);

    runs.push(TextRun::at(
        format!("{},", day_label(record.day())),
        &layout.day,
    ));
    runs.push(TextRun::at(record.time(), &layout.time));
    runs.push(TextRun::at(record.neighborhood(), &layout.neighborhood));

    let address = format!("Local: {}", record.address());
    let size = layout.address.size_px;
    let lines = wrap_words(&address, ADDRESS_WRAP.max_width_px, |s| measure(s, size))?;
    for (i, line) in lines.iter().enumerate() {
        let mut run = TextRun::at(line.as_str(), &layout.address);
        run.baseline += i as f64 * ADDRESS_WRAP.line_height;
        runs.push(run);
    }

    let wrapped_height = lines.len() as f64 * ADDRESS_WRAP.line_height;
    let mut leaders = TextRun::at(
        format!("{} - {}", record.leaders(), record.phone()),
        &layout.leaders,
    );
    leaders.baseline = layout.address.y + wrapped_height + ADDRESS_WRAP.gap;
    runs.push(leaders);

    Ok(runs)
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
