//! Banner rasterization: field layout, text painting and template composition.

pub mod banner;
pub mod layout;
pub mod text;

pub use banner::{Artifact, BannerRenderer, RenderedBanner, compose, encode_png};
pub use layout::{
    ADDRESS_WRAP, FieldStyle, TextRun, VariantLayout, WrapSpec, day_label, plan_text, wrap_words,
};
pub use text::{FontFace, ParleyPainter, TextPainter, Typeface};
