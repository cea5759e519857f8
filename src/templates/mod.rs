//! Day-of-week template resolution and loading.

pub mod fetch;
pub mod resolver;

pub use fetch::{DefaultTemplateSource, PreparedImage, TemplateFetcher, TemplateSource, decode_image};
pub use resolver::{TemplateReference, TemplateSet, TitleTone, supported_days, title_tone};
