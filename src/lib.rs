//! bannerforge turns a spreadsheet of weekly meetings into ready-to-post banners.
//!
//! Each input row becomes two PNGs, a square feed image and a tall story image, drawn over the
//! template for the meeting's weekday. A batch run:
//!
//! - Ingests a tab or comma separated file into [`Record`]s
//! - Renders every record on a worker pool, chunk by chunk, reporting [`ProgressEvent`]s
//! - Zips the output directory once the last chunk has settled
#![forbid(unsafe_code)]

mod foundation;

pub mod archive;
pub mod batch;
pub mod config;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod templates;

pub use crate::foundation::core::{Canvas, Rgba8, TextAlign, Variant};
pub use crate::foundation::error::{BannerError, BannerResult};
pub use crate::foundation::retry::{Exhausted, RetryPolicy, retry_fixed};

pub use crate::archive::{ArchiveSummary, build_archive};
pub use crate::batch::{
    BatchReport, BatchScheduler, BatchSettings, ProgressBroadcaster, ProgressEvent, WireEvent,
    WireStatus,
};
pub use crate::config::BannerConfig;
pub use crate::ingest::{
    Delimiter, IngestOptions, IngestedBatch, Record, RecordFields, RecordReader, RowOutcome,
    SkipReason, ingest_file,
};
pub use crate::output::{OutputNamer, OutputRoot};
pub use crate::pipeline::{BannerPipeline, BatchOutcome};
pub use crate::render::{
    Artifact, BannerRenderer, FontFace, ParleyPainter, RenderedBanner, TextPainter, TextRun,
    Typeface,
};
pub use crate::templates::{
    DefaultTemplateSource, TemplateFetcher, TemplateReference, TemplateSet, TemplateSource,
    TitleTone, title_tone,
};
