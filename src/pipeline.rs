//! End-to-end generation: batch input to archive, or one record to two banners.

use std::{path::Path, sync::Arc};

use crossbeam_channel::Receiver;

use crate::archive::{ArchiveSummary, build_archive};
use crate::batch::{BatchReport, BatchScheduler, ProgressBroadcaster, ProgressEvent};
use crate::config::BannerConfig;
use crate::foundation::{core::Variant, error::BannerResult};
use crate::ingest::{Record, RecordFields, RowOutcome, ingest_file};
use crate::output::{OutputNamer, OutputRoot};
use crate::render::{Artifact, BannerRenderer, Typeface};
use crate::templates::{
    DefaultTemplateSource, TemplateFetcher, TemplateReference, TemplateSet, TemplateSource,
};

/// Result of a finished batch run.
#[derive(Clone, Debug)]
pub struct BatchOutcome {
    pub report: BatchReport,
    pub archive: ArchiveSummary,
    /// What the terminal progress event pointed observers at.
    pub archive_locator: String,
}

/// A configured generator: output root, templates, renderer and progress fan-out.
pub struct BannerPipeline {
    config: BannerConfig,
    typeface: Arc<dyn Typeface>,
    root: OutputRoot,
    templates: TemplateSet,
    renderer: BannerRenderer,
    progress: ProgressBroadcaster,
}

impl BannerPipeline {
    /// Validate `config`, create the output root and read templates through the default source.
    pub fn new(config: BannerConfig, typeface: Arc<dyn Typeface>) -> BannerResult<Self> {
        let source = Arc::new(DefaultTemplateSource::with_timeout(config.fetch_timeout()));
        Self::with_source(config, typeface, source)
    }

    /// Like [`BannerPipeline::new`] with a custom template source.
    pub fn with_source(
        config: BannerConfig,
        typeface: Arc<dyn Typeface>,
        source: Arc<dyn TemplateSource>,
    ) -> BannerResult<Self> {
        config.validate()?;
        let root = OutputRoot::init(&config.output_root)?;
        let templates = TemplateSet::new(config.template_root.clone())
            .with_extension(config.template_extension.clone());
        let fetcher = Arc::new(TemplateFetcher::new(source, config.retry));
        let renderer = BannerRenderer::new(fetcher, OutputNamer::new(&root));

        Ok(Self {
            config,
            typeface,
            root,
            templates,
            renderer,
            progress: ProgressBroadcaster::new(),
        })
    }

    pub fn config(&self) -> &BannerConfig {
        &self.config
    }

    pub fn output_root(&self) -> &Path {
        self.root.path()
    }

    pub fn progress(&self) -> &ProgressBroadcaster {
        &self.progress
    }

    pub fn subscribe(&self) -> Receiver<ProgressEvent> {
        self.progress.subscribe()
    }

    /// Ingest `input`, render every row, then archive the output root.
    ///
    /// Per-record failures are reported as events; ingestion and archive failures fail the call.
    #[tracing::instrument(skip(self), fields(input = %input.display()))]
    pub fn generate_from_file(&self, input: &Path) -> BannerResult<BatchOutcome> {
        let batch = ingest_file(input, &self.config.ingest_options())?;
        self.generate_rows(batch.rows)
    }

    /// Render already-ingested rows, then archive the output root.
    pub fn generate_rows(&self, rows: Vec<RowOutcome>) -> BannerResult<BatchOutcome> {
        let scheduler = BatchScheduler::new(
            &self.renderer,
            &self.templates,
            self.typeface.as_ref(),
            &self.progress,
            self.config.batch.clone(),
        );
        // `run` returns only after the last chunk joined.
        let report = scheduler.run(rows)?;

        let archive = build_archive(self.root.path(), &self.config.archive_path())?;
        let archive_locator = self.config.archive_locator();
        self.progress.publish(ProgressEvent::BatchComplete {
            archive_locator: archive_locator.clone(),
        });
        tracing::info!(%archive_locator, files = archive.files, "batch archived");

        Ok(BatchOutcome {
            report,
            archive,
            archive_locator,
        })
    }

    /// Render one record against two explicit templates into the flat namespace.
    ///
    /// No progress events are emitted; the first failure is returned as is and nothing is
    /// written unless both variants drew.
    #[tracing::instrument(skip_all, fields(record = %record.name))]
    pub fn generate_single(
        &self,
        record: RecordFields,
        feed_locator: &str,
        story_locator: &str,
    ) -> BannerResult<[Artifact; 2]> {
        let record = Record::try_from_fields(record)?.without_group();
        let mut painter = self.typeface.painter()?;

        let feed = self.renderer.draw(
            painter.as_mut(),
            &record,
            &TemplateReference::explicit(feed_locator, Variant::Feed),
        )?;
        let story = self.renderer.draw(
            painter.as_mut(),
            &record,
            &TemplateReference::explicit(story_locator, Variant::Story),
        )?;
        self.renderer.commit(&record, [feed, story], 0)
    }
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
