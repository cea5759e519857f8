use rayon::prelude::*;

use crate::batch::progress::{ProgressBroadcaster, ProgressEvent};
use crate::foundation::error::{BannerError, BannerResult};
use crate::ingest::{Record, RowOutcome, SkipReason};
use crate::render::{Artifact, BannerRenderer, TextPainter, Typeface};
use crate::templates::{TemplateReference, TemplateSet};

/// Chunking and worker-pool settings for a batch run.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Records per chunk; `0` is treated as `1`.
    pub batch_size: usize,
    /// Worker threads; defaults to the chunk size.
    pub threads: Option<usize>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            batch_size: 20,
            threads: None,
        }
    }
}

/// What a batch run produced.
#[derive(Clone, Debug, Default)]
pub struct BatchReport {
    /// Chunk order, then record order, feed before story.
    pub artifacts: Vec<Artifact>,
    pub generated: usize,
    pub skipped: usize,
    pub chunks: usize,
}

/// Drives rendering of a whole batch, chunk by chunk, reporting each record's outcome.
pub struct BatchScheduler<'a> {
    renderer: &'a BannerRenderer,
    templates: &'a TemplateSet,
    typeface: &'a dyn Typeface,
    progress: &'a ProgressBroadcaster,
    settings: BatchSettings,
}

impl<'a> BatchScheduler<'a> {
    pub fn new(
        renderer: &'a BannerRenderer,
        templates: &'a TemplateSet,
        typeface: &'a dyn Typeface,
        progress: &'a ProgressBroadcaster,
        settings: BatchSettings,
    ) -> Self {
        Self {
            renderer,
            templates,
            typeface,
            progress,
            settings,
        }
    }

    /// Render every record in `rows`.
    ///
    /// Individual record failures become `Skipped` events; only a worker-pool construction
    /// failure fails the call. Returns once every chunk has settled.
    #[tracing::instrument(skip_all, fields(rows = rows.len()))]
    pub fn run(&self, rows: Vec<RowOutcome>) -> BannerResult<BatchReport> {
        let chunk_size = normalized_chunk_size(self.settings.batch_size);
        let pool = build_thread_pool(self.settings.threads.unwrap_or(chunk_size))?;
        let mut report = BatchReport::default();

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            match row {
                RowOutcome::Record(record) => records.push(record),
                RowOutcome::Skipped { name, reason } => {
                    report.skipped += 1;
                    self.skip(name, reason);
                }
            }
        }

        for (index, chunk) in records.chunks(chunk_size).enumerate() {
            tracing::debug!(chunk = index, records = chunk.len(), "chunk started");
            self.run_chunk(&pool, index * chunk_size, chunk, &mut report);
            report.chunks += 1;
        }

        tracing::info!(
            generated = report.generated,
            skipped = report.skipped,
            chunks = report.chunks,
            artifacts = report.artifacts.len(),
            "batch finished"
        );
        Ok(report)
    }

    fn run_chunk(
        &self,
        pool: &rayon::ThreadPool,
        offset: usize,
        chunk: &[Record],
        report: &mut BatchReport,
    ) {
        // `collect` inside `install` is the join: nothing below runs until every record settled.
        let settled = pool.install(|| {
            chunk
                .par_iter()
                .enumerate()
                .map_init(
                    || self.typeface.painter(),
                    |painter, (i, record)| self.settle(painter, offset + i, record),
                )
                .collect::<Vec<_>>()
        });

        for outcome in settled {
            match outcome {
                Some(pair) => {
                    report.generated += 1;
                    report.artifacts.extend(pair);
                }
                None => report.skipped += 1,
            }
        }
    }

    /// Render one record and publish its event as soon as it is known.
    ///
    /// `seq` is the record's position in the batch; it keeps staging files of same-named
    /// records apart.
    fn settle(
        &self,
        painter: &mut BannerResult<Box<dyn TextPainter>>,
        seq: usize,
        record: &Record,
    ) -> Option<[Artifact; 2]> {
        let Some(pair) = self.templates.resolve_pair(record.day()) else {
            self.skip(record.name().to_string(), SkipReason::TemplateNotFound);
            return None;
        };

        match self.render_pair(painter, seq, record, &pair) {
            Ok(artifacts) => {
                self.progress.publish(ProgressEvent::Generated {
                    name: record.name().to_string(),
                });
                Some(artifacts)
            }
            Err(e) => {
                tracing::warn!(record = record.name(), cause = %e, "record not generated");
                self.skip(
                    record.name().to_string(),
                    SkipReason::RenderFailed(e.to_string()),
                );
                None
            }
        }
    }

    /// Both variants are drawn before either is written.
    fn render_pair(
        &self,
        painter: &mut BannerResult<Box<dyn TextPainter>>,
        seq: usize,
        record: &Record,
        [feed, story]: &[TemplateReference; 2],
    ) -> BannerResult<[Artifact; 2]> {
        let painter = match painter {
            Ok(painter) => painter.as_mut(),
            Err(e) => {
                return Err(BannerError::render(
                    record.name(),
                    feed.variant,
                    BannerError::validation(format!("text painter unavailable: {e}")),
                ));
            }
        };
        let feed = self.renderer.draw(painter, record, feed)?;
        let story = self.renderer.draw(painter, record, story)?;
        self.renderer.commit(record, [feed, story], seq)
    }

    fn skip(&self, name: String, reason: SkipReason) {
        tracing::info!(record = %name, %reason, "record skipped");
        self.progress.publish(ProgressEvent::Skipped { name, reason });
    }
}

fn build_thread_pool(threads: usize) -> BannerResult<rayon::ThreadPool> {
    if threads == 0 {
        return Err(BannerError::validation("batch 'threads' must be >= 1"));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("bannerforge-render-{i}"))
        .build()
        .map_err(|e| anyhow::anyhow!("failed to build rayon thread pool: {e}").into())
}

fn normalized_chunk_size(chunk_size: usize) -> usize {
    chunk_size.max(1)
}

#[cfg(test)]
#[path = "../../tests/unit/batch/scheduler.rs"]
mod tests;
