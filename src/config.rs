use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;

use crate::batch::BatchSettings;
use crate::foundation::{
    error::{BannerError, BannerResult},
    retry::RetryPolicy,
};
use crate::ingest::{Delimiter, IngestOptions};

/// Deployment settings for a generator instance.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BannerConfig {
    /// Directory or URL prefix holding the day templates.
    pub template_root: String,
    pub template_extension: String,
    pub output_root: PathBuf,
    /// Defaults to `<output_root>/banners.zip`.
    pub archive_path: Option<PathBuf>,
    /// When set, the terminal event links `<public_base_url>/<archive file name>`.
    pub public_base_url: Option<String>,
    /// TTF/OTF used for every text field.
    pub font: Option<PathBuf>,
    pub delimiter: Delimiter,
    /// Group assigned to batch rows that have none.
    pub fallback_group: Option<String>,
    /// Delete the batch input file after reading it.
    pub consume_input: bool,
    pub fetch_timeout_secs: u64,
    pub retry: RetryPolicy,
    pub batch: BatchSettings,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            template_root: "templates".to_string(),
            template_extension: "png".to_string(),
            output_root: PathBuf::from("banners"),
            archive_path: None,
            public_base_url: None,
            font: None,
            delimiter: Delimiter::Tab,
            fallback_group: None,
            consume_input: true,
            fetch_timeout_secs: 30,
            retry: RetryPolicy::default(),
            batch: BatchSettings::default(),
        }
    }
}

impl BannerConfig {
    pub fn from_path(path: &Path) -> BannerResult<Self> {
        let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
        let config: BannerConfig = serde_json::from_reader(BufReader::new(f))
            .with_context(|| format!("parse config JSON '{}'", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> BannerResult<()> {
        if self.template_root.trim().is_empty() {
            return Err(BannerError::validation("template_root must not be empty"));
        }
        if self.template_extension.trim().is_empty() || self.template_extension.contains('/') {
            return Err(BannerError::validation(
                "template_extension must be a bare file extension",
            ));
        }
        if self.output_root.as_os_str().is_empty() {
            return Err(BannerError::validation("output_root must not be empty"));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(BannerError::validation("fetch_timeout_secs must be > 0"));
        }
        if self.batch.threads == Some(0) {
            return Err(BannerError::validation("batch.threads must be >= 1 when set"));
        }
        if let Some(url) = &self.public_base_url
            && url.trim().is_empty()
        {
            return Err(BannerError::validation("public_base_url must not be blank"));
        }
        self.retry.validate()
    }

    pub fn archive_path(&self) -> PathBuf {
        self.archive_path
            .clone()
            .unwrap_or_else(|| self.output_root.join("banners.zip"))
    }

    /// Public locator of the finished archive.
    pub fn archive_locator(&self) -> String {
        let archive = self.archive_path();
        match &self.public_base_url {
            Some(base) => {
                let name = archive
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("{}/{name}", base.trim_end_matches('/'))
            }
            None => archive.display().to_string(),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            delimiter: self.delimiter,
            fallback_group: self.fallback_group.clone(),
            consume_input: self.consume_input,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
