use std::{
    collections::HashMap,
    io::Read,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Context;

use crate::foundation::{
    error::{BannerError, BannerResult},
    retry::{RetryPolicy, retry_fixed},
};

// Upper bound on a downloaded template body.
const MAX_TEMPLATE_BYTES: u64 = 32 * 1024 * 1024;

/// Where template bytes come from.
pub trait TemplateSource: Send + Sync {
    /// Return the encoded image bytes behind `locator`.
    fn fetch(&self, locator: &str) -> BannerResult<Vec<u8>>;
}

/// Reads `http://` and `https://` locators over HTTP, everything else from the file system.
#[derive(Clone, Debug)]
pub struct DefaultTemplateSource {
    timeout: Duration,
}

impl Default for DefaultTemplateSource {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl DefaultTemplateSource {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

fn is_remote(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

impl TemplateSource for DefaultTemplateSource {
    fn fetch(&self, locator: &str) -> BannerResult<Vec<u8>> {
        if !is_remote(locator) {
            let bytes = std::fs::read(locator)
                .with_context(|| format!("read template file '{locator}'"))?;
            return Ok(bytes);
        }

        let resp = ureq::get(locator)
            .timeout(self.timeout)
            .call()
            .map_err(|e| anyhow::anyhow!("GET '{locator}': {e}"))?;
        let mut bytes = Vec::new();
        resp.into_reader()
            .take(MAX_TEMPLATE_BYTES)
            .read_to_end(&mut bytes)
            .with_context(|| format!("read body of '{locator}'"))?;
        Ok(bytes)
    }
}

/// Decoded template raster in premultiplied RGBA8 form.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    pub width: u32,
    pub height: u32,
    /// Row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> BannerResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
}

/// Loads and decodes templates with bounded retry, caching successful decodes per locator.
///
/// Shared by every render worker; failures are never cached, so a later record retries a
/// template that was down earlier.
pub struct TemplateFetcher {
    source: Arc<dyn TemplateSource>,
    policy: RetryPolicy,
    cache: Mutex<HashMap<String, Arc<PreparedImage>>>,
}

impl TemplateFetcher {
    pub fn new(source: Arc<dyn TemplateSource>, policy: RetryPolicy) -> Self {
        Self {
            source,
            policy,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch and decode `locator`, retrying transient failures.
    ///
    /// Fails with [`BannerError::TemplateFetch`] once every attempt has failed.
    pub fn load(&self, locator: &str) -> BannerResult<Arc<PreparedImage>> {
        if let Some(hit) = self.cached(locator) {
            return Ok(hit);
        }

        let image = retry_fixed(&self.policy, locator, |_| {
            self.source
                .fetch(locator)
                .and_then(|bytes| decode_image(&bytes))
        })
        .map_err(|e| BannerError::TemplateFetch {
            locator: locator.to_string(),
            attempts: e.attempts,
            cause: format!("{:#}", e.last),
        })?;

        let image = Arc::new(image);
        self.cache
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(locator.to_string(), Arc::clone(&image));
        tracing::debug!(%locator, width = image.width, height = image.height, "template loaded");
        Ok(image)
    }

    fn cached(&self, locator: &str) -> Option<Arc<PreparedImage>> {
        self.cache
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(locator)
            .cloned()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/templates/fetch.rs"]
mod tests;
