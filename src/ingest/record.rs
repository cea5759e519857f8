use std::fmt;

use crate::foundation::error::{BannerError, BannerResult};

/// Raw, untrimmed cell values for one row, before validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RecordFields {
    pub name: String,
    pub day: String,
    pub time: String,
    pub neighborhood: String,
    pub address: String,
    pub leaders: String,
    pub phone: String,
    /// Optional supervisor label; blank means "no group".
    #[serde(default)]
    pub group: String,
}

impl RecordFields {
    /// Trim every field and build a [`Record`].
    ///
    /// Any blank required field rejects the row with [`SkipReason::IncompleteData`].
    pub fn into_record(self) -> Result<Record, SkipReason> {
        let name = self.name.trim().to_string();
        let day = self.day.trim().to_string();
        let time = self.time.trim().to_string();
        let neighborhood = self.neighborhood.trim().to_string();
        let address = self.address.trim().to_string();
        let leaders = self.leaders.trim().to_string();
        let phone = self.phone.trim().to_string();

        let required = [&name, &day, &time, &neighborhood, &address, &leaders, &phone];
        if required.iter().any(|f| f.is_empty()) {
            return Err(SkipReason::IncompleteData);
        }

        let group = Some(self.group.trim())
            .filter(|g| !g.is_empty())
            .map(str::to_string);

        Ok(Record {
            name,
            day,
            time,
            neighborhood,
            address,
            leaders,
            phone,
            group,
        })
    }
}

/// One validated input row. Every field except `group` is non-empty and trimmed.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Record {
    name: String,
    day: String,
    time: String,
    neighborhood: String,
    address: String,
    leaders: String,
    phone: String,
    group: Option<String>,
}

impl Record {
    /// Validate `fields`, turning a skip into a [`BannerError::Validation`].
    pub fn try_from_fields(fields: RecordFields) -> BannerResult<Self> {
        fields
            .into_record()
            .map_err(|reason| BannerError::validation(format!("record rejected: {reason}")))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn day(&self) -> &str {
        &self.day
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn neighborhood(&self) -> &str {
        &self.neighborhood
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn leaders(&self) -> &str {
        &self.leaders
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// Same record routed to the flat namespace.
    pub fn without_group(mut self) -> Self {
        self.group = None;
        self
    }

    /// Same record with `group` applied when it has none; blank labels are ignored.
    pub fn or_group(mut self, group: Option<&str>) -> Self {
        if self.group.is_none() {
            self.group = group
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string);
        }
        self
    }
}

/// Why a row or record produced no artifacts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// A required column was missing or blank.
    IncompleteData,
    /// The record's day has no template.
    TemplateNotFound,
    /// One of the variants failed to render.
    RenderFailed(String),
}

impl SkipReason {
    /// Short, stable reason label.
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::IncompleteData => "incomplete data",
            SkipReason::TemplateNotFound => "template not found",
            SkipReason::RenderFailed(_) => "render failed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::RenderFailed(cause) => write!(f, "render failed: {cause}"),
            other => f.write_str(other.label()),
        }
    }
}

/// Per-row result of ingestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowOutcome {
    Record(Record),
    Skipped { name: String, reason: SkipReason },
}

#[cfg(test)]
#[path = "../../tests/unit/ingest/record.rs"]
mod tests;
