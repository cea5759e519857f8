use std::{fs::File, io::Read, path::Path};

use crate::{
    foundation::error::{BannerError, BannerResult},
    ingest::record::{RecordFields, RowOutcome},
};

/// Cell separator of the tabular input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    #[default]
    Tab,
    Comma,
}

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Column {
    Name,
    Day,
    Time,
    Neighborhood,
    Address,
    Leaders,
    Phone,
    Group,
}

/// Map a header cell to a known column. English and Portuguese names are accepted in any case.
fn column_for(header: &str) -> Option<Column> {
    let key = header.trim().trim_start_matches('\u{feff}').to_lowercase();
    match key.as_str() {
        "name" | "nome" => Some(Column::Name),
        "day" | "dia" => Some(Column::Day),
        "time" | "horário" | "horario" => Some(Column::Time),
        "neighborhood" | "bairro" => Some(Column::Neighborhood),
        "address" | "endereço" | "endereco" => Some(Column::Address),
        "leaders" | "líderes" | "lideres" => Some(Column::Leaders),
        "phone" | "telefone" => Some(Column::Phone),
        "supervisor" | "group" => Some(Column::Group),
        _ => None,
    }
}

/// Lazy iterator of validated rows over a delimited byte stream.
///
/// The header row is consumed on construction. Each subsequent row yields either a
/// [`RowOutcome::Record`] or a [`RowOutcome::Skipped`]; a malformed row yields a
/// [`BannerError::StreamRead`].
pub struct RecordReader<R: Read> {
    rows: csv::StringRecordsIntoIter<R>,
    columns: Vec<Option<Column>>,
    fallback_group: Option<String>,
}

impl<R: Read> RecordReader<R> {
    pub fn new(reader: R, delimiter: Delimiter) -> BannerResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter.as_byte())
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let columns = rdr
            .headers()
            .map_err(|e| BannerError::stream_read(format!("read header row: {e}")))?
            .iter()
            .map(column_for)
            .collect();
        Ok(Self {
            rows: rdr.into_records(),
            columns,
            fallback_group: None,
        })
    }

    /// Assign `group` to rows that carry no group label of their own.
    pub fn with_fallback_group(mut self, group: Option<String>) -> Self {
        self.fallback_group = group;
        self
    }

    fn outcome(&self, row: &csv::StringRecord) -> RowOutcome {
        let mut fields = RecordFields::default();
        for (cell, column) in row.iter().zip(&self.columns) {
            let Some(column) = column else {
                continue;
            };
            let slot = match column {
                Column::Name => &mut fields.name,
                Column::Day => &mut fields.day,
                Column::Time => &mut fields.time,
                Column::Neighborhood => &mut fields.neighborhood,
                Column::Address => &mut fields.address,
                Column::Leaders => &mut fields.leaders,
                Column::Phone => &mut fields.phone,
                Column::Group => &mut fields.group,
            };
            *slot = cell.to_string();
        }

        let name = fields.name.trim().to_string();
        match fields.into_record() {
            Ok(record) => RowOutcome::Record(record.or_group(self.fallback_group.as_deref())),
            Err(reason) => RowOutcome::Skipped { name, reason },
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = BannerResult<RowOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        Some(
            row.map(|r| self.outcome(&r))
                .map_err(|e| BannerError::stream_read(format!("read row: {e}"))),
        )
    }
}

/// Options for [`ingest_file`].
#[derive(Clone, Debug)]
pub struct IngestOptions {
    pub delimiter: Delimiter,
    pub fallback_group: Option<String>,
    /// Delete the source file once it has been read completely.
    pub consume_input: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Tab,
            fallback_group: None,
            consume_input: true,
        }
    }
}

/// Every row of one input file, in input order.
#[derive(Clone, Debug, Default)]
pub struct IngestedBatch {
    pub rows: Vec<RowOutcome>,
}

impl IngestedBatch {
    /// Number of rows that passed validation.
    pub fn valid_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| matches!(r, RowOutcome::Record(_)))
            .count()
    }

    /// Number of rows rejected during validation.
    pub fn skipped_count(&self) -> usize {
        self.rows.len() - self.valid_count()
    }
}

/// Read `path` to completion.
///
/// Any read failure aborts the whole ingestion and leaves the file in place. After a complete
/// read the file is deleted when `opts.consume_input` is set.
#[tracing::instrument(skip(opts), fields(path = %path.display()))]
pub fn ingest_file(path: &Path, opts: &IngestOptions) -> BannerResult<IngestedBatch> {
    let file = File::open(path)
        .map_err(|e| BannerError::stream_read(format!("open '{}': {e}", path.display())))?;
    let buffered = std::io::BufReader::with_capacity(64 * 1024, file);
    let reader = RecordReader::new(buffered, opts.delimiter)?
        .with_fallback_group(opts.fallback_group.clone());

    let rows = reader.collect::<BannerResult<Vec<_>>>()?;
    let batch = IngestedBatch { rows };
    tracing::info!(
        rows = batch.rows.len(),
        valid = batch.valid_count(),
        skipped = batch.skipped_count(),
        "input ingested"
    );

    if opts.consume_input
        && let Err(e) = std::fs::remove_file(path)
    {
        tracing::warn!(error = %e, "could not remove consumed input");
    }

    Ok(batch)
}

#[cfg(test)]
#[path = "../../tests/unit/ingest/reader.rs"]
mod tests;
