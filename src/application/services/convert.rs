//! Conversion service
//!
//! Drives one conversion at a time: text in, rows, codec, text out.

use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::application::error_ext::FormatResultExt;
use crate::application::header::HeaderFilter;
use crate::application::naming::{dated_name, output_path, InputKind};
use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{entities_from_value, lang, Entity, LangProjection, Row, TreeCodec};
use crate::infrastructure::traits::FileSystem;
use crate::infrastructure::CsvRows;

/// Shape written for a fetched or projected sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Projection {
    /// Nested entity tree
    #[default]
    Tree,
    /// Language -> code -> entity dictionaries
    Lang,
    /// Unindented rows with composite codes
    Flat,
}

/// Outcome of one file in a batch.
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub result: ApplicationResult<PathBuf>,
}

/// Service converting between indented CSV and nested JSON.
pub struct ConversionService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
    date_stamp: String,
}

/// Today's date in `format`; an invalid format falls back to `%Y-%m-%d`.
fn today(format: &str) -> String {
    let now = chrono::Local::now();
    let mut stamp = String::new();
    if write!(stamp, "{}", now.format(format)).is_err() {
        warn!("invalid date_format '{}', using %Y-%m-%d", format);
        stamp = now.format("%Y-%m-%d").to_string();
    }
    stamp
}

impl ConversionService {
    /// Create a new conversion service, stamping outputs with today's date.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        let date_stamp = today(&settings.date_format);
        Self {
            fs,
            settings,
            date_stamp,
        }
    }

    /// Override the date used in output names.
    pub fn with_date_stamp(mut self, date_stamp: impl Into<String>) -> Self {
        self.date_stamp = date_stamp.into();
        self
    }

    pub fn date_stamp(&self) -> &str {
        &self.date_stamp
    }

    fn codec(&self) -> TreeCodec {
        self.settings.codec()
    }

    fn csv_rows(&self) -> CsvRows {
        self.settings.csv_rows()
    }

    /// Split CSV text into rows, dropping a leading header row.
    pub fn read_rows(&self, csv_text: &str) -> ApplicationResult<Vec<Row>> {
        let rows = self.csv_rows().read(csv_text).with_format_context("CSV input")?;
        Ok(HeaderFilter::new(&self.settings.header, self.settings.layout).strip(rows))
    }

    /// Decode CSV text into the entity tree.
    pub fn decode_csv(&self, csv_text: &str) -> ApplicationResult<Vec<Entity>> {
        let rows = self.read_rows(csv_text)?;
        debug!("decode: {} rows", rows.len());
        Ok(self.codec().decode(&rows)?)
    }

    /// Parse a JSON document into the entity tree; the top level must be an array.
    pub fn decode_json(&self, json_text: &str) -> ApplicationResult<Vec<Entity>> {
        let value: serde_json::Value =
            serde_json::from_str(json_text).with_format_context("JSON input")?;
        Ok(entities_from_value(value)?)
    }

    pub fn csv_to_json(&self, csv_text: &str) -> ApplicationResult<String> {
        let entities = self.decode_csv(csv_text)?;
        self.to_json(&entities)
    }

    pub fn json_to_csv(&self, json_text: &str) -> ApplicationResult<String> {
        let entities = self.decode_json(json_text)?;
        let rows = self.codec().encode(&entities)?;
        self.csv_rows().write(&rows).with_format_context("CSV output")
    }

    /// Project a wide multi-language sheet; the header row is required.
    pub fn csv_to_lang_json(&self, csv_text: &str) -> ApplicationResult<String> {
        let projection = self.project_lang(csv_text)?;
        self.to_json(&projection)
    }

    pub fn project_lang(&self, csv_text: &str) -> ApplicationResult<LangProjection> {
        let rows = self.csv_rows().read(csv_text).with_format_context("CSV input")?;
        Ok(lang::project(&rows, &self.settings.lang.header_names())?)
    }

    /// Indented CSV to unindented CSV with composite branch codes.
    pub fn csv_to_flat_csv(&self, csv_text: &str) -> ApplicationResult<String> {
        let entities = self.decode_csv(csv_text)?;
        let rows = self.codec().flatten(&entities)?;
        self.csv_rows().write(&rows).with_format_context("CSV output")
    }

    /// Serialize with the configured pretty-printing.
    pub fn to_json<T: Serialize>(&self, value: &T) -> ApplicationResult<String> {
        if !self.settings.pretty {
            return serde_json::to_string(value).with_format_context("JSON output");
        }
        let indent = " ".repeat(self.settings.indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value
            .serialize(&mut ser)
            .with_format_context("JSON output")?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Convert one file by extension and write the result.
    ///
    /// Nothing is written unless the whole conversion succeeds.
    #[instrument(skip(self))]
    pub fn convert_file(&self, input: &Path, out_dir: Option<&Path>) -> ApplicationResult<PathBuf> {
        let kind = InputKind::detect(input)?;
        let out_dir = out_dir.or(self.settings.out_dir.as_deref());
        let output = output_path(input, &self.date_stamp, out_dir)?;

        let text = self
            .fs
            .read_to_string(input)
            .with_path_context("read input", input)?;
        let converted = match kind {
            InputKind::Csv => self.csv_to_json(&text)?,
            InputKind::Json => self.json_to_csv(&text)?,
        };

        self.write_output(&output, &converted)?;
        info!("{} -> {}", input.display(), output.display());
        Ok(output)
    }

    /// Convert files strictly one after another; a failure does not stop the batch.
    pub fn convert_all(&self, inputs: &[PathBuf], out_dir: Option<&Path>) -> Vec<FileOutcome> {
        inputs
            .iter()
            .map(|input| FileOutcome {
                input: input.clone(),
                result: self.convert_file(input, out_dir),
            })
            .collect()
    }

    /// Convert already-fetched CSV text and write `[<date>] <output_name>.json`.
    #[instrument(skip(self, csv_text))]
    pub fn convert_fetched(
        &self,
        csv_text: &str,
        projection: Projection,
        out_dir: Option<&Path>,
    ) -> ApplicationResult<PathBuf> {
        let (converted, ext) = match projection {
            Projection::Tree => (self.csv_to_json(csv_text)?, "json"),
            Projection::Lang => (self.csv_to_lang_json(csv_text)?, "json"),
            Projection::Flat => (self.csv_to_flat_csv(csv_text)?, "csv"),
        };

        let name = dated_name(&self.date_stamp, &self.settings.remote.output_name, ext);
        let dir = out_dir
            .or(self.settings.out_dir.as_deref())
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let output = dir.join(name);

        self.write_output(&output, &converted)?;
        info!("fetched sheet -> {}", output.display());
        Ok(output)
    }

    fn write_output(&self, output: &Path, content: &str) -> ApplicationResult<()> {
        if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !self.fs.is_dir(dir) {
                self.fs
                    .create_dir_all(dir)
                    .with_path_context("create output directory", dir)?;
            }
        }
        self.fs
            .write(output, content)
            .with_path_context("write output", output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;

    #[test]
    fn given_invalid_date_format_when_new_then_falls_back_to_iso_date() {
        let settings = Settings {
            date_format: "%Q".into(),
            ..Settings::default()
        };
        let service = ConversionService::new(Arc::new(RealFileSystem), Arc::new(settings));
        let stamp = service.date_stamp();
        assert_eq!(stamp.len(), "2024-05-01".len());
        assert_eq!(stamp.matches('-').count(), 2);
    }

    #[test]
    fn given_first_row_label_equal_to_title_literal_when_decode_then_row_kept() {
        let service =
            ConversionService::new(Arc::new(RealFileSystem), Arc::new(Settings::default()));
        let tree = service
            .decode_csv("Riga,10,Title,\nTartu,20,Tartu Club,\n")
            .unwrap();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0], Entity::new("Riga", "10", "Title"));
    }
}
