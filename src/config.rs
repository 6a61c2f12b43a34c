//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/clubcodes/clubcodes.toml`
//! 3. Local config: `./.clubcodes.toml`, or the file given with `--config`
//! 4. Environment variables: `CLUBCODES_*` prefix

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{ClassifierRule, LangHeaderNames, Layout, TreeCodec};
use crate::infrastructure::{CsvRows, LineEnding};

/// Literal header names identifying a leading header row (case-sensitive).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HeaderConfig {
    pub location: Vec<String>,
    pub code: Vec<String>,
    pub title: Vec<String>,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            location: vec!["location".into(), "Location".into()],
            code: vec!["code".into(), "Code".into()],
            title: vec!["title".into(), "Title".into()],
        }
    }
}

/// Raw header config for intermediate parsing (arrays are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawHeaderConfig {
    pub location: Option<Vec<String>>,
    pub code: Option<Vec<String>>,
    pub title: Option<Vec<String>>,
}

impl HeaderConfig {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for name in overlay {
            if let Some(negated) = name.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(name.clone());
            }
        }

        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Merge overlay config onto self (base), union per array.
    pub fn merge(&self, overlay: &RawHeaderConfig) -> Self {
        let merge = |base: &[String], o: &Option<Vec<String>>| {
            o.as_ref()
                .map(|o| Self::merge_array(base, o))
                .unwrap_or_else(|| base.to_vec())
        };
        Self {
            location: merge(&self.location, &overlay.location),
            code: merge(&self.code, &overlay.code),
            title: merge(&self.title, &overlay.title),
        }
    }

    /// Apply global config onto defaults: specified arrays REPLACE the defaults.
    pub fn apply_global(&self, global: &RawHeaderConfig) -> Self {
        Self {
            location: global.location.clone().unwrap_or_else(|| self.location.clone()),
            code: global.code.clone().unwrap_or_else(|| self.code.clone()),
            title: global.title.clone().unwrap_or_else(|| self.title.clone()),
        }
    }

    /// All header literals, for header row detection.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.location
            .iter()
            .chain(&self.code)
            .chain(&self.title)
            .map(String::as_str)
    }
}

/// Wide multi-language header settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LangConfig {
    /// Separates language and field, e.g. `en-title`
    pub delimiter: String,
    pub location: String,
    pub title: String,
    pub code: String,
}

impl Default for LangConfig {
    fn default() -> Self {
        let names = LangHeaderNames::default();
        Self {
            delimiter: names.delimiter,
            location: names.location,
            title: names.title,
            code: names.code,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawLangConfig {
    pub delimiter: Option<String>,
    pub location: Option<String>,
    pub title: Option<String>,
    pub code: Option<String>,
}

impl LangConfig {
    fn merge(&self, overlay: &RawLangConfig) -> Self {
        Self {
            delimiter: overlay.delimiter.clone().unwrap_or_else(|| self.delimiter.clone()),
            location: overlay.location.clone().unwrap_or_else(|| self.location.clone()),
            title: overlay.title.clone().unwrap_or_else(|| self.title.clone()),
            code: overlay.code.clone().unwrap_or_else(|| self.code.clone()),
        }
    }

    pub fn header_names(&self) -> LangHeaderNames {
        LangHeaderNames {
            delimiter: self.delimiter.clone(),
            location: self.location.clone(),
            title: self.title.clone(),
            code: self.code.clone(),
        }
    }
}

/// Published spreadsheet source.
///
/// `base_url` may contain `{key}`, `{format}`, `{sheet}`, `{range}` and `{headers}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub key: String,
    pub format: String,
    pub sheet: String,
    pub range: String,
    pub headers: String,
    /// Output file stem for fetched sheets
    pub output_name: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://docs.google.com/spreadsheets/d/{key}/gviz/tq?tqx=out:{format}&sheet={sheet}&range={range}&headers={headers}".into(),
            key: String::new(),
            format: "csv".into(),
            sheet: "Sheet1".into(),
            range: "A:D".into(),
            headers: "0".into(),
            output_name: "fan-partner-codes".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawRemoteConfig {
    pub base_url: Option<String>,
    pub key: Option<String>,
    pub format: Option<String>,
    pub sheet: Option<String>,
    pub range: Option<String>,
    pub headers: Option<String>,
    pub output_name: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl RemoteConfig {
    fn merge(&self, overlay: &RawRemoteConfig) -> Self {
        let pick = |o: &Option<String>, base: &String| o.clone().unwrap_or_else(|| base.clone());
        Self {
            base_url: pick(&overlay.base_url, &self.base_url),
            key: pick(&overlay.key, &self.key),
            format: pick(&overlay.format, &self.format),
            sheet: pick(&overlay.sheet, &self.sheet),
            range: pick(&overlay.range, &self.range),
            headers: pick(&overlay.headers, &self.headers),
            output_name: pick(&overlay.output_name, &self.output_name),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub layout: Option<Layout>,
    pub classifier: Option<ClassifierRule>,
    pub trailing_delimiter: Option<bool>,
    pub delimiter: Option<char>,
    pub line_ending: Option<LineEnding>,
    pub pretty: Option<bool>,
    pub indent: Option<usize>,
    pub date_format: Option<String>,
    pub out_dir: Option<PathBuf>,
    pub header: RawHeaderConfig,
    pub lang: RawLangConfig,
    pub remote: RawRemoteConfig,
}

/// Unified configuration for clubcodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Column layout of the CSV side
    pub layout: Layout,
    /// Rule deciding top-level vs branch rows
    pub classifier: ClassifierRule,
    /// Write `loc,code,label,` for top-level rows
    pub trailing_delimiter: bool,
    /// CSV field separator (single ASCII character)
    pub delimiter: char,
    pub line_ending: LineEnding,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// JSON indentation width when pretty
    pub indent: usize,
    /// chrono format for date-stamped output names
    pub date_format: String,
    /// Output directory (default: next to the input)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    pub header: HeaderConfig,
    pub lang: LangConfig,
    pub remote: RemoteConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            classifier: ClassifierRule::default(),
            trailing_delimiter: true,
            delimiter: ',',
            line_ending: LineEnding::default(),
            pretty: true,
            indent: 2,
            date_format: "%Y-%m-%d".into(),
            out_dir: None,
            header: HeaderConfig::default(),
            lang: LangConfig::default(),
            remote: RemoteConfig::default(),
        }
    }
}

/// Get the XDG config directory for clubcodes.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "clubcodes").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("clubcodes.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".clubcodes.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Codec configured with layout, classifier rule and trailing delimiter.
    pub fn codec(&self) -> TreeCodec {
        TreeCodec::new(self.layout, self.classifier).with_trailing_delimiter(self.trailing_delimiter)
    }

    /// Row splitter/joiner configured with delimiter and line ending.
    ///
    /// `load` rejects non-ASCII delimiters, anything else falls back to `,`.
    pub fn csv_rows(&self) -> CsvRows {
        let delimiter = u8::try_from(self.delimiter).unwrap_or(b',');
        CsvRows::new()
            .with_delimiter(delimiter)
            .with_line_ending(self.line_ending)
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(dir) = &self.out_dir {
            let raw = dir.to_string_lossy().to_string();
            let expanded = shellexpand::full(&raw)
                .map(|s| s.into_owned())
                .unwrap_or(raw);
            self.out_dir = Some(PathBuf::from(expanded));
        }
    }

    /// Merge overlay config onto self (base).
    ///
    /// - Scalar options: overlay wins if Some, otherwise keep base
    /// - Header arrays: union merge with negation support
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        let mut merged = self.apply_scalars(overlay);
        merged.header = self.header.merge(&overlay.header);
        merged
    }

    /// Apply global config onto defaults with REPLACE semantics for arrays.
    fn apply_global(&self, global: &RawSettings) -> Self {
        let mut merged = self.apply_scalars(global);
        merged.header = self.header.apply_global(&global.header);
        merged
    }

    fn apply_scalars(&self, overlay: &RawSettings) -> Self {
        Self {
            layout: overlay.layout.unwrap_or(self.layout),
            classifier: overlay.classifier.unwrap_or(self.classifier),
            trailing_delimiter: overlay.trailing_delimiter.unwrap_or(self.trailing_delimiter),
            delimiter: overlay.delimiter.unwrap_or(self.delimiter),
            line_ending: overlay.line_ending.unwrap_or(self.line_ending),
            pretty: overlay.pretty.unwrap_or(self.pretty),
            indent: overlay.indent.unwrap_or(self.indent),
            date_format: overlay
                .date_format
                .clone()
                .unwrap_or_else(|| self.date_format.clone()),
            out_dir: overlay.out_dir.clone().or_else(|| self.out_dir.clone()),
            header: self.header.clone(),
            lang: self.lang.merge(&overlay.lang),
            remote: self.remote.merge(&overlay.remote),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Explicit local config file; must exist when given.
    ///   Without it, `./.clubcodes.toml` is used if present.
    ///
    /// # Array Merge Semantics
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with `!name` negation
    /// - Any → Env vars: REPLACE
    pub fn load(local: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        let local_path = match local {
            Some(path) if !path.exists() => {
                return Err(ApplicationError::Config {
                    message: format!("config file not found: {}", path.display()),
                })
            }
            Some(path) => Some(path.to_path_buf()),
            None => Some(local_config_path(Path::new("."))).filter(|p| p.exists()),
        };
        if let Some(path) = local_path {
            let raw = load_raw_settings(&path)?;
            current = current.merge_with(&raw);
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Reject values that would only fail later, mid-conversion.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        if !self.delimiter.is_ascii() {
            return Err(ApplicationError::Config {
                message: format!("delimiter must be an ASCII character, got '{}'", self.delimiter),
            });
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(ApplicationError::Config {
                message: format!("invalid date_format '{}'", self.date_format),
            });
        }
        Ok(())
    }

    /// Apply CLUBCODES_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("CLUBCODES")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("layout") {
            settings.layout = val.parse().map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("classifier") {
            settings.classifier = val.parse().map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_string("line_ending") {
            settings.line_ending = val.parse().map_err(|message| ApplicationError::Config { message })?;
        }
        if let Ok(val) = config.get_bool("trailing_delimiter") {
            settings.trailing_delimiter = val;
        }
        if let Ok(val) = config.get_string("delimiter") {
            let mut chars = val.chars();
            settings.delimiter = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => {
                    return Err(ApplicationError::Config {
                        message: format!("delimiter must be one character, got '{}'", val),
                    })
                }
            };
        }
        if let Ok(val) = config.get_bool("pretty") {
            settings.pretty = val;
        }
        if let Ok(val) = config.get_int("indent") {
            settings.indent = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("indent must be non-negative, got {}", val),
            })?;
        }
        if let Ok(val) = config.get_string("date_format") {
            settings.date_format = val;
        }
        if let Ok(val) = config.get_string("out_dir") {
            settings.out_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("remote.base_url") {
            settings.remote.base_url = val;
        }
        if let Ok(val) = config.get_string("remote.key") {
            settings.remote.key = val;
        }
        if let Ok(val) = config.get_string("remote.sheet") {
            settings.remote.sheet = val;
        }
        if let Ok(val) = config.get_string("remote.range") {
            settings.remote.range = val;
        }

        Ok(settings)
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# clubcodes configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/clubcodes/clubcodes.toml
#   Local:  ./.clubcodes.toml (or --config FILE)
#   Env:    CLUBCODES_* environment variables (CLUBCODES_REMOTE__KEY for [remote] key)
#
# Header arrays in a local config UNION with the global ones.
# Use "!name" to REMOVE an inherited name: code = ["Kods", "!Code"]

# Column layout: v1 [location, code, label]
#                v2 like v1, branch codes written as parent_sub
#                v3 [location, label, code]
# layout = "v1"

# Row classification: "blank-first-cell" or "blank-first-cell-or-empty-code"
# classifier = "blank-first-cell-or-empty-code"

# Write a trailing comma after top-level rows
# trailing_delimiter = true

# CSV field separator
# delimiter = ","

# Line ending for CSV output: "lf", "crlf" or "native"
# line_ending = "native"

# JSON output formatting
# pretty = true
# indent = 2

# Date stamp in output names, e.g. "[2024-05-01] codes.json"
# date_format = "%Y-%m-%d"

# Write outputs here instead of next to the input
# out_dir = "~/codes"

[header]
# Literal names marking a leading header row (case-sensitive)
# location = ["location", "Location"]
# code = ["code", "Code"]
# title = ["title", "Title"]

[lang]
# Wide headers look like "en-title", "fr-location" plus one "code" column
# delimiter = "-"

[remote]
# base_url = "https://docs.google.com/spreadsheets/d/{key}/gviz/tq?tqx=out:{format}&sheet={sheet}&range={range}&headers={headers}"
# key = "..."
# format = "csv"
# sheet = "Sheet1"
# range = "A:D"
# headers = "0"
# output_name = "fan-partner-codes"
# timeout_secs = 30
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
