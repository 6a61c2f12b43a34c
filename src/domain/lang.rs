//! Multi-language projection of a wide sheet.
//!
//! The header row names columns as `{lang}-{field}` (`en-title`, `fr-location`)
//! plus one language-neutral `code` column. Rows are nested by splitting the
//! code on `_`, and each language gets its own code-keyed dictionary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::entities::{Entity, Row, CODE_NESTING_DELIMITER};
use crate::domain::error::{DomainError, DomainResult};

/// Language -> top-level code -> entity.
pub type LangProjection = BTreeMap<String, BTreeMap<String, LangEntity>>;

/// Entity of one language, branches keyed by sub-code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LangEntity {
    pub code: String,
    pub label: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub branches: BTreeMap<String, LangEntity>,
}

impl LangEntity {
    fn leaf(code: &str, label: &str, location: &str) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
            location: location.to_string(),
            branches: BTreeMap::new(),
        }
    }
}

/// Literal header field names recognised in a wide header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LangHeaderNames {
    pub delimiter: String,
    pub location: String,
    pub title: String,
    pub code: String,
}

impl Default for LangHeaderNames {
    fn default() -> Self {
        Self {
            delimiter: "-".into(),
            location: "location".into(),
            title: "title".into(),
            code: "code".into(),
        }
    }
}

/// Column indices resolved from the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LangColumns {
    pub code: usize,
    /// Languages in order of first appearance
    pub languages: Vec<String>,
    pub location: BTreeMap<String, usize>,
    pub label: BTreeMap<String, usize>,
}

impl LangColumns {
    /// Parse the header row into per-language column indices.
    pub fn from_header(header: &[String], names: &LangHeaderNames) -> DomainResult<Self> {
        let mut columns = LangColumns::default();
        let mut code = None;

        for (i, cell) in header.iter().enumerate() {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            let (lang, field) = match cell.split_once(names.delimiter.as_str()) {
                Some((lang, field)) => (Some(lang), field),
                None => (None, cell),
            };

            if field == names.code {
                code = Some(i);
            } else if field == names.location || field == names.title {
                let Some(lang) = lang.filter(|l| !l.is_empty()) else {
                    return Err(DomainError::MalformedHeader {
                        reason: format!("column {} '{}' has no language prefix", i, cell),
                    });
                };
                if !columns.languages.iter().any(|l| l == lang) {
                    columns.languages.push(lang.to_string());
                }
                let target = if field == names.location {
                    &mut columns.location
                } else {
                    &mut columns.label
                };
                target.insert(lang.to_string(), i);
            } else {
                warn!("unknown header field '{}' in column {}, ignored", field, i);
            }
        }

        columns.code = code.ok_or_else(|| DomainError::MalformedHeader {
            reason: format!("no '{}' column", names.code),
        })?;
        if columns.languages.is_empty() {
            return Err(DomainError::MalformedHeader {
                reason: "no language columns".into(),
            });
        }
        for lang in &columns.languages {
            if !columns.location.contains_key(lang) || !columns.label.contains_key(lang) {
                return Err(DomainError::MalformedHeader {
                    reason: format!(
                        "language '{}' needs both '{}' and '{}' columns",
                        lang, names.location, names.title
                    ),
                });
            }
        }
        debug!("header languages: {:?}", columns.languages);
        Ok(columns)
    }
}

/// Project a wide sheet (header row first) into per-language dictionaries.
///
/// Data row indices in errors exclude the header row.
pub fn project(rows: &[Row], names: &LangHeaderNames) -> DomainResult<LangProjection> {
    let Some((header, data)) = rows.split_first() else {
        return Err(DomainError::MalformedHeader {
            reason: "input has no header row".into(),
        });
    };
    let columns = LangColumns::from_header(header, names)?;

    let mut result = LangProjection::new();
    for lang in &columns.languages {
        let map = result.entry(lang.clone()).or_default();
        let location_col = columns.location[lang];
        let label_col = columns.label[lang];
        let width = columns.code.max(location_col).max(label_col) + 1;

        for (index, row) in data.iter().enumerate() {
            if row.len() < width {
                return Err(DomainError::MalformedRow {
                    row: index,
                    cells: row.len(),
                    expected: width,
                });
            }
            let code = row[columns.code].trim();
            let label = row[label_col].as_str();
            let location = row[location_col].as_str();
            Entity::new(location, code, label).validate()?;

            let parts: Vec<&str> = code.split(CODE_NESTING_DELIMITER).collect();
            match parts.as_slice() {
                [top] => {
                    map.insert(top.to_string(), LangEntity::leaf(top, label, location));
                }
                [top, sub] => {
                    let parent = map
                        .get_mut(*top)
                        .ok_or(DomainError::OrphanBranch { row: index })?;
                    parent
                        .branches
                        .insert(sub.to_string(), LangEntity::leaf(sub, label, location));
                }
                _ => return Err(DomainError::NestedBranch { row: index }),
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn given_wide_header_when_parsed_then_languages_in_order() {
        let header = row(&["code", "en-location", "en-title", "fr-location", "fr-title", ""]);
        let columns = LangColumns::from_header(&header, &LangHeaderNames::default()).unwrap();
        assert_eq!(columns.code, 0);
        assert_eq!(columns.languages, vec!["en", "fr"]);
        assert_eq!(columns.label["fr"], 4);
    }

    #[test]
    fn given_header_without_code_when_parsed_then_malformed_header() {
        let header = row(&["en-location", "en-title"]);
        let err = LangColumns::from_header(&header, &LangHeaderNames::default()).unwrap_err();
        assert!(matches!(err, DomainError::MalformedHeader { .. }));
    }

    #[test]
    fn given_three_part_code_when_projecting_then_nested_branch() {
        let rows = vec![
            row(&["code", "en-location", "en-title"]),
            row(&["1", "Riga", "Club"]),
            row(&["1_1", "Jurmala", "Branch"]),
            row(&["1_1_1", "Dubulti", "Deep"]),
        ];
        let err = project(&rows, &LangHeaderNames::default()).unwrap_err();
        assert_eq!(err, DomainError::NestedBranch { row: 2 });
    }
}
