//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::{DomainError, DomainResult};

/// Number of entity columns in a row (location, code, label).
pub const FIELD_COUNT: usize = 3;

/// Joins a parent's code and a branch's sub-code into a composite code.
pub const CODE_NESTING_DELIMITER: char = '_';

/// One CSV line as an ordered sequence of cells.
pub type Row = Vec<String>;

/// One node of the two-level club tree.
///
/// Top-level entities may carry `branches`; branches never do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<Entity>,
}

impl Entity {
    pub fn new(
        location: impl Into<String>,
        code: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            code: code.into(),
            label: label.into(),
            branches: Vec::new(),
        }
    }

    pub fn with_branches(mut self, branches: Vec<Entity>) -> Self {
        self.branches = branches;
        self
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Location => &self.location,
            Field::Code => &self.code,
            Field::Label => &self.label,
        }
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Location => self.location = value,
            Field::Code => self.code = value,
            Field::Label => self.label = value,
        }
    }

    /// First field that is empty after trimming, in location/code/label order.
    pub fn blank_field(&self) -> Option<Field> {
        Field::ALL
            .into_iter()
            .find(|f| self.field(*f).trim().is_empty())
    }

    /// Enforce the non-empty invariant on location, code and label.
    pub fn validate(&self) -> DomainResult<()> {
        match self.blank_field() {
            Some(field) => Err(DomainError::EmptyField {
                field,
                entity: Box::new(self.clone()),
            }),
            None => Ok(()),
        }
    }

    /// Pretty JSON rendering used for error diagnostics.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}

/// Parse a JSON document value into top-level entities.
///
/// The value must be an array of entity objects.
pub fn entities_from_value(value: Value) -> DomainResult<Vec<Entity>> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(DomainError::InvalidShape {
                expected: "array of entities",
                found: json_kind(&other).to_string(),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let kind = json_kind(&item);
            serde_json::from_value::<Entity>(item).map_err(|e| DomainError::InvalidShape {
                expected: "entity object",
                found: format!("{} at index {}: {}", kind, i, e),
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Entity field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Location,
    Code,
    Label,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Location, Field::Code, Field::Label];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Location => "location",
            Field::Code => "code",
            Field::Label => "label",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural position of a row, decided once by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLevel {
    TopLevel,
    Branch,
}

/// Column order and code convention for mapping entities to cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `[location, code, label]`, branch codes stored bare.
    #[default]
    V1,
    /// `[location, code, label]`, branch codes written as `parent_sub`, read back bare.
    V2,
    /// `[location, label, code]`.
    V3,
}

impl Layout {
    /// Entity columns of a full row, after any indentation cells.
    pub fn columns(&self) -> [Field; FIELD_COUNT] {
        match self {
            Layout::V1 | Layout::V2 => [Field::Location, Field::Code, Field::Label],
            Layout::V3 => [Field::Location, Field::Label, Field::Code],
        }
    }

    /// Columns of a short branch row, which carries no location.
    pub fn short_branch_columns(&self) -> [Field; 2] {
        match self {
            Layout::V1 | Layout::V2 => [Field::Code, Field::Label],
            Layout::V3 => [Field::Label, Field::Code],
        }
    }

    /// Whether branch codes are written as `parent_code + "_" + code`.
    pub fn writes_composite_codes(&self) -> bool {
        matches!(self, Layout::V2)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::V1 => "v1",
            Layout::V2 => "v2",
            Layout::V3 => "v3",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" => Ok(Layout::V1),
            "v2" => Ok(Layout::V2),
            "v3" => Ok(Layout::V3),
            other => Err(format!("unknown layout '{}' (expected v1, v2 or v3)", other)),
        }
    }
}

/// Rule deciding whether a row is top-level or a branch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierRule {
    /// Rule A: top-level iff cell 0 is non-blank.
    BlankFirstCell,
    /// Rule B: top-level iff cell 0 is non-blank or cell 3 is blank.
    #[default]
    BlankFirstCellOrEmptyCode,
}

impl ClassifierRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassifierRule::BlankFirstCell => "blank-first-cell",
            ClassifierRule::BlankFirstCellOrEmptyCode => "blank-first-cell-or-empty-code",
        }
    }
}

impl fmt::Display for ClassifierRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "blank-first-cell" => Ok(ClassifierRule::BlankFirstCell),
            "b" | "blank-first-cell-or-empty-code" => Ok(ClassifierRule::BlankFirstCellOrEmptyCode),
            other => Err(format!(
                "unknown classifier rule '{}' (expected a, b, blank-first-cell or blank-first-cell-or-empty-code)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_whitespace_label_when_validate_then_reports_label() {
        let entity = Entity::new("Region", "1", "   ");
        let err = entity.validate().unwrap_err();
        assert!(matches!(
            err,
            DomainError::EmptyField {
                field: Field::Label,
                ..
            }
        ));
    }

    #[test]
    fn given_leaf_entity_when_serialized_then_omits_branches() {
        let entity = Entity::new("Region", "1", "Label");
        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(
            value,
            json!({"location": "Region", "code": "1", "label": "Label"})
        );
    }

    #[test]
    fn given_object_document_when_parsing_entities_then_invalid_shape() {
        let err = entities_from_value(json!({"code": "1"})).unwrap_err();
        assert!(matches!(err, DomainError::InvalidShape { .. }));
        assert!(err.to_string().contains("object"));
    }

    #[test]
    fn given_missing_fields_when_parsing_entities_then_defaults_to_empty() {
        let entities = entities_from_value(json!([{"code": "1"}])).unwrap();
        assert_eq!(entities[0].location, "");
        assert!(entities[0].validate().is_err());
    }

    #[test]
    fn given_layout_names_when_parsing_then_accepts_case_insensitive() {
        assert_eq!("V2".parse::<Layout>().unwrap(), Layout::V2);
        assert!("v4".parse::<Layout>().is_err());
        assert_eq!(
            "a".parse::<ClassifierRule>().unwrap(),
            ClassifierRule::BlankFirstCell
        );
    }
}
