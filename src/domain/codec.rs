//! Tree codec: ordered rows <-> two-level entity tree.

use tracing::trace;

use crate::domain::classifier::{is_blank, RowClassifier};
use crate::domain::entities::{
    ClassifierRule, Entity, Field, Layout, Row, RowLevel, CODE_NESTING_DELIMITER, FIELD_COUNT,
};
use crate::domain::error::{DomainError, DomainResult};

/// Deepest depth an entity may occupy (0 = top level, 1 = branch).
const MAX_DEPTH: usize = 1;

/// Converts between indentation-coded rows and nested entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeCodec {
    layout: Layout,
    classifier: RowClassifier,
    trailing_delimiter: bool,
}

impl Default for TreeCodec {
    fn default() -> Self {
        Self::new(Layout::default(), ClassifierRule::default())
    }
}

impl TreeCodec {
    pub fn new(layout: Layout, rule: ClassifierRule) -> Self {
        Self {
            layout,
            classifier: RowClassifier::new(rule),
            trailing_delimiter: true,
        }
    }

    /// Append an empty cell to top-level rows on encode (`loc,code,label,`).
    pub fn with_trailing_delimiter(mut self, trailing: bool) -> Self {
        self.trailing_delimiter = trailing;
        self
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn classifier(&self) -> RowClassifier {
        self.classifier
    }

    /// Build the entity tree from header-less rows.
    ///
    /// Each branch row is attached to the most recent top-level entity.
    /// The first invalid row aborts decoding.
    pub fn decode(&self, rows: &[Row]) -> DomainResult<Vec<Entity>> {
        let mut entities: Vec<Entity> = Vec::new();

        for (index, row) in rows.iter().enumerate() {
            match self.classifier.classify(index, row)? {
                RowLevel::TopLevel => {
                    let entity = self.read_top_level(index, row)?;
                    entity.validate()?;
                    trace!("row {}: top-level {}", index, entity.code);
                    entities.push(entity);
                }
                RowLevel::Branch => {
                    let parent = entities
                        .last_mut()
                        .ok_or(DomainError::OrphanBranch { row: index })?;
                    let branch = self.read_branch(index, row, &parent.location)?;
                    branch.validate()?;
                    trace!("row {}: branch {} of {}", index, branch.code, parent.code);
                    parent.branches.push(branch);
                }
            }
        }

        Ok(entities)
    }

    /// Flatten the tree into rows, depth-first, pre-order.
    ///
    /// Branch rows get one leading blank cell. Every entity is validated.
    pub fn encode(&self, entities: &[Entity]) -> DomainResult<Vec<Row>> {
        let mut rows = Vec::new();
        self.encode_level(entities, None, 0, &mut rows)?;
        Ok(rows)
    }

    /// Unindented rows where branch codes are always composite (`parent_sub`).
    pub fn flatten(&self, entities: &[Entity]) -> DomainResult<Vec<Row>> {
        let mut rows = Vec::new();
        for entity in entities {
            entity.validate()?;
            rows.push(self.entity_cells(entity, entity.code.clone()));
            for branch in &entity.branches {
                if !branch.branches.is_empty() {
                    return Err(DomainError::NestedBranch { row: rows.len() });
                }
                branch.validate()?;
                rows.push(self.entity_cells(branch, composite_code(&entity.code, &branch.code)));
            }
        }
        Ok(rows)
    }

    fn encode_level(
        &self,
        entities: &[Entity],
        parent: Option<&Entity>,
        depth: usize,
        rows: &mut Vec<Row>,
    ) -> DomainResult<()> {
        for entity in entities {
            if depth > MAX_DEPTH {
                return Err(DomainError::NestedBranch { row: rows.len() });
            }
            entity.validate()?;
            rows.push(self.write_row(entity, parent, depth));
            if !entity.branches.is_empty() {
                self.encode_level(&entity.branches, Some(entity), depth + 1, rows)?;
            }
        }
        Ok(())
    }

    fn write_row(&self, entity: &Entity, parent: Option<&Entity>, depth: usize) -> Row {
        let code = match parent {
            Some(p) if self.layout.writes_composite_codes() => composite_code(&p.code, &entity.code),
            _ => entity.code.clone(),
        };

        let mut row = vec![String::new(); depth];
        row.extend(self.entity_cells(entity, code));
        if depth == 0 && self.trailing_delimiter {
            row.push(String::new());
        }
        row
    }

    fn entity_cells(&self, entity: &Entity, code: String) -> Row {
        let mut cells = Vec::with_capacity(FIELD_COUNT + 1);
        for field in self.layout.columns() {
            match field {
                Field::Code => cells.push(code.clone()),
                other => cells.push(entity.field(other).to_string()),
            }
        }
        cells
    }

    fn read_top_level(&self, index: usize, row: &[String]) -> DomainResult<Entity> {
        require_cells(index, row, FIELD_COUNT)?;
        let mut entity = Entity::default();
        for (i, field) in self.layout.columns().into_iter().enumerate() {
            entity.set_field(field, row[i].as_str());
        }
        Ok(entity)
    }

    /// Full shape `["", <columns>]` when four or more cells are present,
    /// short shape `["", code, label]` (location inherited) for exactly three.
    fn read_branch(&self, index: usize, row: &[String], parent_location: &str) -> DomainResult<Entity> {
        if row.len() > FIELD_COUNT + 1 && is_blank(row.get(1)) && !is_blank(row.get(FIELD_COUNT + 1)) {
            return Err(DomainError::NestedBranch { row: index });
        }

        let mut entity = Entity::default();
        if row.len() > FIELD_COUNT {
            for (i, field) in self.layout.columns().into_iter().enumerate() {
                entity.set_field(field, row[i + 1].as_str());
            }
        } else {
            require_cells(index, row, FIELD_COUNT)?;
            entity.location = parent_location.to_string();
            for (i, field) in self.layout.short_branch_columns().into_iter().enumerate() {
                entity.set_field(field, row[i + 1].as_str());
            }
        }
        Ok(entity)
    }
}

pub fn composite_code(parent: &str, sub: &str) -> String {
    format!("{}{}{}", parent, CODE_NESTING_DELIMITER, sub)
}

fn require_cells(index: usize, row: &[String], expected: usize) -> DomainResult<()> {
    if row.len() < expected {
        return Err(DomainError::MalformedRow {
            row: index,
            cells: row.len(),
            expected,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Row> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    fn sample_tree() -> Vec<Entity> {
        vec![
            Entity::new("Region A", "1", "Label A").with_branches(vec![
                Entity::new("Town A1", "1", "Sub A1"),
                Entity::new("Town A2", "2", "Sub A2"),
            ]),
            Entity::new("Region B", "2", "Label B"),
        ]
    }

    #[test]
    fn given_empty_rows_when_decode_then_empty_tree() {
        assert!(TreeCodec::default().decode(&[]).unwrap().is_empty());
        assert!(TreeCodec::default().encode(&[]).unwrap().is_empty());
    }

    #[test]
    fn given_v1_tree_when_encode_then_indents_branches_and_adds_trailing_cell() {
        let encoded = TreeCodec::default().encode(&sample_tree()).unwrap();
        assert_eq!(
            encoded,
            rows(&[
                &["Region A", "1", "Label A", ""],
                &["", "Town A1", "1", "Sub A1"],
                &["", "Town A2", "2", "Sub A2"],
                &["Region B", "2", "Label B", ""],
            ])
        );
    }

    #[test]
    fn given_trailing_disabled_when_encode_then_top_rows_have_three_cells() {
        let codec = TreeCodec::default().with_trailing_delimiter(false);
        let encoded = codec.encode(&sample_tree()).unwrap();
        assert_eq!(encoded[0], vec!["Region A", "1", "Label A"]);
        assert_eq!(encoded[1].len(), 4);
    }

    #[test]
    fn given_v3_layout_when_encode_then_label_precedes_code() {
        let codec = TreeCodec::new(Layout::V3, ClassifierRule::default());
        let encoded = codec.encode(&sample_tree()).unwrap();
        assert_eq!(encoded[0], vec!["Region A", "Label A", "1", ""]);
        assert_eq!(encoded[1], vec!["", "Town A1", "Sub A1", "1"]);
        assert_eq!(codec.decode(&encoded).unwrap(), sample_tree());
    }

    #[test]
    fn given_branch_with_branches_when_encode_then_nested_branch() {
        let tree = vec![Entity::new("R", "1", "L").with_branches(vec![
            Entity::new("T", "1", "S").with_branches(vec![Entity::new("X", "1", "Y")]),
        ])];
        let err = TreeCodec::default().encode(&tree).unwrap_err();
        assert_eq!(err, DomainError::NestedBranch { row: 2 });
    }

    #[test]
    fn given_branch_with_branches_when_flatten_then_nested_branch_at_its_row() {
        let tree = vec![
            Entity::new("R", "1", "L").with_branches(vec![
                Entity::new("T", "1", "S").with_branches(vec![Entity::new("X", "1", "Y")]),
            ]),
        ];
        let err = TreeCodec::default().flatten(&tree).unwrap_err();
        assert_eq!(err, DomainError::NestedBranch { row: 1 });
    }

    #[test]
    fn given_blank_code_in_branch_when_encode_then_empty_field() {
        let tree = vec![Entity::new("R", "1", "L").with_branches(vec![Entity::new("T", " ", "S")])];
        let err = TreeCodec::default().encode(&tree).unwrap_err();
        assert!(matches!(
            err,
            DomainError::EmptyField {
                field: Field::Code,
                ..
            }
        ));
    }

    #[test]
    fn given_short_branch_row_when_decode_then_inherits_parent_location() {
        let codec = TreeCodec::new(Layout::V1, ClassifierRule::BlankFirstCell);
        let tree = codec
            .decode(&rows(&[&["Region A", "1", "Label A"], &["", "1_1", "Sub A"]]))
            .unwrap();
        assert_eq!(tree[0].branches, vec![Entity::new("Region A", "1_1", "Sub A")]);
    }

    #[test]
    fn given_doubly_indented_row_when_decode_then_nested_branch() {
        let err = TreeCodec::default()
            .decode(&rows(&[
                &["Region A", "1", "Label A", ""],
                &["", "Town", "1", "Sub"],
                &["", "", "Village", "1", "Deep"],
            ]))
            .unwrap_err();
        assert_eq!(err, DomainError::NestedBranch { row: 2 });
    }

    #[test]
    fn given_branch_first_when_decode_then_orphan_branch() {
        let err = TreeCodec::default()
            .decode(&rows(&[&["", "Town", "1", "Sub"], &["Region", "1", "Label", ""]]))
            .unwrap_err();
        assert_eq!(err, DomainError::OrphanBranch { row: 0 });
    }

    #[test]
    fn given_tree_when_flatten_then_branch_codes_are_composite() {
        let flat = TreeCodec::default().flatten(&sample_tree()).unwrap();
        assert_eq!(
            flat,
            rows(&[
                &["Region A", "1", "Label A"],
                &["Town A1", "1_1", "Sub A1"],
                &["Town A2", "1_2", "Sub A2"],
                &["Region B", "2", "Label B"],
            ])
        );
    }
}
