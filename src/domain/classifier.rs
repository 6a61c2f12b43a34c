//! Row classification: top-level entity or branch of the preceding one.

use crate::domain::entities::{ClassifierRule, RowLevel, FIELD_COUNT};
use crate::domain::error::{DomainError, DomainResult};

/// Cell inspected by rule B; in a full branch row it holds the last entity column.
const CODE_PROBE_INDEX: usize = FIELD_COUNT;

/// Tags each row with its level. Pure: the result depends on the row alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowClassifier {
    rule: ClassifierRule,
}

impl RowClassifier {
    pub fn new(rule: ClassifierRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> ClassifierRule {
        self.rule
    }

    /// Decide whether `row` (at position `index`) is a top-level row.
    ///
    /// Rule B only looks at cell 3 when cell 0 is blank; a blank-first row
    /// shorter than four cells is malformed under rule B.
    pub fn is_top_level(&self, index: usize, row: &[String]) -> DomainResult<bool> {
        if !is_blank(row.first()) {
            return Ok(true);
        }
        match self.rule {
            ClassifierRule::BlankFirstCell => Ok(false),
            ClassifierRule::BlankFirstCellOrEmptyCode => {
                if row.len() <= CODE_PROBE_INDEX {
                    return Err(DomainError::MalformedRow {
                        row: index,
                        cells: row.len(),
                        expected: CODE_PROBE_INDEX + 1,
                    });
                }
                Ok(is_blank(row.get(CODE_PROBE_INDEX)))
            }
        }
    }

    pub fn classify(&self, index: usize, row: &[String]) -> DomainResult<RowLevel> {
        if self.is_top_level(index, row)? {
            Ok(RowLevel::TopLevel)
        } else {
            Ok(RowLevel::Branch)
        }
    }
}

/// Missing cells count as blank.
pub(crate) fn is_blank(cell: Option<&String>) -> bool {
    cell.map_or(true, |c| c.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[rstest]
    #[case(ClassifierRule::BlankFirstCell)]
    #[case(ClassifierRule::BlankFirstCellOrEmptyCode)]
    fn given_non_blank_first_cell_when_classify_then_top_level(#[case] rule: ClassifierRule) {
        let classifier = RowClassifier::new(rule);
        assert_eq!(
            classifier.classify(0, &row(&["Region A", "1", "Label A"])).unwrap(),
            RowLevel::TopLevel
        );
    }

    #[rstest]
    #[case(ClassifierRule::BlankFirstCell)]
    #[case(ClassifierRule::BlankFirstCellOrEmptyCode)]
    fn given_full_branch_row_when_classify_then_branch(#[case] rule: ClassifierRule) {
        let classifier = RowClassifier::new(rule);
        assert_eq!(
            classifier
                .classify(1, &row(&["", "Region A", "1_1", "Sub A"]))
                .unwrap(),
            RowLevel::Branch
        );
    }

    #[test]
    fn given_blank_first_and_blank_code_cell_when_rule_a_then_branch() {
        let r = row(&["", "Region A", "1", ""]);
        let classifier = RowClassifier::new(ClassifierRule::BlankFirstCell);
        assert_eq!(classifier.classify(0, &r).unwrap(), RowLevel::Branch);
    }

    #[test]
    fn given_blank_first_and_blank_code_cell_when_rule_b_then_top_level() {
        let r = row(&["", "Region A", "1", ""]);
        let classifier = RowClassifier::new(ClassifierRule::BlankFirstCellOrEmptyCode);
        assert_eq!(classifier.classify(0, &r).unwrap(), RowLevel::TopLevel);
    }

    #[test]
    fn given_short_blank_first_row_when_rule_b_then_malformed() {
        let classifier = RowClassifier::new(ClassifierRule::BlankFirstCellOrEmptyCode);
        let err = classifier.classify(7, &row(&["", "1_1", "Sub"])).unwrap_err();
        assert_eq!(
            err,
            DomainError::MalformedRow {
                row: 7,
                cells: 3,
                expected: 4
            }
        );
    }

    #[test]
    fn given_short_top_level_row_when_rule_b_then_no_probe_needed() {
        let classifier = RowClassifier::new(ClassifierRule::BlankFirstCellOrEmptyCode);
        assert!(classifier.is_top_level(0, &row(&["R", "1", "L"])).unwrap());
    }

    #[test]
    fn given_same_row_when_classified_repeatedly_then_same_result() {
        let classifier = RowClassifier::default();
        let r = row(&["", "Region", "2_1", "Sub"]);
        let first = classifier.classify(3, &r).unwrap();
        let _ = classifier.classify(0, &row(&["X", "9", "Y"])).unwrap();
        assert_eq!(classifier.classify(3, &r).unwrap(), first);
    }
}
