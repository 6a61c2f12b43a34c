//! Leading header row detection.

use std::collections::HashSet;

use tracing::debug;

use crate::config::HeaderConfig;
use crate::domain::{Field, Layout, Row};

/// Strips a leading header row recognised by literal field names.
///
/// Matching is positional: each entity column of the layout must hold one
/// of the literals configured for that field.
#[derive(Debug, Clone)]
pub struct HeaderFilter {
    layout: Layout,
    location: HashSet<String>,
    code: HashSet<String>,
    title: HashSet<String>,
}

impl HeaderFilter {
    pub fn new(config: &HeaderConfig, layout: Layout) -> Self {
        let set = |names: &[String]| names.iter().cloned().collect::<HashSet<_>>();
        Self {
            layout,
            location: set(&config.location),
            code: set(&config.code),
            title: set(&config.title),
        }
    }

    fn names(&self, field: Field) -> &HashSet<String> {
        match field {
            Field::Location => &self.location,
            Field::Code => &self.code,
            Field::Label => &self.title,
        }
    }

    /// A row is a header when every entity column carries its field's literal.
    pub fn is_header(&self, row: &[String]) -> bool {
        self.layout
            .columns()
            .into_iter()
            .enumerate()
            .all(|(i, field)| {
                row.get(i)
                    .is_some_and(|cell| self.names(field).contains(cell.trim()))
            })
    }

    /// Drop the first row if it is a header; later rows are never inspected.
    pub fn strip(&self, mut rows: Vec<Row>) -> Vec<Row> {
        if rows.first().is_some_and(|r| self.is_header(r)) {
            debug!("stripping header row: {:?}", rows[0]);
            rows.remove(0);
        }
        rows
    }
}
