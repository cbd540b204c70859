// ── Page extraction ──
//
// Parsers for the two text formats the portal embeds in its pages:
// preformatted VLAN summary blocks and `valign="center"` table rows.
// Neither parser fails outright. Problems degrade a field to its empty
// default (or skip a row) and are reported as `ParseIssue`s alongside the
// records.

pub mod rows;
pub mod vlan;

use thiserror::Error;
use tracing::warn;

pub use rows::{RowSchema, extract_active_macs, extract_nams, extract_rows};
pub use vlan::extract_vlans;

/// A recoverable problem found while extracting records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIssue {
    #[error("block {block}: no line ending in {header:?}")]
    MissingHeader { block: usize, header: &'static str },

    #[error("block {block}: subnet line has {found} fields, expected 4")]
    SubnetTokens { block: usize, found: usize },

    #[error("block {block}: {value:?} is not an IPv4 address")]
    InvalidAddress { block: usize, value: String },

    #[error("block {block}: {value:?} is not a contiguous netmask or prefix length")]
    InvalidMask { block: usize, value: String },

    #[error("block {block}: name/tag line has {found} fields")]
    TagTokens { block: usize, found: usize },

    #[error("{schema} row {row}: {cells} cells, expected at least {expected}")]
    ShortRow {
        schema: &'static str,
        row: usize,
        cells: usize,
        expected: usize,
    },
}

/// Records extracted from one page plus every issue met on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction<T> {
    pub records: Vec<T>,
    pub issues: Vec<ParseIssue>,
}

impl<T> Default for Extraction<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            issues: Vec::new(),
        }
    }
}

impl<T> Extraction<T> {
    /// `true` when every field of every record parsed cleanly.
    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    pub(crate) fn push(&mut self, record: T) {
        self.records.push(record);
    }

    pub(crate) fn report(&mut self, issue: ParseIssue) {
        warn!(%issue, "degraded parse");
        self.issues.push(issue);
    }
}
