use std::collections::HashSet;

/// Zero-based column holding the dedup key in each sheet row.
pub const DEDUP_COLUMN: usize = 6;

/// Keys already recorded in the sheet, plus any accepted during the run.
#[derive(Debug, Clone, Default)]
pub struct DedupIndex {
    keys: HashSet<String>,
}

impl DedupIndex {
    /// Collects the non-empty key column of every row after the header.
    pub fn build(rows: &[Vec<String>]) -> Self {
        let keys = rows
            .iter()
            .skip(1)
            .filter_map(|row| row.get(DEDUP_COLUMN))
            .filter(|key| !key.is_empty())
            .cloned()
            .collect();
        Self { keys }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Returns `false` if the key was already present.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        self.keys.insert(key.into())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn empty_sheet_gives_empty_index() {
        assert!(DedupIndex::build(&[]).is_empty());
    }

    #[test]
    fn header_row_is_skipped() {
        let rows = vec![row(&["Date", "Company", "Role", "From", "Subject", "Link", "Message-ID"])];
        let index = DedupIndex::build(&rows);
        assert!(index.is_empty());
        assert!(!index.contains("Message-ID"));
    }

    #[test]
    fn collects_non_empty_seventh_column() {
        let rows = vec![
            row(&["Date", "Company", "Role", "From", "Subject", "Link", "Message-ID"]),
            row(&["d", "c", "r", "f", "s", "l", "<one@x>"]),
            row(&["d", "c", "r", "f", "s", "l", ""]),
            row(&["d", "c", "r"]),
            row(&["d", "c", "r", "f", "s", "l", "<two@x>", "extra"]),
            row(&["d", "c", "r", "f", "s", "l", "<one@x>"]),
        ];
        let index = DedupIndex::build(&rows);
        assert_eq!(index.len(), 2);
        assert!(index.contains("<one@x>"));
        assert!(index.contains("<two@x>"));
        assert!(!index.contains(""));
    }

    #[test]
    fn insert_reports_new_keys() {
        let mut index = DedupIndex::default();
        assert!(index.insert("<k@x>"));
        assert!(!index.insert("<k@x>"));
        assert!(index.contains("<k@x>"));
    }
}
