//! Client-side table filtering

pub const NO_RESULTS_ROW: &str =
    r#"<tr class="no-results-row"><td colspan="100" class="text-center">No results found</td></tr>"#;

/// Rows of one table body, matched by their text content
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableFilter {
    rows: Vec<String>,
    visible: Vec<bool>,
}

impl TableFilter {
    pub fn new<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows: Vec<String> = rows.into_iter().map(Into::into).collect();
        let visible = vec![true; rows.len()];
        Self { rows, visible }
    }

    /// Show rows whose text contains the query, ignoring case
    pub fn apply(&mut self, query: &str) -> usize {
        let needle = query.to_lowercase();
        for (row, visible) in self.rows.iter().zip(self.visible.iter_mut()) {
            *visible = row.to_lowercase().contains(&needle);
        }
        self.visible_count()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.iter().filter(|v| **v).count()
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    pub fn visible_rows(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .zip(&self.visible)
            .filter(|(_, v)| **v)
            .map(|(row, _)| row.as_str())
    }

    /// The "No results found" row is shown exactly when nothing matches
    pub fn shows_no_results(&self) -> bool {
        self.visible_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter() {
        let mut table = TableFilter::new(["Lagos Edge 01", "Nairobi Core", "lagos backup"]);
        assert_eq!(table.apply("LAGOS"), 2);
        assert!(!table.is_visible(1));
        assert_eq!(table.visible_rows().collect::<Vec<_>>(), vec!["Lagos Edge 01", "lagos backup"]);

        assert_eq!(table.apply("accra"), 0);
        assert!(table.shows_no_results());

        assert_eq!(table.apply(""), 3);
        assert!(!table.shows_no_results());
    }

    #[test]
    fn test_empty_table_shows_no_results() {
        let mut table = TableFilter::new(Vec::<String>::new());
        assert_eq!(table.apply("x"), 0);
        assert!(table.shows_no_results());
    }
}
