//! Preview grid state - sorting and client-side pagination over fetched rows

use super::field::SelectionEntry;
use super::row::{CellValue, Row};
use std::cmp::Ordering;

/// Page sizes offered by the page-size selector
pub const PAGE_SIZES: [usize; 4] = [10, 25, 50, 100];

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: usize,
    pub direction: SortDirection,
}

/// Sort comparator for two cells
///
/// Numeric when both cells are numbers, otherwise case-insensitive
/// lexicographic on the stringified values.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.sort_text().cmp(&b.sort_text()),
    }
}

#[derive(Debug, Clone)]
pub struct PreviewGrid {
    pub sort: Option<SortState>,
    pub page: usize,
    pub page_size: usize,
    /// First visible column (horizontal scroll)
    pub column_offset: usize,
    /// Column under the cursor, used for sorting
    pub focused_column: usize,
}

impl Default for PreviewGrid {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PreviewGrid {
    pub fn new(page_size: usize) -> Self {
        Self {
            sort: None,
            page: 0,
            page_size: page_size.max(1),
            column_offset: 0,
            focused_column: 0,
        }
    }

    /// Sort by `column`; the same column again flips the direction
    pub fn toggle_sort(&mut self, column: usize) {
        self.sort = match self.sort {
            Some(SortState {
                column: current,
                direction: SortDirection::Ascending,
            }) if current == column => Some(SortState {
                column,
                direction: SortDirection::Descending,
            }),
            _ => Some(SortState {
                column,
                direction: SortDirection::Ascending,
            }),
        };
        self.page = 0;
    }

    /// Row indices in display order
    pub fn ordered_indices(&self, rows: &[Row], columns: &[SelectionEntry]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..rows.len()).collect();
        if let Some(sort) = self.sort {
            if let Some(entry) = columns.get(sort.column) {
                indices.sort_by(|&a, &b| {
                    let ord = compare_cells(rows[a].get(&entry.key), rows[b].get(&entry.key));
                    match sort.direction {
                        SortDirection::Ascending => ord,
                        SortDirection::Descending => ord.reverse(),
                    }
                });
            }
        }
        indices
    }

    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// Half-open index range of the current page, clamped to `total`
    pub fn page_range(&self, total: usize) -> (usize, usize) {
        let page = self.page.min(self.page_count(total) - 1);
        let start = (page * self.page_size).min(total);
        let end = (start + self.page_size).min(total);
        (start, end)
    }

    pub fn next_page(&mut self, total: usize) {
        if self.page + 1 < self.page_count(total) {
            self.page += 1;
        }
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Advance to the next entry of `PAGE_SIZES`, wrapping around
    pub fn cycle_page_size(&mut self) {
        let idx = PAGE_SIZES.iter().position(|s| *s == self.page_size);
        self.page_size = match idx {
            Some(i) => PAGE_SIZES[(i + 1) % PAGE_SIZES.len()],
            None => PAGE_SIZES[0],
        };
        self.page = 0;
    }

    /// "Showing X–Y of Z" footer text
    pub fn footer(&self, total: usize) -> String {
        let (start, end) = self.page_range(total);
        if total == 0 {
            return "Showing 0 of 0".to_string();
        }
        format!("Showing {}–{} of {}", start + 1, end, total)
    }

    pub fn focus_next_column(&mut self, column_count: usize) {
        if self.focused_column + 1 < column_count {
            self.focused_column += 1;
        }
    }

    pub fn focus_prev_column(&mut self) {
        self.focused_column = self.focused_column.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[CellValue]) -> Vec<Row> {
        values
            .iter()
            .map(|v| Row::from_pairs([("v", v.clone())]))
            .collect()
    }

    fn columns() -> Vec<SelectionEntry> {
        vec![SelectionEntry::new("v", "Value")]
    }

    #[test]
    fn test_numeric_comparison_when_both_numbers() {
        assert_eq!(
            compare_cells(&CellValue::Number(9.0), &CellValue::Number(10.0)),
            Ordering::Less
        );
    }

    #[test]
    fn test_string_comparison_is_case_insensitive() {
        assert_eq!(
            compare_cells(
                &CellValue::Text("apple".to_string()),
                &CellValue::Text("Banana".to_string())
            ),
            Ordering::Less
        );
        // Mixed number/text falls back to strings: "10" < "9"
        assert_eq!(
            compare_cells(&CellValue::Number(10.0), &CellValue::Text("9".to_string())),
            Ordering::Less
        );
    }

    #[test]
    fn test_toggle_sort_flips_direction() {
        let data = rows(&[
            CellValue::Number(3.0),
            CellValue::Number(1.0),
            CellValue::Number(2.0),
        ]);
        let mut grid = PreviewGrid::default();
        assert_eq!(grid.ordered_indices(&data, &columns()), vec![0, 1, 2]);

        grid.toggle_sort(0);
        assert_eq!(grid.ordered_indices(&data, &columns()), vec![1, 2, 0]);

        grid.toggle_sort(0);
        assert_eq!(grid.ordered_indices(&data, &columns()), vec![0, 2, 1]);
    }

    #[test]
    fn test_pagination_ranges_and_footer() {
        let mut grid = PreviewGrid::new(10);
        assert_eq!(grid.page_range(23), (0, 10));
        assert_eq!(grid.footer(23), "Showing 1–10 of 23");

        grid.next_page(23);
        grid.next_page(23);
        grid.next_page(23);
        assert_eq!(grid.page, 2);
        assert_eq!(grid.page_range(23), (20, 23));
        assert_eq!(grid.footer(23), "Showing 21–23 of 23");

        grid.prev_page();
        assert_eq!(grid.page, 1);
    }

    #[test]
    fn test_cycle_page_size_resets_page() {
        let mut grid = PreviewGrid::new(10);
        grid.page = 3;
        grid.cycle_page_size();
        assert_eq!(grid.page_size, 25);
        assert_eq!(grid.page, 0);
        grid.page_size = 100;
        grid.cycle_page_size();
        assert_eq!(grid.page_size, 10);
    }

    #[test]
    fn test_empty_footer() {
        let grid = PreviewGrid::default();
        assert_eq!(grid.page_range(0), (0, 0));
        assert_eq!(grid.footer(0), "Showing 0 of 0");
    }
}
