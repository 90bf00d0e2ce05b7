//! Table grid model.
//!
//! Lays the cells of a `<table>` out on a logical grid honouring `colspan`
//! and `rowspan` (including `rowspan="0"`), so header cells can be classified
//! by whether data cells share their rows or columns.

use crate::dom::has_tag;
use scraper::ElementRef;

const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

/// Bounding box of the grid slots a cell occupies, inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    /// Leftmost column
    pub min_x: usize,
    /// Topmost row
    pub min_y: usize,
    /// Rightmost column
    pub max_x: usize,
    /// Bottom row
    pub max_y: usize,
}

/// Sparse 2-D mapping from `(x, y)` slots to the cells rendered there
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedGrid<'a> {
    cells: Vec<Vec<Option<ElementRef<'a>>>>,
}

impl<'a> RenderedGrid<'a> {
    /// Build a grid from explicit rows
    #[must_use]
    pub fn from_rows(cells: Vec<Vec<Option<ElementRef<'a>>>>) -> Self {
        Self { cells }
    }

    /// Number of rows
    #[must_use]
    pub fn height(&self) -> usize {
        self.cells.len()
    }

    /// Length of the longest row
    #[must_use]
    pub fn width(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Cell at `(x, y)`, if any
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<ElementRef<'a>> {
        self.cells.get(y)?.get(x).copied().flatten()
    }

    /// Put `cell` at `(x, y)`, growing the grid as needed
    pub fn set_cell(&mut self, x: usize, y: usize, cell: ElementRef<'a>) {
        if self.cells.len() <= y {
            self.cells.resize_with(y + 1, Vec::new);
        }
        let row = &mut self.cells[y];
        if row.len() <= x {
            row.resize(x + 1, None);
        }
        row[x] = Some(cell);
    }

    /// All rows, top to bottom
    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<ElementRef<'a>>>] {
        &self.cells
    }

    /// The slots occupied by `cell`, or `None` if it isn't in the grid
    #[must_use]
    pub fn rectangle(&self, cell: &ElementRef<'a>) -> Option<Rectangle> {
        let mut rect: Option<Rectangle> = None;
        for (y, row) in self.cells.iter().enumerate() {
            let mut xs = row
                .iter()
                .enumerate()
                .filter(|(_, slot)| slot.as_ref() == Some(cell))
                .map(|(x, _)| x);
            let Some(first) = xs.next() else {
                continue;
            };
            let last = xs.last().unwrap_or(first);
            rect = Some(match rect {
                None => Rectangle {
                    min_x: first,
                    min_y: y,
                    max_x: last,
                    max_y: y,
                },
                Some(r) => Rectangle {
                    min_x: r.min_x.min(first),
                    min_y: r.min_y,
                    max_x: r.max_x.max(last),
                    max_y: y,
                },
            });
        }
        rect
    }

    /// Append the rows of `other` below this grid
    pub fn concat(&mut self, other: Self) {
        self.cells.extend(other.cells);
    }
}

/// Whether the table has a data cell in any row `cell` spans
#[must_use]
pub fn has_data_in_row(table: ElementRef<'_>, cell: &ElementRef<'_>) -> bool {
    let grid = grid_from_table(table);
    let Some(rect) = grid.rectangle(cell) else {
        debug_assert!(false, "Target cell not found in table");
        return false;
    };
    grid.rows()[rect.min_y..=rect.max_y]
        .iter()
        .any(|row| row.iter().any(is_data_slot))
}

/// Whether the table has a data cell in any column `cell` spans
#[must_use]
pub fn has_data_in_column(table: ElementRef<'_>, cell: &ElementRef<'_>) -> bool {
    let grid = grid_from_table(table);
    let Some(rect) = grid.rectangle(cell) else {
        debug_assert!(false, "Target cell not found in table");
        return false;
    };
    grid.rows().iter().any(|row| {
        row.iter()
            .skip(rect.min_x)
            .take(rect.max_x + 1 - rect.min_x)
            .any(is_data_slot)
    })
}

/// Lay out a whole table: `<thead>`, every `<tbody>`, bare `<tr>` children,
/// then `<tfoot>`
#[must_use]
pub fn grid_from_table(table: ElementRef<'_>) -> RenderedGrid<'_> {
    let mut grid = RenderedGrid::default();
    let first_child = |tag: &str| table.child_elements().find(|child| has_tag(child, tag));

    if let Some(head) = first_child("thead") {
        grid.concat(grid_from_rows(&rows_of(head)));
    }
    for body in table.child_elements().filter(|child| has_tag(child, "tbody")) {
        grid.concat(grid_from_rows(&rows_of(body)));
    }
    grid.concat(grid_from_rows(&rows_of(table)));
    if let Some(foot) = first_child("tfoot") {
        grid.concat(grid_from_rows(&rows_of(foot)));
    }
    grid
}

fn rows_of(section: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    section
        .child_elements()
        .filter(|child| has_tag(child, "tr"))
        .collect()
}

fn cells_of(row: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    row.child_elements()
        .filter(|child| has_tag(child, "td") || has_tag(child, "th"))
}

/// Lay out a group of rows
#[must_use]
pub fn grid_from_rows<'a>(rows: &[ElementRef<'a>]) -> RenderedGrid<'a> {
    let mut grid = RenderedGrid::default();
    // Columns claimed by a rowspan="0" cell
    let mut full_columns: Vec<Option<ElementRef<'a>>> = Vec::new();
    let full_column = |columns: &[Option<ElementRef<'a>>], x: usize| columns.get(x).copied().flatten();

    for (y, row) in rows.iter().enumerate() {
        let mut next_free = 0;

        for cell in cells_of(*row) {
            while grid.cell(next_free, y).is_some() || full_column(&full_columns, next_free).is_some() {
                if let Some(filler) = full_column(&full_columns, next_free) {
                    if !is_data_slot(&grid.cell(next_free, y)) {
                        grid.set_cell(next_free, y, filler);
                    }
                }
                next_free += 1;
            }

            let span = col_span(&cell);
            let rows_spanned = row_span(&cell);
            for x in next_free..next_free + span {
                if rows_spanned == 0 {
                    if full_columns.len() <= x {
                        full_columns.resize(x + 1, None);
                    }
                    full_columns[x] = Some(cell);
                    grid.set_cell(x, y, cell);
                }
                // Overlapping cells: data wins, since only data presence matters
                for covered in y..y + rows_spanned {
                    if !is_data_slot(&grid.cell(x, covered)) {
                        grid.set_cell(x, covered, cell);
                    }
                }
            }
            next_free += span;
        }

        for x in next_free..grid.width() {
            if let Some(filler) = full_column(&full_columns, x) {
                if !is_data_slot(&grid.cell(x, y)) {
                    grid.set_cell(x, y, filler);
                }
            }
        }
    }
    grid
}

fn is_data_slot(slot: &Option<ElementRef<'_>>) -> bool {
    slot.as_ref().is_some_and(|cell| has_tag(cell, "td"))
}

/// `colspan` as browsers read it: 1 when absent, invalid or zero
fn col_span(cell: &ElementRef<'_>) -> usize {
    cell.value()
        .attr("colspan")
        .and_then(|span| span.trim().parse::<usize>().ok())
        .filter(|span| *span > 0)
        .map_or(1, |span| span.min(MAX_COLSPAN))
}

/// `rowspan` read from the literal attribute; 0 means "to the end of the
/// row group". Blank, unparsable and negative values count as 1.
fn row_span(cell: &ElementRef<'_>) -> usize {
    cell.value()
        .attr("rowspan")
        .and_then(|span| span.trim().parse::<usize>().ok())
        .map_or(1, |span| span.min(MAX_ROWSPAN))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn table(doc: &Document) -> ElementRef<'_> {
        doc.query_selector("table").unwrap().unwrap()
    }

    fn cell<'a>(doc: &'a Document, id: &str) -> ElementRef<'a> {
        doc.get_element_by_id(id).unwrap()
    }

    fn expected<'a>(doc: &'a Document, rows: &[&[&str]]) -> RenderedGrid<'a> {
        RenderedGrid::from_rows(
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|id| (!id.is_empty()).then(|| cell(doc, id)))
                        .collect()
                })
                .collect(),
        )
    }

    mod has_data_tests {
        use super::*;

        #[test]
        fn test_data_in_same_row() {
            let doc = Document::parse(
                r#"<table>
                    <tr><th id="0,0">h</th><th id="0,1">h</th></tr>
                    <tr><th id="1,0">h</th><td id="1,1">d</td></tr>
                    <tr><td id="2,0">d</td><td id="2,1">d</td></tr>
                </table>"#,
            );
            assert!(!has_data_in_row(table(&doc), &cell(&doc, "0,0")));
            assert!(has_data_in_row(table(&doc), &cell(&doc, "1,0")));
            assert!(has_data_in_row(table(&doc), &cell(&doc, "2,0")));
        }

        #[test]
        fn test_rowspan_on_data_cell() {
            let doc = Document::parse(
                r#"<table>
                    <tr><td id="0,0" rowspan="2">d</td></tr>
                    <tr><th id="1,0">h</th></tr>
                </table>"#,
            );
            assert!(has_data_in_row(table(&doc), &cell(&doc, "1,0")));
        }

        #[test]
        fn test_rowspan_on_target_cell() {
            let doc = Document::parse(
                r#"<table>
                    <tr><th id="0,0" rowspan="2">h</th></tr>
                    <tr><td id="1,0">d</td></tr>
                </table>"#,
            );
            assert!(has_data_in_row(table(&doc), &cell(&doc, "0,0")));
        }

        #[test]
        fn test_data_in_same_column() {
            let doc = Document::parse(
                r#"<table>
                    <tr><th id="0,0">h</th><th id="0,1">h</th><td id="0,2">d</td></tr>
                    <tr><th id="1,0">h</th><td id="1,1">d</td><td id="1,2">d</td></tr>
                </table>"#,
            );
            assert!(!has_data_in_column(table(&doc), &cell(&doc, "0,0")));
            assert!(has_data_in_column(table(&doc), &cell(&doc, "0,1")));
            assert!(has_data_in_column(table(&doc), &cell(&doc, "0,2")));
        }

        #[test]
        fn test_colspan_on_data_and_target_cells() {
            let doc = Document::parse(
                r#"<table>
                    <tr><td id="a" colspan="2">d</td></tr>
                    <tr><td>d</td><th id="b">h</th></tr>
                </table>
                <table>
                    <tr><th id="c" colspan="2">h</th></tr>
                    <tr><th>h</th><td>d</td></tr>
                </table>"#,
            );
            let tables = doc.query_selector_all("table").unwrap();
            assert!(has_data_in_column(tables[0], &cell(&doc, "b")));
            assert!(has_data_in_column(tables[1], &cell(&doc, "c")));
        }
    }

    mod grid_tests {
        use super::*;

        #[test]
        fn test_simple_grid() {
            let doc = Document::parse(
                r#"<table>
                    <tr><th id="0,0">h</th><th id="0,1">h</th></tr>
                    <tr><td id="1,0">d</td><td id="1,1">d</td></tr>
                </table>"#,
            );
            assert_eq!(
                grid_from_table(table(&doc)),
                expected(&doc, &[&["0,0", "0,1"], &["1,0", "1,1"]])
            );
        }

        #[test]
        fn test_rowspan_and_colspan() {
            let doc = Document::parse(
                r#"<table>
                    <tr><th id="0,0">h</th><th colspan="2" id="0,1">h</th></tr>
                    <tr><td rowspan="2" id="1,0">d</td><td rowspan="2" colspan="2" id="1,1">d</td></tr>
                </table>"#,
            );
            assert_eq!(
                grid_from_table(table(&doc)),
                expected(
                    &doc,
                    &[
                        &["0,0", "0,1", "0,1"],
                        &["1,0", "1,1", "1,1"],
                        &["1,0", "1,1", "1,1"],
                    ]
                )
            );
        }

        #[test]
        fn test_sections_in_order() {
            let doc = Document::parse(
                r#"<table>
                    <tfoot><tr><th id="f0">h</th><td id="f1">d</td></tr></tfoot>
                    <thead>
                      <tr><th id="h00">h</th><th rowspan="0" id="h01">h</th></tr>
                      <tr><td id="h10">d</td></tr>
                    </thead>
                    <tbody><tr><th id="b0">h</th><td id="b1">d</td></tr></tbody>
                </table>"#,
            );
            assert_eq!(
                grid_from_table(table(&doc)),
                expected(
                    &doc,
                    &[
                        &["h00", "h01"],
                        &["h10", "h01"],
                        &["b0", "b1"],
                        &["f0", "f1"],
                    ]
                )
            );
        }

        #[test]
        fn test_rowspan_zero_covers_every_following_row() {
            let doc = Document::parse(
                r#"<table>
                    <tr><th id="h" rowspan="0">h</th><th id="x">h</th></tr>
                    <tr><td id="r1">d</td></tr>
                    <tr><td id="r2">d</td></tr>
                    <tr><td id="r3">d</td></tr>
                </table>"#,
            );
            assert_eq!(
                grid_from_table(table(&doc)),
                expected(
                    &doc,
                    &[&["h", "x"], &["h", "r1"], &["h", "r2"], &["h", "r3"]]
                )
            );
        }

        #[test]
        fn test_rowspan_zero_fills_trailing_columns() {
            let doc = Document::parse(
                r#"<table>
                    <tr><th id="0,0">h</th><th id="0,1">h</th><th id="0,2" rowspan="0">h</th></tr>
                    <tr><td id="1,0">d</td></tr>
                    <tr><td id="2,0">d</td><td id="2,1" rowspan="0">d</td></tr>
                    <tr><td id="3,0">d</td></tr>
                    <tr><td id="4,0">d</td></tr>
                </table>"#,
            );
            assert_eq!(
                grid_from_table(table(&doc)),
                expected(
                    &doc,
                    &[
                        &["0,0", "0,1", "0,2"],
                        &["1,0", "", "0,2"],
                        &["2,0", "2,1", "0,2"],
                        &["3,0", "2,1", "0,2"],
                        &["4,0", "2,1", "0,2"],
                    ]
                )
            );
        }

        #[test]
        fn test_overlapping_cells_prefer_data() {
            let doc = Document::parse(
                r#"<table>
                  <tr><th id="0,0">h</th><th id="0,1" rowspan="4">h</th><th id="0,2">h</th><th id="0,3">h</th><th id="0,4">h</th></tr>
                  <tr><td id="1,0" colspan="3">d</td><td id="1,1">d</td></tr>
                  <tr><td id="2,0">d</td></tr>
                  <tr><td id="3,0">d</td></tr>
                </table>"#,
            );
            assert_eq!(
                grid_from_table(table(&doc)),
                expected(
                    &doc,
                    &[
                        &["0,0", "0,1", "0,2", "0,3", "0,4"],
                        &["1,0", "1,0", "1,0", "1,1"],
                        &["2,0", "0,1"],
                        &["3,0", "0,1"],
                    ]
                )
            );
        }

        #[test]
        fn test_cells_pushed_past_spanning_cells() {
            let doc = Document::parse(
                r#"<table>
                  <tr><th id="0,0">h</th><th id="0,1" rowspan="4">h</th><th id="0,2">h</th><th id="0,3">h</th><th id="0,4">h</th></tr>
                  <tr><td id="1,0">d</td><td id="1,1" colspan="3">d</td></tr>
                  <tr><td id="2,0">d</td></tr>
                  <tr><td id="3,0">d</td></tr>
                </table>"#,
            );
            assert_eq!(
                grid_from_table(table(&doc)),
                expected(
                    &doc,
                    &[
                        &["0,0", "0,1", "0,2", "0,3", "0,4"],
                        &["1,0", "0,1", "1,1", "1,1", "1,1"],
                        &["2,0", "0,1"],
                        &["3,0", "0,1"],
                    ]
                )
            );
        }

        #[test]
        fn test_rectangle() {
            let doc = Document::parse(
                r#"<table>
                    <tr><th id="a" colspan="2" rowspan="2">h</th><td id="b">d</td></tr>
                    <tr><td id="c">d</td></tr>
                </table>"#,
            );
            let grid = grid_from_table(table(&doc));
            assert_eq!(
                grid.rectangle(&cell(&doc, "a")),
                Some(Rectangle { min_x: 0, min_y: 0, max_x: 1, max_y: 1 })
            );
            assert_eq!(
                grid.rectangle(&cell(&doc, "c")),
                Some(Rectangle { min_x: 2, min_y: 1, max_x: 2, max_y: 1 })
            );
            assert_eq!(grid.width(), 3);
            assert_eq!(grid.height(), 2);
        }

        #[test]
        fn test_span_parsing() {
            let doc = Document::parse(
                r#"<table><tr>
                    <td id="a" rowspan=" ">d</td><td id="b" rowspan="x">d</td>
                    <td id="c" rowspan="-2">d</td><td id="d" colspan="0">d</td>
                    <td id="e" rowspan=" 3 ">d</td>
                </tr></table>"#,
            );
            assert_eq!(row_span(&cell(&doc, "a")), 1);
            assert_eq!(row_span(&cell(&doc, "b")), 1);
            assert_eq!(row_span(&cell(&doc, "c")), 1);
            assert_eq!(col_span(&cell(&doc, "d")), 1);
            assert_eq!(row_span(&cell(&doc, "e")), 3);
        }
    }
}
