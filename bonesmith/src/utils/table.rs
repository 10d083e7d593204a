//! Table formatting utilities

use prettytable::{Cell, Row, Table};

/// Create a table with bold headers
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(headers.iter().map(|h| Cell::new(h).style_spec("b")).collect());
    table
}

/// Whether a cell holds a number, a duration or a position
fn is_numeric(cell: &str) -> bool {
    let cell = cell.strip_suffix('s').unwrap_or(cell);
    cell.parse::<f64>().is_ok() || (cell.starts_with('(') && cell.ends_with(')'))
}

/// Add a row; numeric cells are right-aligned so columns of times and
/// positions line up
pub fn add_table_row(table: &mut Table, cells: impl IntoIterator<Item = String>) {
    let row: Row = cells
        .into_iter()
        .map(|s| {
            let cell = Cell::new(&s);
            if is_numeric(&s) {
                cell.style_spec("r")
            } else {
                cell
            }
        })
        .collect();
    table.add_row(row);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_cells() {
        assert!(is_numeric("12"));
        assert!(is_numeric("0.250s"));
        assert!(is_numeric("(0.000, 1.500, 0.000)"));
        assert!(!is_numeric("hips"));
        assert!(!is_numeric("-"));
    }

    #[test]
    fn test_rows() {
        let mut table = create_table(&["#", "Joint"]);
        add_table_row(&mut table, vec!["0".to_string(), "hips".to_string()]);
        add_table_row(&mut table, ["1", "spine"].map(String::from));
        assert_eq!(table.len(), 2);
        let cell = table.get_row(1).and_then(|row| row.get_cell(1));
        assert_eq!(cell.map(Cell::get_content), Some("spine".to_string()));
    }
}
