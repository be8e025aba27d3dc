//! Office Open XML (`.xlsx`) export of extracted fields.

pub mod reader;
pub mod writer;

pub use reader::{read_table, sheet_names};
pub use writer::{build_workbook, export_filename, write_table};

pub const SHEET_NAME: &str = "Insurance Data";

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A header row plus data rows of string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Spreadsheet column letters for a 0-based index: 0 → `A`, 25 → `Z`, 26 → `AA`.
pub fn column_name(index: usize) -> String {
    let mut name = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Inverse of [`column_name`] for the letter prefix of a cell reference like `B2`.
pub fn column_index(cell_ref: &str) -> Option<usize> {
    let letters: Vec<u8> = cell_ref
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        return None;
    }

    let mut n = 0usize;
    for b in letters {
        n = n.checked_mul(26)?.checked_add((b - b'A' + 1) as usize)?;
    }
    Some(n - 1)
}
