//! Reading URL lists out of free-form text (pasted lists, CSV exports) and
//! spreadsheets.

use anyhow::{anyhow, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;
use url::Url;

/// File extensions read as workbooks rather than text
const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

lazy_static! {
    static ref URL_PATTERN: Regex = Regex::new(r"^https?://.+\..+").expect("static regex");
}

/// Absolute http(s) URL with a dotted host part.
pub fn is_valid_url(candidate: &str) -> bool {
    URL_PATTERN.is_match(candidate) && Url::parse(candidate).is_ok()
}

/// Split text on newlines, commas, semicolons and tabs and keep the cells
/// that look like URLs, in their original order.
pub fn parse_url_list(text: &str) -> Vec<String> {
    text.split(['\n', '\r', ',', ';', '\t'])
        .map(|cell| cell.trim().trim_matches('"').trim())
        .filter(|cell| looks_like_url(cell))
        .map(str::to_string)
        .collect()
}

fn looks_like_url(cell: &str) -> bool {
    cell.starts_with("http") && is_valid_url(cell)
}

pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// URLs of a list file: workbooks cell by cell, anything else as text.
pub fn read_url_file(path: &Path) -> Result<Vec<String>> {
    if is_spreadsheet(path) {
        return read_spreadsheet_urls(path);
    }

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(parse_url_list(&text))
}

/// URL cells of the first worksheet, row by row.
pub fn read_spreadsheet_urls(path: &Path) -> Result<Vec<String>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook {}", path.display()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook {} has no worksheets", path.display()))?
        .with_context(|| format!("Failed to read first worksheet of {}", path.display()))?;

    Ok(urls_from_cells(range.rows().flatten()))
}

/// Text cells that look like URLs; numbers, dates and blanks are skipped.
fn urls_from_cells<'a>(cells: impl IntoIterator<Item = &'a Data>) -> Vec<String> {
    cells
        .into_iter()
        .filter_map(|cell| match cell {
            Data::String(text) => Some(text.trim()),
            _ => None,
        })
        .filter(|text| looks_like_url(text))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("https://example.com/page"));
        assert!(is_valid_url("http://shop.example.de"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("https://localhost"));
        assert!(!is_valid_url("example.com"));
    }

    #[test]
    fn test_parse_url_list_reads_spreadsheet_export() {
        let text = "url;title\n\"https://a.com/one\";One\r\nhttps://a.com/two,Two\n\nnot-a-url\thttps://a.com/three";

        assert_eq!(
            parse_url_list(text),
            vec!["https://a.com/one", "https://a.com/two", "https://a.com/three"]
        );
    }

    #[test]
    fn test_only_text_cells_become_urls() {
        let cells = vec![
            Data::String("Old URL".to_string()),
            Data::String(" https://a.com/one ".to_string()),
            Data::Float(42.0),
            Data::Empty,
            Data::String("http://intranet/page".to_string()),
            Data::String("https://a.com/two".to_string()),
        ];

        assert_eq!(
            urls_from_cells(&cells),
            vec!["https://a.com/one", "https://a.com/two"]
        );
    }

    #[test]
    fn test_spreadsheets_are_chosen_by_extension() {
        assert!(is_spreadsheet(Path::new("old.xlsx")));
        assert!(is_spreadsheet(Path::new("exports/New.XLS")));
        assert!(is_spreadsheet(Path::new("sheet.ods")));
        assert!(!is_spreadsheet(Path::new("old.csv")));
        assert!(!is_spreadsheet(Path::new("urls")));
    }

    #[test]
    fn test_reads_first_worksheet_of_a_workbook() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/old_urls.xlsx");

        assert_eq!(
            read_url_file(&path).unwrap(),
            vec![
                "https://old.example.com/about",
                "https://old.example.com/shop/boots",
                "https://old.example.com/contact"
            ]
        );
    }

    #[test]
    fn test_missing_workbook_is_an_error() {
        let err = read_url_file(Path::new("does/not/exist.xlsx")).unwrap_err();
        assert!(format!("{:#}", err).contains("exist.xlsx"));
    }
}
