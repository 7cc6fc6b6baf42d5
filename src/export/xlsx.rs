use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet};
use std::path::Path;

use crate::config::settings::ExportConfig;
use crate::errors::ExportError;
use crate::models::row::{Cell, Row, HEADERS};

/// Header positions to write, skipping excluded names.
pub fn selected_columns(excluded: &[String]) -> Vec<usize> {
    HEADERS
        .iter()
        .enumerate()
        .filter(|(_, header)| !excluded.iter().any(|e| e == *header))
        .map(|(i, _)| i)
        .collect()
}

/// Writes `rows` to a fresh workbook at `path`, replacing any existing file.
/// The previous file is only removed once the new workbook has been built.
/// Returns the number of data rows written.
pub fn write_workbook(rows: &[Row], options: &ExportConfig, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("Failed to create output directory")?;
        }
    }

    let columns = selected_columns(&options.excluded_columns);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    fill_sheet(worksheet, rows, &columns, options).map_err(ExportError::from)?;

    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove existing file {}", path.display()))?;
        log::debug!("Removed previous export at {}", path.display());
    }

    workbook.save(path).map_err(ExportError::from)?;
    log::info!(
        "Wrote {} rows x {} columns to {}",
        rows.len(),
        columns.len(),
        path.display()
    );

    Ok(rows.len())
}

fn fill_sheet(
    worksheet: &mut Worksheet,
    rows: &[Row],
    columns: &[usize],
    options: &ExportConfig,
) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
    worksheet.set_name(&options.sheet_name)?;

    let bold = Format::new().set_bold();
    let index_format = Format::new().set_bold().set_align(FormatAlign::Center);

    for (col, &source) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, HEADERS[source], &bold)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let sheet_row = (i + 1) as u32;
        let cells = row.cells();

        for (col, &source) in columns.iter().enumerate() {
            let col = col as u16;
            let styled = options.style_index_column && HEADERS[source] == "index";

            match (&cells[source], styled) {
                (Cell::Text(text), false) => {
                    worksheet.write_string(sheet_row, col, text)?;
                }
                (Cell::Text(text), true) => {
                    worksheet.write_string_with_format(sheet_row, col, text, &index_format)?;
                }
                (Cell::Number(n), false) => {
                    worksheet.write_number(sheet_row, col, *n)?;
                }
                (Cell::Number(n), true) => {
                    worksheet.write_number_with_format(sheet_row, col, *n, &index_format)?;
                }
                (Cell::Empty, _) => {}
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::FieldsConfig;
    use crate::models::issue::Issue;
    use crate::transform::rows::build_rows;
    use calamine::{open_workbook, Data, Range, Reader, Xlsx};
    use serde_json::json;

    fn sample_rows(n: usize) -> Vec<Row> {
        let issues: Vec<Issue> = (1..=n)
            .map(|i| {
                serde_json::from_value(json!({
                    "key": format!("DEV-{}", i),
                    "fields": {"status": {"name": "Done"}}
                }))
                .unwrap()
            })
            .collect();
        build_rows(&issues, "https://jira.example.com", &FieldsConfig::default())
    }

    fn read_sheet(path: &Path, name: &str) -> (Vec<String>, Range<Data>) {
        let mut workbook: Xlsx<_> = open_workbook(path).unwrap();
        let names = workbook.sheet_names();
        let range = workbook.worksheet_range(name).unwrap();
        (names, range)
    }

    fn header_row(range: &Range<Data>) -> Vec<String> {
        range
            .rows()
            .next()
            .unwrap()
            .iter()
            .map(|cell| cell.to_string())
            .collect()
    }

    #[test]
    fn test_selected_columns_all_by_default() {
        assert_eq!(selected_columns(&[]).len(), 25);
    }

    #[test]
    fn test_selected_columns_skips_excluded() {
        let excluded = vec![
            "Link".to_string(),
            "labels".to_string(),
            "Sprint".to_string(),
        ];
        let columns = selected_columns(&excluded);
        assert_eq!(columns.len(), 22);
        assert!(columns.iter().all(|&c| !excluded.contains(&HEADERS[c].to_string())));
        assert_eq!(columns[0], 0);
    }

    #[test]
    fn test_write_workbook_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("issues.xlsx");

        let written = write_workbook(&sample_rows(3), &ExportConfig::default(), &path).unwrap();
        assert_eq!(written, 3);

        let (names, range) = read_sheet(&path, "Jira Issues");
        assert_eq!(names, vec!["Jira Issues"]);
        assert_eq!(header_row(&range), HEADERS.to_vec());
        assert_eq!(range.height(), 4);

        let key_col = HEADERS.iter().position(|h| *h == "Issue_key").unwrap();
        assert_eq!(
            range.get_value((1, key_col as u32)),
            Some(&Data::String("DEV-1".to_string()))
        );
    }

    #[test]
    fn test_write_workbook_omits_excluded_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.xlsx");
        let options = ExportConfig {
            excluded_columns: vec![
                "Link".to_string(),
                "labels".to_string(),
                "Sprint".to_string(),
            ],
            ..ExportConfig::default()
        };

        write_workbook(&sample_rows(2), &options, &path).unwrap();

        let (_, range) = read_sheet(&path, "Jira Issues");
        let headers = header_row(&range);
        assert_eq!(headers.len(), 22);
        assert!(!headers.iter().any(|h| options.excluded_columns.contains(h)));
        assert_eq!(headers[0], "index");
        assert_eq!(range.height(), 3);
    }

    #[test]
    fn test_write_workbook_header_only_for_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");

        let written = write_workbook(&[], &ExportConfig::default(), &path).unwrap();
        assert_eq!(written, 0);

        let (_, range) = read_sheet(&path, "Jira Issues");
        assert_eq!(range.height(), 1);
        assert_eq!(header_row(&range), HEADERS.to_vec());
    }

    #[test]
    fn test_write_workbook_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.xlsx");
        std::fs::write(&path, b"stale contents").unwrap();

        write_workbook(&sample_rows(1), &ExportConfig::default(), &path).unwrap();

        let (_, range) = read_sheet(&path, "Jira Issues");
        assert_eq!(range.height(), 2);
    }

    #[test]
    fn test_write_workbook_rejects_invalid_sheet_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.xlsx");
        std::fs::write(&path, b"previous export").unwrap();
        let options = ExportConfig {
            sheet_name: "Bad[Name]".to_string(),
            ..ExportConfig::default()
        };

        let err = write_workbook(&sample_rows(1), &options, &path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExportError>(),
            Some(ExportError::ExportFailed(_))
        ));
        // a failed build leaves the previous export in place
        assert_eq!(std::fs::read(&path).unwrap(), b"previous export");
    }
}
