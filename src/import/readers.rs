use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{Data, DataType, Reader, open_workbook_auto_from_rs};
use serde_json::Value;

use super::ImportError;

/// One source row: original header mapped to cell text.
pub type RawRow = BTreeMap<String, String>;

const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Picks a reader from the file extension.
pub fn read_rows(filename: &str, bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_xlsx(bytes),
        "csv" => read_csv(bytes),
        "json" => read_json(bytes),
        _ => Err(ImportError::UnsupportedFormat(filename.to_string())),
    }
}

/// Reads the first worksheet; the first row holds the headers.
pub fn read_xlsx(bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::EmptyWorkbook)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(cell_text).collect();

    Ok(rows
        .map(|row| {
            headers
                .iter()
                .zip(row.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, cell)| (header.clone(), cell_text(cell)))
                .collect()
        })
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| dt.format(DATE_TIME_FORMAT).to_string())
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

pub fn read_csv(bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.to_string(), value.to_string()))
                .collect(),
        );
    }
    Ok(rows)
}

/// Reads a JSON array of flat objects.
pub fn read_json(bytes: &[u8]) -> Result<Vec<RawRow>, ImportError> {
    let records: Vec<serde_json::Map<String, Value>> = serde_json::from_slice(bytes)?;
    Ok(records
        .into_iter()
        .map(|record| {
            record
                .into_iter()
                .map(|(key, value)| {
                    let text = match value {
                        Value::Null => String::new(),
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (key, text)
                })
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_keep_their_headers() {
        let data = "\u{feff}Email Address,First Name,Amount\n ada@example.org ,Ada,$100\n,Nobody,5\n";
        let rows = read_csv(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["First Name"], "Ada");
        assert_eq!(rows[0]["Amount"], "$100");
        assert_eq!(rows[1]["First Name"], "Nobody");
    }

    #[test]
    fn csv_tolerates_short_rows() {
        let data = "email,amount,date\nada@example.org,10\n";
        let rows = read_csv(data.as_bytes()).unwrap();
        assert_eq!(rows[0].len(), 2);
        assert!(!rows[0].contains_key("date"));
    }

    #[test]
    fn json_values_become_text() {
        let data = br#"[{"email": "ada@example.org", "amount": 25.5, "phone": null, "recurring": true}]"#;
        let rows = read_json(data).unwrap();
        assert_eq!(rows[0]["amount"], "25.5");
        assert_eq!(rows[0]["phone"], "");
        assert_eq!(rows[0]["recurring"], "true");
    }

    #[test]
    fn json_must_be_an_array() {
        assert!(matches!(
            read_json(br#"{"email": "ada@example.org"}"#),
            Err(ImportError::Json(_))
        ));
    }

    #[test]
    fn unknown_extensions_are_rejected() {
        assert!(matches!(
            read_rows("donors.txt", b"email\n"),
            Err(ImportError::UnsupportedFormat(_))
        ));
        assert!(read_rows("DONORS.CSV", b"email\nada@example.org\n").is_ok());
    }

    #[test]
    fn xlsx_first_sheet_is_read() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Email").unwrap();
        sheet.write_string(0, 1, "Donation Amount").unwrap();
        sheet.write_string(0, 2, "Phone").unwrap();
        sheet.write_string(1, 0, "ada@example.org").unwrap();
        sheet.write_number(1, 1, 100.0).unwrap();
        sheet.write_number(1, 2, 5551234567.0).unwrap();
        sheet.write_string(2, 0, "grace@example.org").unwrap();
        sheet.write_number(2, 1, 12.5).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let rows = read_rows("export.xlsx", &bytes).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Email"], "ada@example.org");
        assert_eq!(rows[0]["Donation Amount"], "100");
        assert_eq!(rows[0]["Phone"], "5551234567");
        assert_eq!(rows[1]["Donation Amount"], "12.5");
    }

    #[test]
    fn garbage_workbook_is_an_error() {
        assert!(matches!(
            read_xlsx(b"definitely not a zip"),
            Err(ImportError::Spreadsheet(_))
        ));
    }
}
