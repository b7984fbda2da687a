use calamine::{open_workbook_from_rs, Data, Reader, Xls, Xlsx};
use std::io::Cursor;
use std::path::Path;

use super::error::ImportError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Формат файла импорта, определяется по расширению имени файла
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Xlsx,
    Xls,
}

impl ImportFormat {
    pub fn from_file_name(file_name: &str) -> Result<Self, ImportError> {
        let extension = Path::new(file_name.trim())
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(ImportFormat::Csv),
            "xlsx" => Ok(ImportFormat::Xlsx),
            "xls" => Ok(ImportFormat::Xls),
            _ => Err(ImportError::UnsupportedFormat(file_name.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportFormat::Csv => "csv",
            ImportFormat::Xlsx => "xlsx",
            ImportFormat::Xls => "xls",
        }
    }
}

/// Строка файла как есть: пары (заголовок колонки, значение ячейки)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// Номер строки в исходном файле (1 - строка заголовков)
    pub line: usize,
    pub cells: Vec<(String, String)>,
}

impl ImportRow {
    pub fn new(line: usize, cells: Vec<(String, String)>) -> Self {
        Self { line, cells }
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }
}

/// Разобрать содержимое файла в строки импорта
///
/// Пустые строки отбрасываются. Ни одной строки данных - `EmptyInput`.
pub fn parse(bytes: &[u8], format: ImportFormat) -> Result<Vec<ImportRow>, ImportError> {
    if bytes.is_empty() {
        return Err(ImportError::EmptyInput);
    }

    let rows = match format {
        ImportFormat::Csv => parse_csv(bytes)?,
        ImportFormat::Xlsx => {
            let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))
                .map_err(|e| malformed(format, e))?;
            read_first_sheet(workbook, format)?
        }
        ImportFormat::Xls => {
            let workbook: Xls<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))
                .map_err(|e| malformed(format, e))?;
            read_first_sheet(workbook, format)?
        }
    };

    let rows: Vec<ImportRow> = rows.into_iter().filter(|r| !r.is_blank()).collect();
    if rows.is_empty() {
        return Err(ImportError::EmptyInput);
    }

    tracing::debug!("Parsed {} data rows from {} file", rows.len(), format.as_str());
    Ok(rows)
}

fn malformed(format: ImportFormat, err: impl std::fmt::Display) -> ImportError {
    ImportError::MalformedFile {
        format: format.as_str(),
        reason: err.to_string(),
    }
}

fn parse_csv(bytes: &[u8]) -> Result<Vec<ImportRow>, ImportError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(ImportFormat::Csv, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| malformed(ImportFormat::Csv, e))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);

        // Короткие строки дополняются пустыми ячейками, лишние ячейки без заголовка отбрасываются
        let cells = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(ImportRow::new(line, cells));
    }
    Ok(rows)
}

fn read_first_sheet<R>(mut workbook: R, format: ImportFormat) -> Result<Vec<ImportRow>, ImportError>
where
    R: Reader<Cursor<Vec<u8>>>,
    R::Error: std::fmt::Display,
{
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::EmptyInput)?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| malformed(format, e))?;

    let first_line = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);
    let mut row_iter = range.rows();
    let Some(header_row) = row_iter.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell_to_string(cell).trim().to_string())
        .collect();

    let rows = row_iter
        .enumerate()
        .map(|(idx, row)| {
            let cells = headers
                .iter()
                .enumerate()
                .map(|(i, h)| (h.clone(), row.get(i).map(cell_to_string).unwrap_or_default()))
                .collect();
            ImportRow::new(first_line + idx + 1, cells)
        })
        .collect();
    Ok(rows)
}

/// Текст ячейки; целые числа без дробной части ("10", а не "10.0")
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            (*f as i64).to_string()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    fn value<'a>(row: &'a ImportRow, header: &str) -> &'a str {
        row.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
            .unwrap()
    }

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(ImportFormat::from_file_name("stok.CSV").unwrap(), ImportFormat::Csv);
        assert_eq!(ImportFormat::from_file_name("a.b.xlsx").unwrap(), ImportFormat::Xlsx);
        assert_eq!(ImportFormat::from_file_name("lama.Xls").unwrap(), ImportFormat::Xls);
        assert!(matches!(
            ImportFormat::from_file_name("produk.txt"),
            Err(ImportError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ImportFormat::from_file_name("tanpa_ekstensi"),
            Err(ImportError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_csv_quoting_bom_and_short_rows() {
        let data = "\u{feff}Kode,Nama Produk,Stok\nA1,\"Gula, pasir \"\"1kg\"\"\",10\nB2,Kopi\n,,\n";
        let rows = parse(data.as_bytes(), ImportFormat::Csv).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(value(&rows[0], "Kode"), "A1");
        assert_eq!(value(&rows[0], "Nama Produk"), "Gula, pasir \"1kg\"");
        assert_eq!(value(&rows[1], "Stok"), "");
        assert_eq!(rows[1].line, 3);
    }

    #[test]
    fn test_csv_multiline_cell() {
        let data = "Kode,Deskripsi\nA1,\"baris satu\nbaris dua\"\nB2,x\n";
        let rows = parse(data.as_bytes(), ImportFormat::Csv).unwrap();
        assert_eq!(value(&rows[0], "Deskripsi"), "baris satu\nbaris dua");
        assert_eq!(rows[1].line, 4);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(matches!(parse(b"", ImportFormat::Csv), Err(ImportError::EmptyInput)));
        assert!(matches!(
            parse(b"Kode,Nama\n", ImportFormat::Csv),
            Err(ImportError::EmptyInput)
        ));
        assert!(matches!(
            parse(b"Kode,Nama\n , \n", ImportFormat::Csv),
            Err(ImportError::EmptyInput)
        ));
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(matches!(
            parse(b"Kode,Nama\nA1,\xff\xfe\n", ImportFormat::Csv),
            Err(ImportError::MalformedFile { format: "csv", .. })
        ));
        assert!(matches!(
            parse(b"definitely not a zip archive", ImportFormat::Xlsx),
            Err(ImportError::MalformedFile { format: "xlsx", .. })
        ));
        assert!(matches!(
            parse(b"definitely not an ole file", ImportFormat::Xls),
            Err(ImportError::MalformedFile { format: "xls", .. })
        ));
    }

    #[test]
    fn test_xlsx_first_sheet_and_whole_numbers() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Kode").unwrap();
        sheet.write_string(0, 1, "Stok").unwrap();
        sheet.write_string(0, 2, "Harga Umum").unwrap();
        sheet.write_string(1, 0, "A1").unwrap();
        sheet.write_number(1, 1, 10.0).unwrap();
        sheet.write_number(1, 2, 15000.5).unwrap();
        sheet.write_number(3, 0, 42.0).unwrap();
        let other = workbook.add_worksheet();
        other.write_string(0, 0, "ignored").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let rows = parse(&bytes, ImportFormat::Xlsx).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(value(&rows[0], "Kode"), "A1");
        assert_eq!(value(&rows[0], "Stok"), "10");
        assert_eq!(value(&rows[0], "Harga Umum"), "15000.5");
        assert_eq!(rows[1].line, 4);
        assert_eq!(value(&rows[1], "Kode"), "42");
    }
}
