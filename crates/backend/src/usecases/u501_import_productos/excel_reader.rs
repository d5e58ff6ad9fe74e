use calamine::{open_workbook_auto, Data, Range, Reader};
use std::collections::HashMap;
use std::path::Path;

use super::errors::ImportError;

/// Значение непустой ячейки
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

/// Строка листа: заголовок колонки -> значение.
/// Пустые ячейки в строку не попадают.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: HashMap<String, CellValue>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, header: impl Into<String>, value: CellValue) {
        self.cells.insert(header.into(), value);
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.cells.get(header)
    }

    pub fn contains(&self, header: &str) -> bool {
        self.cells.contains_key(header)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (header, value) in iter {
            row.insert(header, value);
        }
        row
    }
}

/// Читает первый лист книги. Первая строка диапазона - заголовки.
/// Полностью пустые строки пропускаются.
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>, ImportError> {
    if !path.is_file() {
        return Err(ImportError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut workbook = open_workbook_auto(path)?;
    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range?,
        None => {
            tracing::warn!("Workbook {} has no sheets", path.display());
            return Ok(Vec::new());
        }
    };

    Ok(rows_from_range(&range))
}

fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let mut rows = range.rows();
    let headers: Vec<Option<String>> = match rows.next() {
        Some(header_row) => header_row.iter().map(header_label).collect(),
        None => return Vec::new(),
    };

    rows.filter_map(|cells| {
        let row: RawRow = headers
            .iter()
            .zip(cells)
            .filter_map(|(header, cell)| Some((header.as_ref()?.clone(), cell_value(cell)?)))
            .collect();
        (!row.is_empty()).then_some(row)
    })
    .collect()
}

fn header_label(cell: &Data) -> Option<String> {
    let label = match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        _ => return None,
    };
    (!label.is_empty()).then_some(label)
}

fn cell_value(cell: &Data) -> Option<CellValue> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(CellValue::Text(s.clone())),
        // Даты отдаём серийным номером Excel, как обычное число
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
    }
}
