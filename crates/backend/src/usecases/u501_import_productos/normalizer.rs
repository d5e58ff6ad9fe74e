use contracts::domain::a001_productos_vender::{Columns, ProductoVender};

use super::errors::ImportError;
use super::excel_reader::{CellValue, RawRow};

/// Преобразует строку листа в запись каталога.
///
/// `index` - позиция строки (с 0), используется как номер позиции, если колонка
/// "Ítems" пуста. Строка без кода возвращается как `Ok(None)`.
/// Нечитаемое число в любой колонке - ошибка всего импорта.
pub fn normalize(row: &RawRow, index: usize) -> Result<Option<ProductoVender>, ImportError> {
    let line = index + 1;
    let number = |column: &'static str| sanitize_number(row.get(column), column, line);

    let transport_column = if row.contains(Columns::TRANSPORT) {
        Columns::TRANSPORT
    } else {
        Columns::TRANSPORT_ALT
    };

    let item_number = match number(Columns::ITEM)? {
        n if n == 0.0 => line as i32,
        n => n.trunc() as i32,
    };

    let record = ProductoVender {
        item_number,
        codigo: sanitize_text(row.get(Columns::CODE)),
        municipio: sanitize_text(row.get(Columns::CITY)),
        categoria: sanitize_text(row.get(Columns::CATEGORY)),
        producto: sanitize_text(row.get(Columns::PRODUCT)),
        presentacion: sanitize_text(row.get(Columns::PRESENTATION)),
        costo_pcc: number(Columns::COST)?,
        porcentaje_logistica: number(Columns::LOGISTICS)?,
        porcentaje_transporte: number(transport_column)?,
        precio_sugerido: number(Columns::SUGGESTED)?,
        precio_venta: number(Columns::SALE)?,
    };

    if record.codigo.is_empty() {
        return Ok(None);
    }
    Ok(Some(record))
}

/// Нормализует все строки по порядку; первая ошибка прерывает обработку
pub fn normalize_all(rows: &[RawRow]) -> Result<Vec<ProductoVender>, ImportError> {
    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        if let Some(record) = normalize(row, index)? {
            records.push(record);
        }
    }
    Ok(records)
}

fn sanitize_text(value: Option<&CellValue>) -> String {
    match value {
        None => String::new(),
        Some(CellValue::Text(s)) => s.trim().to_string(),
        Some(CellValue::Number(n)) => n.to_string(),
        Some(CellValue::Bool(b)) => b.to_string(),
    }
}

fn sanitize_number(
    value: Option<&CellValue>,
    column: &'static str,
    row: usize,
) -> Result<f64, ImportError> {
    let malformed = |raw: String| ImportError::MalformedNumber {
        column,
        row,
        value: raw,
    };

    match value {
        None => Ok(0.0),
        Some(CellValue::Number(n)) => Ok(*n),
        // в "true"/"false" нет цифр
        Some(CellValue::Bool(_)) => Ok(0.0),
        Some(CellValue::Text(s)) if s.trim().is_empty() => Ok(0.0),
        Some(CellValue::Text(s)) => parse_formatted(s).ok_or_else(|| malformed(s.clone())),
    }
}

/// Разбирает число из строки вида "$ 5.000", "1.234,56", "12.5", "-3".
///
/// Отбрасываются все символы, кроме цифр, '.', ',' и '-'.
/// Если встречаются оба разделителя, десятичным считается последний.
/// Одиночная ',' - десятичная; повторяющиеся - разделители тысяч.
/// Точки считаются разделителями тысяч, только если после каждой идёт ровно
/// три цифры ("5.000", "1.234.567"), иначе точка десятичная ("12.5").
pub fn parse_formatted(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();

    let canonical = match (cleaned.rfind('.'), cleaned.rfind(',')) {
        (Some(dot), Some(comma)) => {
            let (thousands, decimal) = if comma > dot { ('.', ',') } else { (',', '.') };
            cleaned.replace(thousands, "").replace(decimal, ".")
        }
        (None, Some(_)) if cleaned.matches(',').count() > 1 => cleaned.replace(',', ""),
        (None, Some(_)) => cleaned.replace(',', "."),
        (Some(_), None) if is_thousands_grouped(&cleaned) => cleaned.replace('.', ""),
        _ => cleaned,
    };

    canonical.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn is_thousands_grouped(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut groups = digits.split('.');
    let head = groups.next().unwrap_or_default();
    let head_ok = (1..=3).contains(&head.len()) && !head.starts_with('0');
    head_ok && groups.all(|g| g.len() == 3 && g.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_scenario_papa_row() {
        let row: RawRow = [
            (Columns::CODE, text("A1")),
            (Columns::PRODUCT, text("Papa")),
            (Columns::SALE, text("5.000")),
        ]
        .into_iter()
        .collect();

        let record = normalize(&row, 0).unwrap().unwrap();
        let mut expected = ProductoVender::with_codigo(1, "A1");
        expected.producto = "Papa".into();
        expected.precio_venta = 5000.0;
        assert_eq!(record, expected);
    }

    #[test]
    fn test_row_without_codigo_is_dropped() {
        let row: RawRow = [(Columns::CODE, text("")), (Columns::PRODUCT, text("Cebolla"))]
            .into_iter()
            .collect();
        assert_eq!(normalize(&row, 4).unwrap(), None);

        let blank: RawRow = [(Columns::CODE, text("   ")), (Columns::PRODUCT, text("Cebolla"))]
            .into_iter()
            .collect();
        assert_eq!(normalize(&blank, 5).unwrap(), None);
    }

    #[test]
    fn test_text_is_trimmed_and_numbers_are_stringified() {
        let row: RawRow = [
            (Columns::CODE, CellValue::Number(1001.0)),
            (Columns::CITY, text("  Tunja ")),
            (Columns::PRESENTATION, text("Bulto 50kg\n")),
        ]
        .into_iter()
        .collect();

        let record = normalize(&row, 0).unwrap().unwrap();
        assert_eq!(record.codigo, "1001");
        assert_eq!(record.municipio, "Tunja");
        assert_eq!(record.presentacion, "Bulto 50kg");
        assert_eq!(record.categoria, "");
    }

    #[test]
    fn test_item_number_from_column_or_position() {
        let with_item: RawRow = [(Columns::CODE, text("A")), (Columns::ITEM, CellValue::Number(42.0))]
            .into_iter()
            .collect();
        let zero_item: RawRow = [(Columns::CODE, text("A")), (Columns::ITEM, CellValue::Number(0.0))]
            .into_iter()
            .collect();
        let no_item: RawRow = [(Columns::CODE, text("A"))].into_iter().collect();

        assert_eq!(normalize(&with_item, 9).unwrap().unwrap().item_number, 42);
        assert_eq!(normalize(&zero_item, 9).unwrap().unwrap().item_number, 10);
        assert_eq!(normalize(&no_item, 2).unwrap().unwrap().item_number, 3);
    }

    #[test]
    fn test_transport_alias_used_only_when_primary_missing() {
        let alias_only: RawRow = [(Columns::CODE, text("A")), (Columns::TRANSPORT_ALT, CellValue::Number(0.05))]
            .into_iter()
            .collect();
        let both: RawRow = [
            (Columns::CODE, text("A")),
            (Columns::TRANSPORT, CellValue::Number(0.1)),
            (Columns::TRANSPORT_ALT, CellValue::Number(0.05)),
        ]
        .into_iter()
        .collect();

        assert_eq!(normalize(&alias_only, 0).unwrap().unwrap().porcentaje_transporte, 0.05);
        assert_eq!(normalize(&both, 0).unwrap().unwrap().porcentaje_transporte, 0.1);
    }

    #[test]
    fn test_numeric_inputs_that_never_fail() {
        assert_eq!(sanitize_number(None, Columns::COST, 1).unwrap(), 0.0);
        assert_eq!(sanitize_number(Some(&text("")), Columns::COST, 1).unwrap(), 0.0);
        assert_eq!(sanitize_number(Some(&text("  ")), Columns::COST, 1).unwrap(), 0.0);
        assert_eq!(sanitize_number(Some(&CellValue::Number(0.0)), Columns::COST, 1).unwrap(), 0.0);
        assert_eq!(sanitize_number(Some(&CellValue::Number(12.75)), Columns::COST, 1).unwrap(), 12.75);
        assert_eq!(sanitize_number(Some(&CellValue::Bool(true)), Columns::COST, 1).unwrap(), 0.0);
        assert_eq!(sanitize_number(Some(&text("1.234,56")), Columns::COST, 1).unwrap(), 1234.56);
        assert_eq!(sanitize_number(Some(&text("$ 5.000")), Columns::COST, 1).unwrap(), 5000.0);
    }

    #[test]
    fn test_malformed_number_carries_raw_value() {
        let row: RawRow = [(Columns::CODE, text("A1")), (Columns::COST, text("abc"))]
            .into_iter()
            .collect();

        match normalize(&row, 6) {
            Err(ImportError::MalformedNumber { column, row, value }) => {
                assert_eq!(column, Columns::COST);
                assert_eq!(row, 7);
                assert_eq!(value, "abc");
            }
            other => panic!("expected MalformedNumber, got {:?}", other),
        }
    }

    #[test]
    fn test_normalize_all_stops_at_first_malformed_row() {
        let rows: Vec<RawRow> = vec![
            [(Columns::CODE, text("A1"))].into_iter().collect(),
            [(Columns::CODE, text("A2")), (Columns::SALE, text("n/a"))]
                .into_iter()
                .collect(),
        ];
        assert!(matches!(
            normalize_all(&rows),
            Err(ImportError::MalformedNumber { row: 2, .. })
        ));
    }

    #[test]
    fn test_parse_formatted() {
        assert_eq!(parse_formatted("5.000"), Some(5000.0));
        assert_eq!(parse_formatted("1.234.567"), Some(1234567.0));
        assert_eq!(parse_formatted("12.5"), Some(12.5));
        assert_eq!(parse_formatted("0.125"), Some(0.125));
        assert_eq!(parse_formatted("1,5"), Some(1.5));
        assert_eq!(parse_formatted("1,234,567"), Some(1234567.0));
        assert_eq!(parse_formatted("1,234.5"), Some(1234.5));
        assert_eq!(parse_formatted("-3"), Some(-3.0));
        assert_eq!(parse_formatted("COP 12.000 c/u"), Some(12000.0));
        assert_eq!(parse_formatted("abc"), None);
        assert_eq!(parse_formatted("1-2"), None);
        assert_eq!(parse_formatted("-"), None);
    }
}
