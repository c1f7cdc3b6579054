//! Column type inference.
//!
//! Each column ends up in exactly one [`ColumnKind`]. Text columns get one
//! all-or-nothing attempt at becoming `Datetime`: a single value that does not
//! parse keeps the whole column categorical.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::model::{CellValue, Column, ColumnKind, Table};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Parse a single date or date/time string. Offsets are normalised to UTC.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Attempt to read every present value of a text column as a timestamp.
///
/// Returns `None` as soon as one value fails; missing cells stay missing.
fn try_datetime_column(values: &[CellValue]) -> Option<Vec<CellValue>> {
    values
        .iter()
        .map(|v| match v {
            CellValue::Null => Some(CellValue::Null),
            CellValue::DateTime(d) => Some(CellValue::DateTime(*d)),
            CellValue::Text(s) => parse_datetime(s).map(CellValue::DateTime),
            _ => None,
        })
        .collect()
}

/// Decide the kind of one column, converting its cells when it becomes datetime.
pub fn classify_column(column: &mut Column) {
    let present = || column.values.iter().filter(|v| !v.is_null());

    let kind = if present().all(CellValue::is_numeric) {
        ColumnKind::Numeric
    } else if present().all(|v| matches!(v, CellValue::DateTime(_))) {
        ColumnKind::Datetime
    } else if present().any(|v| matches!(v, CellValue::Text(_))) {
        match try_datetime_column(&column.values) {
            Some(converted) => {
                column.values = converted;
                ColumnKind::Datetime
            }
            None => ColumnKind::Categorical,
        }
    } else {
        ColumnKind::Categorical
    };
    column.kind = kind;
}

/// Classify every column of a freshly loaded table.
pub fn infer_types(mut table: Table) -> Table {
    for column in table.columns_mut() {
        classify_column(column);
        log::debug!("column '{}' classified as {}", column.name, column.kind);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn parses_common_formats() {
        assert_eq!(parse_datetime("2023-01-02"), Some(date(2023, 1, 2)));
        assert_eq!(parse_datetime("2023/01/02"), Some(date(2023, 1, 2)));
        assert_eq!(parse_datetime("01/02/2023"), Some(date(2023, 1, 2)));
        assert_eq!(parse_datetime("02.01.2023"), Some(date(2023, 1, 2)));
        let day = date(2023, 1, 2).date();
        assert_eq!(parse_datetime("2023-01-02T03:04:05"), day.and_hms_opt(3, 4, 5));
        assert_eq!(
            parse_datetime("2023-01-02 03:04:05.250"),
            day.and_hms_milli_opt(3, 4, 5, 250)
        );
        // Offsets are normalised to UTC.
        assert_eq!(
            parse_datetime("2023-01-02T03:04:05+02:00"),
            day.and_hms_opt(1, 4, 5)
        );
        assert_eq!(parse_datetime("next tuesday"), None);
        assert_eq!(parse_datetime("2023-13-01"), None);
    }

    #[test]
    fn all_parsable_text_becomes_datetime() {
        let mut col = Column::new(
            "d",
            vec![text("2023-01-01"), CellValue::Null, text("2023-01-03")],
        );
        classify_column(&mut col);
        assert_eq!(col.kind, ColumnKind::Datetime);
        assert_eq!(
            col.values,
            vec![
                CellValue::DateTime(date(2023, 1, 1)),
                CellValue::Null,
                CellValue::DateTime(date(2023, 1, 3)),
            ]
        );
    }

    #[test]
    fn one_bad_value_keeps_column_categorical() {
        let original = vec![text("2023-01-01"), text("soon"), text("2023-01-03")];
        let mut col = Column::new("d", original.clone());
        classify_column(&mut col);
        assert_eq!(col.kind, ColumnKind::Categorical);
        assert_eq!(col.values, original);
    }

    #[test]
    fn numbers_mixed_with_dates_stay_categorical() {
        let mut col = Column::new("d", vec![text("2023-01-01"), CellValue::Integer(5)]);
        classify_column(&mut col);
        assert_eq!(col.kind, ColumnKind::Categorical);
    }

    #[test]
    fn numeric_and_other_columns() {
        let mut nums = Column::new(
            "n",
            vec![CellValue::Integer(1), CellValue::Float(2.5), CellValue::Null],
        );
        classify_column(&mut nums);
        assert_eq!(nums.kind, ColumnKind::Numeric);

        let mut flags = Column::new("b", vec![CellValue::Bool(true), CellValue::Bool(false)]);
        classify_column(&mut flags);
        assert_eq!(flags.kind, ColumnKind::Categorical);

        let mut empty = Column::new("e", vec![CellValue::Null, CellValue::Null]);
        classify_column(&mut empty);
        assert_eq!(empty.kind, ColumnKind::Numeric);
    }
}
