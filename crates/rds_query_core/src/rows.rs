use serde::Serialize;

use crate::error::RowScanError;

/// Driver-neutral column value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl SqlValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Int(_) => "integer",
            Self::UInt(_) => "unsigned integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
        }
    }
}

/// Positional column values of one result row.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlRow(pub Vec<SqlValue>);

impl SqlRow {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A typed record decoded from a row's columns in declared order.
pub trait QueryRecord: Sized + Serialize {
    const COLUMNS: &'static [&'static str];

    fn from_row(row: SqlRow) -> Result<Self, RowScanError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Price")]
    pub price: i64,
}

impl QueryRecord for Book {
    const COLUMNS: &'static [&'static str] = &["id", "name", "price"];

    fn from_row(row: SqlRow) -> Result<Self, RowScanError> {
        let [id, name, price] = expect_columns::<3>(row)?;
        Ok(Self {
            id: scan_i64(id, 0, Self::COLUMNS[0])?,
            name: scan_string(name, 1, Self::COLUMNS[1])?,
            price: scan_i64(price, 2, Self::COLUMNS[2])?,
        })
    }
}

pub fn expect_columns<const N: usize>(row: SqlRow) -> Result<[SqlValue; N], RowScanError> {
    let actual = row.len();
    <[SqlValue; N]>::try_from(row.0).map_err(|_| RowScanError::ColumnCount {
        expected: N,
        actual,
    })
}

pub fn scan_i64(value: SqlValue, index: usize, column: &'static str) -> Result<i64, RowScanError> {
    match value {
        SqlValue::Int(value) => Ok(value),
        SqlValue::UInt(value) => i64::try_from(value).map_err(|_| RowScanError::OutOfRange {
            index,
            column,
            value: value.to_string(),
            target: "i64",
        }),
        SqlValue::Text(text) => parse_decimal(&text, index, column),
        SqlValue::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(text) => parse_decimal(&text, index, column),
            Err(_) => Err(conversion(index, column, "bytes", "i64")),
        },
        other => Err(conversion(index, column, other.type_name(), "i64")),
    }
}

pub fn scan_string(
    value: SqlValue,
    index: usize,
    column: &'static str,
) -> Result<String, RowScanError> {
    match value {
        SqlValue::Text(text) => Ok(text),
        SqlValue::Bytes(bytes) => {
            String::from_utf8(bytes).map_err(|_| conversion(index, column, "bytes", "string"))
        }
        SqlValue::Int(value) => Ok(value.to_string()),
        SqlValue::UInt(value) => Ok(value.to_string()),
        SqlValue::Float(value) => Ok(value.to_string()),
        SqlValue::Null => Err(conversion(index, column, "NULL", "string")),
    }
}

fn parse_decimal(text: &str, index: usize, column: &'static str) -> Result<i64, RowScanError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| RowScanError::OutOfRange {
            index,
            column,
            value: text.to_string(),
            target: "i64",
        })
}

fn conversion(
    index: usize,
    column: &'static str,
    found: &'static str,
    target: &'static str,
) -> RowScanError {
    RowScanError::Conversion {
        index,
        column,
        found,
        target,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_row(id: SqlValue, name: SqlValue, price: SqlValue) -> SqlRow {
        SqlRow(vec![id, name, price])
    }

    #[test]
    fn decodes_book_fields_in_declared_order() {
        let book = Book::from_row(book_row(
            SqlValue::Int(1),
            SqlValue::Text("Go".to_string()),
            SqlValue::Int(1000),
        ))
        .expect("row should decode");

        assert_eq!(
            book,
            Book {
                id: 1,
                name: "Go".to_string(),
                price: 1000,
            }
        );
    }

    #[test]
    fn book_serializes_with_capitalized_keys_in_field_order() {
        let book = Book {
            id: 2,
            name: "Rust".to_string(),
            price: 1200,
        };

        assert_eq!(
            serde_json::to_string(&book).expect("book should serialize"),
            r#"{"Id":2,"Name":"Rust","Price":1200}"#
        );
    }

    #[test]
    fn accepts_driver_text_and_unsigned_forms() {
        let book = Book::from_row(book_row(
            SqlValue::UInt(7),
            SqlValue::Bytes(b"Zig".to_vec()),
            SqlValue::Text("1500".to_string()),
        ))
        .expect("row should decode");

        assert_eq!(book.id, 7);
        assert_eq!(book.name, "Zig");
        assert_eq!(book.price, 1500);
    }

    #[test]
    fn decimal_and_temporal_text_scan_into_record_fields() {
        let book = Book::from_row(book_row(
            SqlValue::Int(4),
            SqlValue::Text("2024-05-01 10:30:00".to_string()),
            SqlValue::Text("1000".to_string()),
        ))
        .expect("DECIMAL and DATETIME text should decode");

        assert_eq!(book.name, "2024-05-01 10:30:00");
        assert_eq!(book.price, 1000);

        let error = scan_i64(SqlValue::Text("10.50".to_string()), 2, "price")
            .expect_err("fractional decimal does not fit an integer");
        assert!(matches!(error, RowScanError::OutOfRange { index: 2, .. }));
    }

    #[test]
    fn wrong_column_count_is_a_scan_error() {
        let error = Book::from_row(SqlRow(vec![SqlValue::Int(1), SqlValue::Text("Go".into())]))
            .expect_err("two columns should fail");

        assert_eq!(
            error,
            RowScanError::ColumnCount {
                expected: 3,
                actual: 2,
            }
        );
    }

    #[test]
    fn null_and_non_numeric_values_are_scan_errors() {
        let error = Book::from_row(book_row(
            SqlValue::Null,
            SqlValue::Text("Go".into()),
            SqlValue::Int(1),
        ))
        .expect_err("NULL id should fail");
        assert!(matches!(error, RowScanError::Conversion { index: 0, .. }));

        let error = Book::from_row(book_row(
            SqlValue::Int(1),
            SqlValue::Text("Go".into()),
            SqlValue::Text("cheap".into()),
        ))
        .expect_err("non-numeric price should fail");
        assert!(matches!(
            error,
            RowScanError::OutOfRange {
                index: 2,
                column: "price",
                ..
            }
        ));
    }

    #[test]
    fn unsigned_overflow_is_out_of_range() {
        let error = scan_i64(SqlValue::UInt(u64::MAX), 0, "id").expect_err("should overflow");
        assert!(matches!(error, RowScanError::OutOfRange { .. }));
    }
}
