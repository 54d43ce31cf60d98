use crate::shared::errors::AppResult;
use rusqlite::types::Type;
use rusqlite::Row;
use rust_decimal::Decimal;
use std::str::FromStr;

/// TEXTカラムから10進数を読み出す
pub fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// NULL許容のTEXTカラムから10進数を読み出す
pub fn optional_decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        Decimal::from_str(&t)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

/// 識別子カラムを列挙型に変換する
pub fn enum_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: fn(&str) -> AppResult<T>,
) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    parse(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// NULL許容の識別子カラムを列挙型に変換する
pub fn optional_enum_column<T>(
    row: &Row<'_>,
    idx: usize,
    parse: fn(&str) -> AppResult<T>,
) -> rusqlite::Result<Option<T>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        parse(&t)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::trips::models::TripRole;
    use rusqlite::Connection;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_columns() {
        let conn = Connection::open_in_memory().unwrap();
        let (value, missing): (Decimal, Option<Decimal>) = conn
            .query_row("SELECT '12.50', NULL", [], |row| {
                Ok((decimal_column(row, 0)?, optional_decimal_column(row, 1)?))
            })
            .unwrap();

        assert_eq!(value, dec!(12.50));
        assert_eq!(missing, None);
    }

    #[test]
    fn test_invalid_decimal_is_conversion_error() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.query_row("SELECT 'abc'", [], |row| decimal_column(row, 0));
        assert!(matches!(
            result,
            Err(rusqlite::Error::FromSqlConversionFailure(0, Type::Text, _))
        ));
    }

    #[test]
    fn test_enum_columns() {
        let conn = Connection::open_in_memory().unwrap();
        let role: Option<TripRole> = conn
            .query_row("SELECT 'docente'", [], |row| {
                optional_enum_column(row, 0, TripRole::parse)
            })
            .unwrap();
        assert_eq!(role, Some(TripRole::Docente));

        let invalid = conn.query_row("SELECT 'studente'", [], |row| {
            enum_column(row, 0, TripRole::parse)
        });
        assert!(invalid.is_err());
    }
}
