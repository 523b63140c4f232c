use crate::{
    AsValue, DbError, Result, Value,
    holder::row_to_values,
    source::RowSource,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use time::{Date, PrimitiveDateTime};
use tokio_postgres::GenericClient;
use tokio_util::sync::CancellationToken;

/// Sequential reader over one result set, independent of whether the rows
/// stream directly or page through a server-side cursor. Columns come from
/// the statement metadata, so the shape is known even for an empty result;
/// fields are addressed by name through an index map.
///
/// `read` advances to the next row; accessors address the current one.
/// Closing is idempotent and reading after close fails deterministically.
pub struct RowCursor<'a, C: GenericClient> {
    source: Option<RowSource<'a, C>>,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    current: Option<Vec<Value>>,
}

impl<'a, C: GenericClient> RowCursor<'a, C> {
    pub(crate) fn new(source: RowSource<'a, C>) -> Self {
        let columns = source.columns().map(<[String]>::to_vec).unwrap_or_default();
        let index = index_of(&columns);
        Self {
            source: Some(source),
            columns,
            index,
            current: None,
        }
    }

    /// Advance to the next row. `false` once the result set is drained; the
    /// previous row is dropped either way, including when the new one fails
    /// to decode.
    pub async fn read(&mut self, cancel: Option<&CancellationToken>) -> Result<bool> {
        let source = self.source.as_mut().ok_or(DbError::Closed)?;
        let row = source.next_row(cancel).await?;
        // A cursor source learns its columns on the first fetch, row or not.
        if self.columns.is_empty() {
            if let Some(columns) = source.columns() {
                self.columns = columns.to_vec();
                self.index = index_of(&self.columns);
            }
        }
        self.current = None;
        match row {
            Some(row) => {
                self.current = Some(row_to_values(&row)?);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop the client-side stream. A server-side cursor stays with its
    /// transaction; this never issues a CLOSE. Double close is a no-op.
    pub fn close(&mut self) {
        self.source = None;
        self.current = None;
    }

    pub fn is_closed(&self) -> bool {
        self.source.is_none()
    }

    pub fn field_count(&self) -> usize {
        self.columns.len()
    }

    pub fn field_name(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    pub fn is_field_exists(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn row(&self) -> Result<&Vec<Value>> {
        match &self.current {
            Some(row) => Ok(row),
            None if self.source.is_none() => Err(DbError::Closed),
            None => Err(DbError::NoRow),
        }
    }

    fn field_index(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| DbError::FieldNotFound(name.into()))
    }

    /// Raw value of the named field in the current row.
    pub fn get_value(&self, name: &str) -> Result<&Value> {
        let index = self.field_index(name)?;
        Ok(&self.row()?[index])
    }

    /// Raw value by position.
    pub fn get_value_at(&self, index: usize) -> Result<&Value> {
        self.row()?
            .get(index)
            .ok_or_else(|| DbError::FieldNotFound(format!("#{index}")))
    }

    pub fn is_null(&self, name: &str) -> Result<bool> {
        Ok(self.get_value(name)?.is_null())
    }

    /// Typed accessor: `None` on NULL, `TypeMismatch` when the field cannot
    /// represent `T`.
    pub fn get<T: AsValue>(&self, name: &str) -> Result<Option<T>> {
        let value = self.get_value(name)?;
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value.clone()).map(Some)
    }

    /// Typed accessor collapsing NULL to the type's zero-equivalent default.
    pub fn get_not_null<T: AsValue + Default>(&self, name: &str) -> Result<T> {
        Ok(self.get(name)?.unwrap_or_default())
    }

    pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
        self.get(name)
    }
    pub fn get_int16(&self, name: &str) -> Result<Option<i16>> {
        self.get(name)
    }
    pub fn get_int(&self, name: &str) -> Result<Option<i32>> {
        self.get(name)
    }
    pub fn get_int64(&self, name: &str) -> Result<Option<i64>> {
        self.get(name)
    }
    pub fn get_double(&self, name: &str) -> Result<Option<f64>> {
        self.get(name)
    }
    pub fn get_decimal(&self, name: &str) -> Result<Option<Decimal>> {
        self.get(name)
    }
    pub fn get_date(&self, name: &str) -> Result<Option<Date>> {
        self.get(name)
    }
    pub fn get_timestamp(&self, name: &str) -> Result<Option<PrimitiveDateTime>> {
        self.get(name)
    }
    pub fn get_list_int(&self, name: &str) -> Result<Option<Vec<i32>>> {
        self.get(name)
    }

    pub fn get_bool_not_null(&self, name: &str) -> Result<bool> {
        self.get_not_null(name)
    }
    pub fn get_int16_not_null(&self, name: &str) -> Result<i16> {
        self.get_not_null(name)
    }
    pub fn get_int_not_null(&self, name: &str) -> Result<i32> {
        self.get_not_null(name)
    }
    pub fn get_int64_not_null(&self, name: &str) -> Result<i64> {
        self.get_not_null(name)
    }
    pub fn get_double_not_null(&self, name: &str) -> Result<f64> {
        self.get_not_null(name)
    }
    pub fn get_decimal_not_null(&self, name: &str) -> Result<Decimal> {
        self.get_not_null(name)
    }

    /// Text rendition of any field. NULL renders as the empty string and a
    /// binary field as upper-case hex rather than raw bytes.
    pub fn get_string(&self, name: &str) -> Result<String> {
        Ok(self.get_value(name)?.to_text().unwrap_or_default())
    }

    /// Drain the remaining rows into `table`, skipping the named columns,
    /// then close. The cursor is closed even when a row fails to decode.
    pub async fn copy_to_table(
        &mut self,
        table: &mut DataTable,
        skip_columns: &[&str],
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        let outcome = self.copy_rows(table, skip_columns, cancel).await;
        self.close();
        outcome
    }

    async fn copy_rows(
        &mut self,
        table: &mut DataTable,
        skip_columns: &[&str],
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        let mut kept: Option<Vec<usize>> = None;
        loop {
            let more = self.read(cancel).await?;
            // Columns are created from the result metadata, so an empty
            // result still yields a table of the right shape.
            if kept.is_none() && !self.columns.is_empty() {
                let indices = (0..self.columns.len())
                    .filter(|&i| !skip_columns.contains(&self.columns[i].as_str()))
                    .collect::<Vec<_>>();
                table.columns = indices.iter().map(|&i| self.columns[i].clone()).collect();
                kept = Some(indices);
            }
            if !more {
                return Ok(());
            }
            let row = self.row()?;
            if let Some(kept) = &kept {
                table
                    .rows
                    .push(kept.iter().map(|&i| row[i].clone()).collect());
            }
        }
    }

    /// Drain the whole result set into a fresh table.
    pub async fn into_table(
        mut self,
        name: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<DataTable> {
        let mut table = DataTable::new(name);
        self.copy_to_table(&mut table, &[], cancel).await?;
        Ok(table)
    }
}

fn index_of(columns: &[String]) -> HashMap<String, usize> {
    columns
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i))
        .collect()
}

/// Fully materialized result set. Column order follows the originating
/// cursor minus any skipped columns.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl DataTable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value at `(row, column-name)`, `None` when either does not exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let column = self.column_index(column)?;
        self.rows.get(row)?.get(column)
    }
}
