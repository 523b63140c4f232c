use crate::{
    AsValue, DbError, Params, Result, Value,
    cursor::{DataTable, RowCursor},
    holder::ValueHolder,
    source::{CURSOR_FETCH_SIZE, CursorSource, DirectSource, RowSource, cancellable},
};
use futures::StreamExt;
use postgres_types::Type;
use rust_decimal::Decimal;
use std::pin::pin;
use time::PrimitiveDateTime;
use tokio_postgres::{GenericClient, RowStream};
use tokio_util::sync::CancellationToken;

/// Per-invoker tuning, passed explicitly instead of living in process-wide
/// state.
#[derive(Debug, Clone, Copy)]
pub struct CallConfig {
    /// Rows per FETCH round trip when draining refcursor results.
    pub cursor_fetch_size: u32,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            cursor_fetch_size: CURSOR_FETCH_SIZE,
        }
    }
}

/// Invoker for stored functions and procedures over one client. Works on a
/// plain connection or inside a transaction; refcursor calls require the
/// latter since the server cursor lives in the surrounding transaction.
pub struct Routines<'c, C: GenericClient> {
    client: &'c C,
    schema: Option<String>,
    config: CallConfig,
}

impl<'c, C: GenericClient> Routines<'c, C> {
    pub fn new(client: &'c C) -> Self {
        Self {
            client,
            schema: None,
            config: CallConfig::default(),
        }
    }

    /// Default schema to qualify routine names with.
    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_config(mut self, config: CallConfig) -> Self {
        self.config = config;
        self
    }

    fn qualified(&self, routine: &str) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{routine}"),
            None => routine.into(),
        }
    }

    /// Scalar-function shape. `None` when the function returns no row, a
    /// NULL, or a value that does not convert to `T`; never an error for a
    /// shape mismatch.
    pub async fn exec_func<T: AsValue>(
        &self,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<T>> {
        let routine = self.qualified(routine);
        let sql = function_select_sql(&routine, params, false);
        let (stream, _) = self.query_routine(&sql, &routine, params, cancel).await?;
        let mut stream = pin!(stream);
        let Some(row) = cancellable(cancel, stream.next()).await?.transpose()? else {
            return Ok(None);
        };
        let value = row
            .try_get::<_, ValueHolder>(0)
            .map(|v| v.0)
            .unwrap_or(Value::Null);
        if value.is_null() {
            return Ok(None);
        }
        Ok(T::try_from_value(value).ok())
    }

    pub async fn exec_func_int(
        &self,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<i32>> {
        self.exec_func(routine, params, cancel).await
    }

    pub async fn exec_func_bigint(
        &self,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<i64>> {
        self.exec_func(routine, params, cancel).await
    }

    pub async fn exec_func_double(
        &self,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<f64>> {
        self.exec_func(routine, params, cancel).await
    }

    pub async fn exec_func_decimal(
        &self,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<Decimal>> {
        self.exec_func(routine, params, cancel).await
    }

    pub async fn exec_func_timestamp(
        &self,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<PrimitiveDateTime>> {
        self.exec_func(routine, params, cancel).await
    }

    pub async fn exec_func_varchar(
        &self,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<String>> {
        self.exec_func(routine, params, cancel).await
    }

    pub async fn exec_func_text(
        &self,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<String>> {
        self.exec_func(routine, params, cancel).await
    }

    pub async fn exec_func_bytea(
        &self,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<Vec<u8>>> {
        self.exec_func(routine, params, cancel).await
    }

    /// Table/SETOF shape: the function's rows stream directly.
    pub async fn exec_func_rows(
        &self,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<RowCursor<'c, C>> {
        let routine = self.qualified(routine);
        let sql = function_select_sql(&routine, params, true);
        let (stream, columns) = self.query_routine(&sql, &routine, params, cancel).await?;
        Ok(RowCursor::new(RowSource::Direct(DirectSource::new(
            stream, columns,
        ))))
    }

    /// Refcursor shape: the function returns the name of a server cursor
    /// opened in the current transaction; rows are then paged with FETCH.
    pub async fn exec_func_cursor(
        &self,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<RowCursor<'c, C>> {
        let name = self
            .exec_func::<String>(routine, params, cancel)
            .await?
            .ok_or(DbError::NoRow)?;
        Ok(RowCursor::new(RowSource::Cursor(CursorSource::new(
            self.client,
            name,
            self.config.cursor_fetch_size,
        ))))
    }

    /// Table shape drained into a fully materialized [`DataTable`] named
    /// after the routine.
    pub async fn exec_func_table(
        &self,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<DataTable> {
        let name = self.qualified(routine);
        let cursor = self.exec_func_rows(routine, params, cancel).await?;
        cursor.into_table(&name, cancel).await
    }

    /// Procedure shape. When the parameter set holds output-capable
    /// parameters the single row the server returns for them is copied
    /// back into `params`, in declaration order, for `out_param` read-back.
    pub async fn call_proc(
        &self,
        routine: &str,
        params: &mut Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        let routine = self.qualified(routine);
        let sql = procedure_call_sql(&routine, params);
        if !params.has_outputs() {
            self.execute_routine(&sql, &routine, params, cancel).await?;
            return Ok(());
        }
        let (stream, _) = self.query_routine(&sql, &routine, params, cancel).await?;
        let mut stream = pin!(stream);
        if let Some(row) = cancellable(cancel, stream.next()).await?.transpose()? {
            let values = crate::holder::row_to_values(&row)?;
            for (param, value) in params.output_params_mut().zip(values) {
                param.set_value(value);
            }
        }
        Ok(())
    }

    /// Ad-hoc parameterized query, read through the same row facade as the
    /// routine shapes.
    pub async fn query_rows(
        &self,
        sql: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<RowCursor<'c, C>> {
        log::debug!("Running query: {sql}");
        let statement = cancellable(
            cancel,
            self.client.prepare_typed(sql, &param_types(params)),
        )
        .await??;
        let columns = column_names(&statement);
        let stream = cancellable(
            cancel,
            self.client.query_raw(&statement, param_values(params)),
        )
        .await??;
        Ok(RowCursor::new(RowSource::Direct(DirectSource::new(
            stream, columns,
        ))))
    }

    /// Ad-hoc parameterized non-query. Returns the affected row count.
    pub async fn execute(
        &self,
        sql: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<u64> {
        log::debug!("Executing: {sql}");
        let statement = cancellable(
            cancel,
            self.client.prepare_typed(sql, &param_types(params)),
        )
        .await??;
        let affected = cancellable(
            cancel,
            self.client.execute_raw(&statement, param_values(params)),
        )
        .await??;
        Ok(affected)
    }

    async fn query_routine(
        &self,
        sql: &str,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<(RowStream, Vec<String>)> {
        log::debug!("Calling routine: {sql}");
        let statement = cancellable(
            cancel,
            self.client.prepare_typed(sql, &param_types(params)),
        )
        .await?
        .map_err(|source| routine_failed(routine, source))?;
        let columns = column_names(&statement);
        let stream = cancellable(
            cancel,
            self.client.query_raw(&statement, param_values(params)),
        )
        .await?
        .map_err(|source| routine_failed(routine, source))?;
        Ok((stream, columns))
    }

    async fn execute_routine(
        &self,
        sql: &str,
        routine: &str,
        params: &Params,
        cancel: Option<&CancellationToken>,
    ) -> Result<u64> {
        log::debug!("Calling routine: {sql}");
        let statement = cancellable(
            cancel,
            self.client.prepare_typed(sql, &param_types(params)),
        )
        .await?
        .map_err(|source| routine_failed(routine, source))?;
        cancellable(
            cancel,
            self.client.execute_raw(&statement, param_values(params)),
        )
        .await?
        .map_err(|source| routine_failed(routine, source))
    }
}

fn routine_failed(routine: &str, source: tokio_postgres::Error) -> DbError {
    log::error!("Execution of routine `{routine}` failed: {source:?}");
    DbError::RoutineExecutionFailed {
        routine: routine.into(),
        source,
    }
}

fn column_names(statement: &tokio_postgres::Statement) -> Vec<String> {
    statement
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect()
}

fn param_types(params: &Params) -> Vec<Type> {
    params.iter().map(|p| p.wire_type().to_pg_type()).collect()
}

fn param_values(params: &Params) -> Vec<ValueHolder> {
    params
        .iter()
        .map(|p| ValueHolder(p.value().clone()))
        .collect()
}

fn placeholders(count: usize) -> String {
    (1..=count)
        .map(|i| format!("${i}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn function_select_sql(routine: &str, params: &Params, expand: bool) -> String {
    let source = if expand { "SELECT * FROM" } else { "SELECT" };
    format!("{source} {routine}({})", placeholders(params.len()))
}

fn procedure_call_sql(routine: &str, params: &Params) -> String {
    format!("CALL {routine}({})", placeholders(params.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(count: usize) -> Params {
        let mut params = Params::new();
        for i in 0..count {
            params.add(&format!("p{i}"), i as i32).unwrap();
        }
        params
    }

    #[test]
    fn scalar_select_text() {
        assert_eq!(
            function_select_sql("flight.approve_flight", &params(2), false),
            "SELECT flight.approve_flight($1,$2)"
        );
        assert_eq!(function_select_sql("now_utc", &params(0), false), "SELECT now_utc()");
    }

    #[test]
    fn table_select_text() {
        assert_eq!(
            function_select_sql("flight.get_boarding_pax", &params(3), true),
            "SELECT * FROM flight.get_boarding_pax($1,$2,$3)"
        );
    }

    #[test]
    fn procedure_call_text() {
        assert_eq!(
            procedure_call_sql("ops.update_status", &params(1)),
            "CALL ops.update_status($1)"
        );
        assert_eq!(procedure_call_sql("ops.tick", &params(0)), "CALL ops.tick()");
    }
}
