use crate::{DbError, Result};
use futures::{
    StreamExt,
    stream::Fuse,
};
use std::{collections::VecDeque, pin::Pin};
use tokio_postgres::{GenericClient, Row, RowStream, Statement};
use tokio_util::sync::CancellationToken;

/// Rows fetched per server round trip when draining a refcursor.
pub const CURSOR_FETCH_SIZE: u32 = 100;

/// Run a future under an optional cancellation token. Cancellation wins
/// over a simultaneously ready result.
pub(crate) async fn cancellable<T>(
    cancel: Option<&CancellationToken>,
    fut: impl Future<Output = T>,
) -> Result<T> {
    match cancel {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(DbError::Cancelled),
                v = fut => Ok(v),
            }
        }
        None => Ok(fut.await),
    }
}

/// Where the rows of one result set come from. Both variants produce rows
/// one at a time through [`RowSource::next_row`] and hide whether the
/// server streams them directly or pages them through a named cursor.
pub(crate) enum RowSource<'a, C: GenericClient> {
    Direct(DirectSource),
    Cursor(CursorSource<'a, C>),
}

impl<'a, C: GenericClient> RowSource<'a, C> {
    pub(crate) async fn next_row(
        &mut self,
        cancel: Option<&CancellationToken>,
    ) -> Result<Option<Row>> {
        match self {
            RowSource::Direct(source) => source.next_row(cancel).await,
            RowSource::Cursor(source) => source.next_row(cancel).await,
        }
    }

    /// Column names of the result set. Known up front for a direct source,
    /// and from the first fetch onwards for a cursor source, even when that
    /// fetch carries no rows.
    pub(crate) fn columns(&self) -> Option<&[String]> {
        match self {
            RowSource::Direct(source) => Some(&source.columns),
            RowSource::Cursor(source) => source.columns.as_deref(),
        }
    }
}

/// Streams the rows of an already executed statement as the server sends
/// them. Fused so reading past the end stays `None` instead of polling a
/// finished driver stream.
pub(crate) struct DirectSource {
    stream: Pin<Box<Fuse<RowStream>>>,
    columns: Vec<String>,
}

impl DirectSource {
    pub(crate) fn new(stream: RowStream, columns: Vec<String>) -> Self {
        Self {
            stream: Box::pin(stream.fuse()),
            columns,
        }
    }

    async fn next_row(&mut self, cancel: Option<&CancellationToken>) -> Result<Option<Row>> {
        let row = cancellable(cancel, self.stream.next()).await?;
        Ok(row.transpose()?)
    }
}

/// Drains a server-side named cursor in fixed-size batches. The cursor must
/// have been opened inside the transaction the client is currently in; it
/// is released with that transaction, not by this reader.
pub(crate) struct CursorSource<'a, C: GenericClient> {
    client: &'a C,
    name: String,
    fetch_size: u32,
    statement: Option<Statement>,
    columns: Option<Vec<String>>,
    buffer: VecDeque<Row>,
    exhausted: bool,
}

impl<'a, C: GenericClient> CursorSource<'a, C> {
    pub(crate) fn new(client: &'a C, name: String, fetch_size: u32) -> Self {
        Self {
            client,
            name,
            fetch_size: fetch_size.max(1),
            statement: None,
            columns: None,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    async fn next_row(&mut self, cancel: Option<&CancellationToken>) -> Result<Option<Row>> {
        if self.buffer.is_empty() && !self.exhausted {
            self.fetch(cancel).await?;
        }
        Ok(self.buffer.pop_front())
    }

    async fn fetch(&mut self, cancel: Option<&CancellationToken>) -> Result<()> {
        let statement = match self.statement.take() {
            Some(statement) => statement,
            None => {
                // The cursor name comes from the server, quoted here verbatim.
                let sql = format!("FETCH FORWARD {} IN \"{}\"", self.fetch_size, self.name);
                let statement = cancellable(cancel, self.client.prepare(&sql)).await??;
                self.columns = Some(
                    statement
                        .columns()
                        .iter()
                        .map(|c| c.name().to_string())
                        .collect(),
                );
                statement
            }
        };
        log::debug!("Fetching up to {} rows from cursor `{}`", self.fetch_size, self.name);
        let rows = cancellable(cancel, self.client.query(&statement, &[])).await??;
        self.statement = Some(statement);
        // A short batch means the cursor has no more rows; latch so no
        // further FETCH is issued.
        if (rows.len() as u32) < self.fetch_size {
            self.exhausted = true;
        }
        self.buffer.extend(rows);
        Ok(())
    }
}
