use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

/// Failures raised by parameter marshalling, routine invocation and row
/// reading. Construction-time errors (`UnsupportedType`, duplicate or
/// missing parameter names) surface before any call is issued; execution
/// errors are surfaced, never retried, by this layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// The native value's type has no PostgreSQL wire-type mapping.
    #[error("type `{0}` has no PostgreSQL wire type mapping")]
    UnsupportedType(String),
    #[error("a parameter named `{0}` is already present")]
    DuplicateParameter(String),
    #[error("the parameter set contains no parameter named `{0}`")]
    ParameterNotFound(String),
    /// The named parameter exists but was not declared output-capable.
    #[error("parameter `{0}` is not an output parameter")]
    NotAnOutputParameter(String),
    /// Unknown field name requested from a result row. Never cached.
    #[error("field `{0}` was not found in the data set returned by the server")]
    FieldNotFound(String),
    #[error("cannot convert {found} to {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
    #[error("could not deserialize column {index} `{name}`: {ty}")]
    Decode {
        index: usize,
        name: String,
        ty: String,
    },
    /// The database rejected or failed the routine call.
    #[error("execution of routine `{routine}` failed")]
    RoutineExecutionFailed {
        routine: String,
        #[source]
        source: tokio_postgres::Error,
    },
    /// An in-flight read, fetch or execute was cancelled cooperatively.
    #[error("the operation was cancelled")]
    Cancelled,
    /// The result source was closed; further reads fail deterministically.
    #[error("the result source is closed")]
    Closed,
    /// No current row: `read()` has not been called or returned false.
    #[error("no current row, call read() first")]
    NoRow,
    #[error(transparent)]
    Database(#[from] tokio_postgres::Error),
}
