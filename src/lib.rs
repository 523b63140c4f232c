//! Typed invocation layer for PostgreSQL stored routines.
//!
//! A [`Params`] set marshals native values with inferred or declared wire
//! types, [`Routines`] issues the call in one of the four shapes (scalar
//! function, table function, refcursor function, procedure), and
//! [`RowCursor`] reads the result rows whether they stream directly or page
//! through a server-side cursor.
//!
//! ```no_run
//! use pgcall::{Params, Routines};
//!
//! # async fn demo(client: &tokio_postgres::Client) -> pgcall::Result<()> {
//! let mut params = Params::new();
//! params.add("flight_id", 42_i32)?;
//! let routines = Routines::new(client).with_schema("ops");
//! let mut rows = routines.exec_func_rows("get_boarding_pax", &params, None).await?;
//! while rows.read(None).await? {
//!     println!("{}", rows.get_string("full_name")?);
//! }
//! # Ok(())
//! # }
//! ```

mod cursor;
mod error;
mod holder;
mod params;
mod routine;
mod source;
mod value;
mod wire;

pub use cursor::{DataTable, RowCursor};
pub use error::{DbError, Result};
pub use params::{DEFAULT_VARCHAR_SIZE, Direction, Parameter, Params};
pub use routine::{CallConfig, Routines};
pub use source::CURSOR_FETCH_SIZE;
pub use value::{AsValue, Value};
pub use wire::WireType;
