//! Planning of paginated connection requests.
//!
//! A connection field first reads which facets (`totalCount`, `edges`, `pageInfo`) the request
//! selected, then turns them together with the pagination arguments into a [`ConnectionPlan`].
//! Only page plans carry a cursor position; a count-only plan is answered by a plain count query.

mod cursor;
mod error;
mod plan;
mod selection;
mod window;

pub use cursor::{ConnectionNode, CursorPosition};
pub use error::PaginationError;
pub use plan::ConnectionPlan;
pub use selection::ConnectionSelection;
pub use window::{PageArguments, PageDirection, PageWindow};

/// Page size of root connections if neither `first` nor `last` is given.
pub const DEFAULT_CONNECTION_SIZE: usize = 10000;

/// Upper bound for `first` and `last` of every connection.
pub const MAX_CONNECTION_SIZE: usize = 10000;

/// Page size of the `propertyUses` connection if neither `first` nor `last` is given.
pub const PROPERTY_USES_DEFAULT_SIZE: usize = 10;
