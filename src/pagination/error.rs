use thiserror::Error;

/// Describes why pagination arguments or cursors of a connection request were rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    /// Both `first` and `last` were given.
    #[error("The `first` and `last` arguments cannot be used at the same time.")]
    FirstAndLast,
    /// `first` or `last` was negative.
    #[error("The `{0}` argument must be a non-negative integer.")]
    NegativeSize(&'static str),
    /// A cursor was combined with a size argument or cursor of the opposite direction.
    #[error(
        "The `after` argument can only be combined with `first` and the `before` argument only with `last`."
    )]
    MixedDirection,
    /// A client supplied cursor does not decode into a position of the connection.
    #[error("Unsupported cursor type: `{0}` does not point to a position in this connection.")]
    UnsupportedCursor(String),
}
