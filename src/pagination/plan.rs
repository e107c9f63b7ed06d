use super::{ConnectionSelection, PageArguments, PageWindow, PaginationError};

/// Store operation that answers a connection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionPlan {
    /// No facet was selected, nothing is fetched.
    Empty,
    /// Only `totalCount` was selected. Answered by a plain count query without any cursor.
    CountOnly,
    /// `edges` or `pageInfo` was selected. Answered by cursor pagination over the ordered relation.
    Page {
        window: PageWindow,
        /// Whether `totalCount` was selected next to the page.
        with_total_count: bool,
    },
}

impl ConnectionPlan {
    /// Plans a connection request.
    ///
    /// Arguments are validated for every plan, the cursor inside them is only ever decoded by a
    /// `ConnectionPlan::Page`.
    ///
    /// * `selection` - Facets selected on the connection field.
    /// * `arguments` - Relay pagination arguments of the connection field.
    /// * `default_size` - Page size if neither `first` nor `last` is given.
    pub fn new(
        selection: ConnectionSelection,
        arguments: PageArguments,
        default_size: usize,
    ) -> Result<Self, PaginationError> {
        let window = PageWindow::from_arguments(arguments, default_size)?;
        let plan = if selection.requires_page() {
            ConnectionPlan::Page {
                window,
                with_total_count: selection.total_count,
            }
        } else if selection.total_count {
            ConnectionPlan::CountOnly
        } else {
            ConnectionPlan::Empty
        };
        Ok(plan)
    }
}
