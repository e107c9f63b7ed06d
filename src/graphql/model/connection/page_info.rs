use async_graphql::SimpleObject;

/// Information about pagination in a connection.
#[derive(Debug, Default, Clone, PartialEq, Eq, SimpleObject)]
#[graphql(shareable)]
pub struct PageInfo {
    /// Whether more entities follow the end of this page.
    pub has_next_page: bool,
    /// Whether more entities precede the start of this page.
    pub has_previous_page: bool,
    /// Cursor of the first entity in this page.
    pub start_cursor: Option<String>,
    /// Cursor of the last entity in this page.
    pub end_cursor: Option<String>,
}
