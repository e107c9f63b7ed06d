use async_graphql::Lookahead;

/// Facets of a connection response that a request selected.
///
/// Read from the selection set of the connection field itself, so requirements that sibling fields
/// declare on the same relation never leak into it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSelection {
    /// `totalCount` was selected.
    pub total_count: bool,
    /// `edges` was selected.
    pub edges: bool,
    /// `pageInfo` was selected.
    pub page_info: bool,
}

impl ConnectionSelection {
    /// Inspects the lookahead of a connection field.
    pub fn from_lookahead(lookahead: &Lookahead<'_>) -> Self {
        Self {
            total_count: lookahead.field("totalCount").exists(),
            edges: lookahead.field("edges").exists(),
            page_info: lookahead.field("pageInfo").exists(),
        }
    }

    /// Whether answering the selection needs positions in the ordered relation.
    pub fn requires_page(&self) -> bool {
        self.edges || self.page_info
    }
}
