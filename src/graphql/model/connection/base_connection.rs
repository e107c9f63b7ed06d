use crate::pagination::ConnectionNode;

use super::page_info::PageInfo;

/// A base connection for an entity type, independent of its GraphQL naming.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseConnection<T> {
    /// The entities of the page together with their cursors.
    pub edges: Vec<BaseEdge<T>>,
    /// Pagination information of the page.
    pub page_info: PageInfo,
    /// The total amount of entities in this connection, if it was planned.
    pub total_count: Option<u64>,
}

/// An entity of a page and its cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseEdge<T> {
    pub cursor: String,
    pub node: T,
}

impl<T: ConnectionNode> BaseEdge<T> {
    /// Edge of `node` with the cursor of its position in the connection.
    pub fn from_node(node: T) -> Self {
        Self {
            cursor: node.cursor_position().encode(),
            node,
        }
    }
}

impl<T> BaseConnection<T> {
    /// Connection that fetched nothing.
    pub fn empty() -> Self {
        Self {
            edges: vec![],
            page_info: PageInfo::default(),
            total_count: None,
        }
    }

    /// Connection that only carries the total count.
    pub fn count_only(total_count: u64) -> Self {
        Self {
            total_count: Some(total_count),
            ..Self::empty()
        }
    }

    /// Builds a connection from an ordered page of edges.
    ///
    /// Start and end cursor are taken from the first and last edge.
    pub fn from_edges(
        edges: Vec<BaseEdge<T>>,
        has_next_page: bool,
        has_previous_page: bool,
        total_count: Option<u64>,
    ) -> Self {
        let page_info = PageInfo {
            has_next_page,
            has_previous_page,
            start_cursor: edges.first().map(|edge| edge.cursor.clone()),
            end_cursor: edges.last().map(|edge| edge.cursor.clone()),
        };
        Self {
            edges,
            page_info,
            total_count,
        }
    }
}
