use async_graphql::{ComplexObject, Error, Result, SimpleObject};

use super::{
    super::property_use::PropertyUse,
    base_connection::{BaseConnection, BaseEdge},
    page_info::PageInfo,
};

/// A connection of property uses.
#[derive(SimpleObject)]
#[graphql(complex, shareable)]
pub struct PropertyUseConnection {
    /// The resulting entities with their cursors.
    pub edges: Vec<PropertyUseEdge>,
    /// Information to aid in pagination.
    pub page_info: PageInfo,
    #[graphql(skip)]
    pub total_count: Option<u64>,
}

#[ComplexObject]
impl PropertyUseConnection {
    /// The total amount of property uses in this connection.
    async fn total_count(&self) -> Result<u64> {
        self.total_count.ok_or(Error::new(
            "Total count of `PropertyUseConnection` was not planned for this request.",
        ))
    }
}

/// A property use and its cursor.
#[derive(SimpleObject)]
#[graphql(shareable)]
pub struct PropertyUseEdge {
    /// Opaque position of the property use.
    pub cursor: String,
    /// The property use.
    pub node: PropertyUse,
}

/// Implementation of conversion from `BaseConnection<PropertyUse>` to `PropertyUseConnection`.
///
/// Prevents GraphQL naming conflicts.
impl From<BaseConnection<PropertyUse>> for PropertyUseConnection {
    fn from(value: BaseConnection<PropertyUse>) -> Self {
        Self {
            edges: value.edges.into_iter().map(PropertyUseEdge::from).collect(),
            page_info: value.page_info,
            total_count: value.total_count,
        }
    }
}

impl From<BaseEdge<PropertyUse>> for PropertyUseEdge {
    fn from(value: BaseEdge<PropertyUse>) -> Self {
        Self {
            cursor: value.cursor,
            node: value.node,
        }
    }
}
