use async_graphql::{ComplexObject, Error, Result, SimpleObject};

use super::{
    super::property::Property,
    base_connection::{BaseConnection, BaseEdge},
    page_info::PageInfo,
};

/// A connection of properties.
#[derive(SimpleObject)]
#[graphql(complex, shareable)]
pub struct PropertyConnection {
    /// The resulting entities with their cursors.
    pub edges: Vec<PropertyEdge>,
    /// Information to aid in pagination.
    pub page_info: PageInfo,
    #[graphql(skip)]
    pub total_count: Option<u64>,
}

#[ComplexObject]
impl PropertyConnection {
    /// The total amount of properties in this connection.
    async fn total_count(&self) -> Result<u64> {
        self.total_count.ok_or(Error::new(
            "Total count of `PropertyConnection` was not planned for this request.",
        ))
    }
}

/// A property and its cursor.
#[derive(SimpleObject)]
#[graphql(shareable)]
pub struct PropertyEdge {
    /// Opaque position of the property.
    pub cursor: String,
    /// The property.
    pub node: Property,
}

/// Implementation of conversion from `BaseConnection<Property>` to `PropertyConnection`.
///
/// Prevents GraphQL naming conflicts.
impl From<BaseConnection<Property>> for PropertyConnection {
    fn from(value: BaseConnection<Property>) -> Self {
        Self {
            edges: value.edges.into_iter().map(PropertyEdge::from).collect(),
            page_info: value.page_info,
            total_count: value.total_count,
        }
    }
}

impl From<BaseEdge<Property>> for PropertyEdge {
    fn from(value: BaseEdge<Property>) -> Self {
        Self {
            cursor: value.cursor,
            node: value.node,
        }
    }
}
