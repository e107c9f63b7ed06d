use bson::Uuid;
use log::debug;
use tokio::sync::RwLock;

use super::StoreError;

use crate::{
    graphql::model::{
        connection::base_connection::{BaseConnection, BaseEdge},
        property::{Property, PropertySelection},
        property_use::PropertyUse,
    },
    pagination::{ConnectionNode, CursorPosition, PageDirection, PageWindow, PaginationError},
};

/// In-memory copy of the `properties` and `property_uses` collections.
#[derive(Debug, Default)]
pub struct MemoryStore {
    properties: RwLock<Vec<Property>>,
    property_uses: RwLock<Vec<PropertyUse>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count_properties(&self) -> u64 {
        debug!("memory: count properties");
        self.properties.read().await.len() as u64
    }

    /// Reads a page of properties, summing the unit counts of every node if `livingUnits` is
    /// selected.
    pub async fn page_properties(
        &self,
        window: &PageWindow,
        with_total_count: bool,
        selection: PropertySelection,
    ) -> Result<BaseConnection<Property>, StoreError> {
        debug!("memory: page properties {:?} {:?}", window, selection);
        let mut properties = self.properties.read().await.clone();
        properties.sort_by(|x, y| (&x.name, &x._id).cmp(&(&y.name, &y._id)));
        let mut connection = paginate(properties, window, with_total_count)?;
        if selection.living_units {
            let property_uses = self.property_uses.read().await;
            for edge in connection.edges.iter_mut() {
                edge.node.living_units = Some(sum_of_uses(&property_uses, edge.node._id));
            }
        }
        Ok(connection)
    }

    pub async fn count_property_uses(&self, property_id: Uuid) -> u64 {
        debug!("memory: count property uses of property {}", property_id);
        self.property_uses
            .read()
            .await
            .iter()
            .filter(|property_use| property_use.property._id == property_id)
            .count() as u64
    }

    pub async fn page_property_uses(
        &self,
        property_id: Uuid,
        window: &PageWindow,
        with_total_count: bool,
    ) -> Result<BaseConnection<PropertyUse>, StoreError> {
        debug!(
            "memory: page property uses of property {} {:?}",
            property_id, window
        );
        let mut property_uses: Vec<PropertyUse> = self
            .property_uses
            .read()
            .await
            .iter()
            .filter(|property_use| property_use.property._id == property_id)
            .cloned()
            .collect();
        property_uses.sort_by(|x, y| (&x.name, &x._id).cmp(&(&y.name, &y._id)));
        let connection = paginate(property_uses, window, with_total_count)?;
        Ok(connection)
    }

    pub async fn find_property(&self, id: Uuid, selection: PropertySelection) -> Option<Property> {
        debug!("memory: find property {} {:?}", id, selection);
        let mut property = self
            .properties
            .read()
            .await
            .iter()
            .find(|property| property._id == id)
            .cloned()?;
        if selection.living_units {
            property.living_units = Some(self.sum_unit_counts(id).await);
        }
        Some(property)
    }

    pub async fn sum_unit_counts(&self, property_id: Uuid) -> i64 {
        debug!("memory: sum unit counts of property {}", property_id);
        sum_of_uses(&self.property_uses.read().await, property_id)
    }

    pub async fn clear(&self) {
        self.property_uses.write().await.clear();
        self.properties.write().await.clear();
    }

    pub async fn insert_property(&self, property: Property) {
        self.properties.write().await.push(property);
    }

    pub async fn insert_property_uses(&self, property_uses: Vec<PropertyUse>) {
        self.property_uses.write().await.extend(property_uses);
    }
}

fn sum_of_uses(property_uses: &[PropertyUse], property_id: Uuid) -> i64 {
    property_uses
        .iter()
        .filter(|property_use| property_use.property._id == property_id)
        .map(|property_use| i64::from(property_use.unit_count))
        .sum()
}

/// Cuts the page described by `window` out of entities sorted in connection order.
fn paginate<T: ConnectionNode>(
    entities: Vec<T>,
    window: &PageWindow,
    with_total_count: bool,
) -> Result<BaseConnection<T>, PaginationError> {
    let total_count = entities.len();
    let cursor_position = window
        .cursor
        .as_deref()
        .map(|cursor| position_of_cursor(&entities, cursor))
        .transpose()?;
    let (start, end) = match window.direction {
        PageDirection::Forward => {
            let start = cursor_position.map_or(0, |position| position + 1);
            (start, start.saturating_add(window.limit).min(total_count))
        }
        PageDirection::Backward => {
            let end = cursor_position.unwrap_or(total_count);
            (end.saturating_sub(window.limit), end)
        }
    };
    let edges = entities
        .into_iter()
        .skip(start)
        .take(end - start)
        .map(BaseEdge::from_node)
        .collect();
    Ok(BaseConnection::from_edges(
        edges,
        end < total_count,
        start > 0,
        with_total_count.then_some(total_count as u64),
    ))
}

/// Index of the entity a cursor points to. Cursors of entities outside `entities` are rejected.
fn position_of_cursor<T: ConnectionNode>(
    entities: &[T],
    cursor: &str,
) -> Result<usize, PaginationError> {
    let position = CursorPosition::decode(cursor)?;
    entities
        .iter()
        .position(|entity| entity.cursor_position() == position)
        .ok_or_else(|| PaginationError::UnsupportedCursor(cursor.to_string()))
}
