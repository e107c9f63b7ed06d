use bson::{Document, Uuid, doc};
use futures::TryStreamExt;
use log::debug;
use mongodb::{Collection, Database};
use serde::{Deserialize, de::DeserializeOwned};

use super::StoreError;
use crate::{
    graphql::model::{
        connection::base_connection::{BaseConnection, BaseEdge},
        property::{Property, PropertySelection},
        property_use::PropertyUse,
    },
    pagination::{ConnectionNode, CursorPosition, PageDirection, PageWindow, PaginationError},
};

/// Name of the MongoDB collection of properties.
const PROPERTY_COLLECTION: &str = "properties";
/// Name of the MongoDB collection of property uses.
const PROPERTY_USE_COLLECTION: &str = "property_uses";

/// MongoDB backed store.
///
/// Property uses reference their property with `property._id`.
#[derive(Clone)]
pub struct MongoStore {
    db_client: Database,
}

/// Result document of the unit count aggregation.
#[derive(Deserialize)]
struct LivingUnits {
    living_units: i64,
}

impl MongoStore {
    pub fn new(db_client: Database) -> Self {
        Self { db_client }
    }

    fn property_collection(&self) -> Collection<Property> {
        self.db_client.collection::<Property>(PROPERTY_COLLECTION)
    }

    fn property_use_collection(&self) -> Collection<PropertyUse> {
        self.db_client
            .collection::<PropertyUse>(PROPERTY_USE_COLLECTION)
    }

    pub async fn count_properties(&self) -> Result<u64, StoreError> {
        debug!("mongodb: count `{}`", PROPERTY_COLLECTION);
        Ok(self.property_collection().count_documents(None, None).await?)
    }

    /// Reads a page of properties.
    ///
    /// If `livingUnits` is selected, the unit counts of every node are summed in the page aggregation.
    pub async fn page_properties(
        &self,
        window: &PageWindow,
        with_total_count: bool,
        selection: PropertySelection,
    ) -> Result<BaseConnection<Property>, StoreError> {
        let node_stages = if selection.living_units {
            living_units_stages()
        } else {
            vec![]
        };
        page(
            &self.property_collection(),
            doc! {},
            window,
            with_total_count,
            node_stages,
        )
        .await
    }

    /// Counts the uses of a property with a plain conditional count, no cursor is involved.
    pub async fn count_property_uses(&self, property_id: Uuid) -> Result<u64, StoreError> {
        let filter = property_uses_filter(property_id);
        debug!("mongodb: count `{}` {}", PROPERTY_USE_COLLECTION, filter);
        Ok(self
            .property_use_collection()
            .count_documents(filter, None)
            .await?)
    }

    pub async fn page_property_uses(
        &self,
        property_id: Uuid,
        window: &PageWindow,
        with_total_count: bool,
    ) -> Result<BaseConnection<PropertyUse>, StoreError> {
        page(
            &self.property_use_collection(),
            property_uses_filter(property_id),
            window,
            with_total_count,
            vec![],
        )
        .await
    }

    /// Finds a property.
    ///
    /// If `livingUnits` is selected, the unit counts of its uses are summed in the same aggregation.
    pub async fn find_property(
        &self,
        id: Uuid,
        selection: PropertySelection,
    ) -> Result<Option<Property>, StoreError> {
        let collection = self.property_collection();
        if !selection.living_units {
            let filter = doc! {"_id": id};
            debug!("mongodb: find one `{}` {}", PROPERTY_COLLECTION, filter);
            return Ok(collection.find_one(filter, None).await?);
        }
        let pipeline = find_property_pipeline(id);
        debug!("mongodb: aggregate `{}` {:?}", PROPERTY_COLLECTION, pipeline);
        first_aggregated(&collection, pipeline).await
    }

    /// Sums the unit counts of all uses of a property.
    pub async fn sum_unit_counts(&self, property_id: Uuid) -> Result<i64, StoreError> {
        let pipeline = unit_count_sum_pipeline(property_id);
        debug!(
            "mongodb: aggregate `{}` {:?}",
            PROPERTY_USE_COLLECTION, pipeline
        );
        let maybe_living_units: Option<LivingUnits> =
            first_aggregated(&self.property_use_collection(), pipeline).await?;
        Ok(living_units_or_zero(maybe_living_units))
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        debug!("mongodb: delete all of `{}`", PROPERTY_USE_COLLECTION);
        self.property_use_collection()
            .delete_many(doc! {}, None)
            .await?;
        debug!("mongodb: delete all of `{}`", PROPERTY_COLLECTION);
        self.property_collection().delete_many(doc! {}, None).await?;
        Ok(())
    }

    pub async fn insert_property(&self, property: Property) -> Result<(), StoreError> {
        debug!("mongodb: insert into `{}` {:?}", PROPERTY_COLLECTION, property);
        self.property_collection().insert_one(property, None).await?;
        Ok(())
    }

    pub async fn insert_property_uses(
        &self,
        property_uses: Vec<PropertyUse>,
    ) -> Result<(), StoreError> {
        if property_uses.is_empty() {
            return Ok(());
        }
        debug!(
            "mongodb: insert {} documents into `{}`",
            property_uses.len(),
            PROPERTY_USE_COLLECTION
        );
        self.property_use_collection()
            .insert_many(property_uses, None)
            .await?;
        Ok(())
    }
}

/// Reads a page of a collection ordered by name, then by UUID.
///
/// The page continues from the cursor with a range query on both sort keys. One entity more than
/// the window holds is read to find out whether the page is followed by further entities.
///
/// * `collection` - MongoDB collection to paginate.
/// * `filter` - Filter restricting the connection.
/// * `window` - Validated page window.
/// * `with_total_count` - Whether the entities matching `filter` are counted as well.
/// * `node_stages` - Aggregation stages adding data to the nodes of the page.
async fn page<T>(
    collection: &Collection<T>,
    filter: Document,
    window: &PageWindow,
    with_total_count: bool,
    node_stages: Vec<Document>,
) -> Result<BaseConnection<T>, StoreError>
where
    T: DeserializeOwned + ConnectionNode,
{
    let position = match window.cursor.as_deref() {
        Some(cursor) => Some(cursor_position_in(collection, &filter, cursor).await?),
        None => None,
    };
    let pipeline = page_pipeline(&filter, window, position.as_ref(), node_stages);
    debug!(
        "mongodb: aggregate page of `{}` {:?}",
        collection.name(),
        pipeline
    );
    let mut cursor = collection.aggregate(pipeline, None).await?;
    let mut nodes = Vec::new();
    while let Some(document) = cursor.try_next().await? {
        nodes.push(bson::from_document::<T>(document)?);
    }
    let total_count = if with_total_count {
        debug!("mongodb: count `{}` {}", collection.name(), filter);
        Some(collection.count_documents(filter, None).await?)
    } else {
        None
    };
    Ok(assemble_page(nodes, window, position.is_some(), total_count))
}

/// Decodes a client supplied cursor and checks that it points to an entity matching `filter`.
///
/// Cursors of other connections are rejected like undecodable ones.
async fn cursor_position_in<T>(
    collection: &Collection<T>,
    filter: &Document,
    cursor: &str,
) -> Result<CursorPosition, StoreError> {
    let position = CursorPosition::decode(cursor)?;
    let position_filter = cursor_position_filter(filter, &position);
    debug!("mongodb: count `{}` {}", collection.name(), position_filter);
    if collection.count_documents(position_filter, None).await? == 0 {
        return Err(PaginationError::UnsupportedCursor(cursor.to_string()).into());
    }
    Ok(position)
}

/// Filter of the uses of a property.
fn property_uses_filter(property_id: Uuid) -> Document {
    doc! {"property._id": property_id}
}

/// Filter of the entity at `position`, if it belongs to the connection restricted by `filter`.
fn cursor_position_filter(filter: &Document, position: &CursorPosition) -> Document {
    doc! {"$and": [
        filter.clone(),
        {"_id": position.id, "name": position.name.clone()},
    ]}
}

/// Aggregation pipeline reading the page of `window`.
///
/// A backward page is read in descending order, `assemble_page` turns it around.
fn page_pipeline(
    filter: &Document,
    window: &PageWindow,
    position: Option<&CursorPosition>,
    node_stages: Vec<Document>,
) -> Vec<Document> {
    let (comparison, sort_direction) = match window.direction {
        PageDirection::Forward => ("$gt", 1),
        PageDirection::Backward => ("$lt", -1),
    };
    let match_filter = match position {
        Some(position) => {
            let mut name_bound = Document::new();
            name_bound.insert(comparison, position.name.clone());
            let mut id_bound = Document::new();
            id_bound.insert(comparison, position.id);
            doc! {"$and": [
                filter.clone(),
                {"$or": [
                    {"name": name_bound},
                    {"name": position.name.clone(), "_id": id_bound},
                ]},
            ]}
        }
        None => filter.clone(),
    };
    let limit = i64::try_from(window.limit.saturating_add(1)).unwrap_or(i64::MAX);
    let mut pipeline = vec![
        doc! {"$match": match_filter},
        doc! {"$sort": {"name": sort_direction, "_id": sort_direction}},
        doc! {"$limit": limit},
    ];
    pipeline.extend(node_stages);
    pipeline
}

/// Builds the connection of nodes read by `page_pipeline`.
///
/// * `nodes` - Nodes in reading order, at most one more than the window holds.
/// * `has_cursor` - Whether the window starts after (or ends before) an entity of the connection.
fn assemble_page<T: ConnectionNode>(
    mut nodes: Vec<T>,
    window: &PageWindow,
    has_cursor: bool,
    total_count: Option<u64>,
) -> BaseConnection<T> {
    let has_more = nodes.len() > window.limit;
    nodes.truncate(window.limit);
    if window.direction == PageDirection::Backward {
        nodes.reverse();
    }
    let edges = nodes.into_iter().map(BaseEdge::from_node).collect();
    match window.direction {
        PageDirection::Forward => {
            BaseConnection::from_edges(edges, has_more, has_cursor, total_count)
        }
        PageDirection::Backward => {
            BaseConnection::from_edges(edges, has_cursor, has_more, total_count)
        }
    }
}

/// Stages summing the unit counts of the uses of each property into `living_units`.
fn living_units_stages() -> Vec<Document> {
    vec![
        doc! {"$lookup": {
            "from": PROPERTY_USE_COLLECTION,
            "localField": "_id",
            "foreignField": "property._id",
            "as": "property_uses"
        }},
        doc! {"$addFields": {"living_units": {"$sum": "$property_uses.unit_count"}}},
        doc! {"$project": {"property_uses": 0}},
    ]
}

fn find_property_pipeline(id: Uuid) -> Vec<Document> {
    let mut pipeline = vec![doc! {"$match": {"_id": id}}];
    pipeline.extend(living_units_stages());
    pipeline
}

fn unit_count_sum_pipeline(property_id: Uuid) -> Vec<Document> {
    vec![
        doc! {"$match": property_uses_filter(property_id)},
        doc! {"$group": {"_id": null, "living_units": {"$sum": "$unit_count"}}},
    ]
}

/// A property without uses has no group in the sum aggregation.
fn living_units_or_zero(maybe_living_units: Option<LivingUnits>) -> i64 {
    maybe_living_units.map_or(0, |sum| sum.living_units)
}

/// Runs an aggregation and decodes its first result document.
async fn first_aggregated<T, R>(
    collection: &Collection<T>,
    pipeline: Vec<Document>,
) -> Result<Option<R>, StoreError>
where
    R: DeserializeOwned,
{
    let mut cursor = collection.aggregate(pipeline, None).await?;
    match cursor.try_next().await? {
        Some(document) => Ok(Some(bson::from_document(document)?)),
        None => Ok(None),
    }
}
