//! Persistence of properties and their uses.
//!
//! `Store` executes connection plans against either MongoDB or an in-memory copy of the same
//! collections. Both order connections by name, then by UUID.

use std::sync::Arc;

use bson::Uuid;
use thiserror::Error;

use crate::{
    graphql::model::{
        connection::base_connection::BaseConnection,
        property::{Property, PropertySelection},
        property_use::PropertyUse,
    },
    pagination::{ConnectionPlan, PaginationError},
};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Errors of store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("MongoDB operation failed: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("MongoDB document could not be decoded: {0}")]
    Decode(#[from] bson::de::Error),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
}

/// Storage backend shared by all requests.
#[derive(Clone)]
pub enum Store {
    Mongo(MongoStore),
    Memory(Arc<MemoryStore>),
}

impl Store {
    /// Executes a connection plan over all properties.
    ///
    /// `selection` describes the data the selected property nodes require, it is fetched together
    /// with the page.
    pub async fn properties(
        &self,
        plan: &ConnectionPlan,
        selection: PropertySelection,
    ) -> Result<BaseConnection<Property>, StoreError> {
        match plan {
            ConnectionPlan::Empty => Ok(BaseConnection::empty()),
            ConnectionPlan::CountOnly => {
                let total_count = match self {
                    Store::Mongo(store) => store.count_properties().await?,
                    Store::Memory(store) => store.count_properties().await,
                };
                Ok(BaseConnection::count_only(total_count))
            }
            ConnectionPlan::Page {
                window,
                with_total_count,
            } => match self {
                Store::Mongo(store) => {
                    store
                        .page_properties(window, *with_total_count, selection)
                        .await
                }
                Store::Memory(store) => {
                    store
                        .page_properties(window, *with_total_count, selection)
                        .await
                }
            },
        }
    }

    /// Executes a connection plan over the uses of a property.
    pub async fn property_uses(
        &self,
        property_id: Uuid,
        plan: &ConnectionPlan,
    ) -> Result<BaseConnection<PropertyUse>, StoreError> {
        match plan {
            ConnectionPlan::Empty => Ok(BaseConnection::empty()),
            ConnectionPlan::CountOnly => {
                let total_count = match self {
                    Store::Mongo(store) => store.count_property_uses(property_id).await?,
                    Store::Memory(store) => store.count_property_uses(property_id).await,
                };
                Ok(BaseConnection::count_only(total_count))
            }
            ConnectionPlan::Page {
                window,
                with_total_count,
            } => match self {
                Store::Mongo(store) => {
                    store
                        .page_property_uses(property_id, window, *with_total_count)
                        .await
                }
                Store::Memory(store) => {
                    store
                        .page_property_uses(property_id, window, *with_total_count)
                        .await
                }
            },
        }
    }

    /// Finds a property, fetching the data its selected fields require in the same operation.
    ///
    /// Returns `None` if no property of `id` exists.
    pub async fn find_property(
        &self,
        id: Uuid,
        selection: PropertySelection,
    ) -> Result<Option<Property>, StoreError> {
        match self {
            Store::Mongo(store) => store.find_property(id, selection).await,
            Store::Memory(store) => Ok(store.find_property(id, selection).await),
        }
    }

    /// Sums the unit counts of all uses of a property.
    pub async fn sum_unit_counts(&self, property_id: Uuid) -> Result<i64, StoreError> {
        match self {
            Store::Mongo(store) => store.sum_unit_counts(property_id).await,
            Store::Memory(store) => Ok(store.sum_unit_counts(property_id).await),
        }
    }

    /// Deletes all property uses, then all properties.
    pub async fn clear(&self) -> Result<(), StoreError> {
        match self {
            Store::Mongo(store) => store.clear().await,
            Store::Memory(store) => {
                store.clear().await;
                Ok(())
            }
        }
    }

    pub async fn insert_property(&self, property: Property) -> Result<(), StoreError> {
        match self {
            Store::Mongo(store) => store.insert_property(property).await,
            Store::Memory(store) => {
                store.insert_property(property).await;
                Ok(())
            }
        }
    }

    pub async fn insert_property_uses(
        &self,
        property_uses: Vec<PropertyUse>,
    ) -> Result<(), StoreError> {
        match self {
            Store::Mongo(store) => store.insert_property_uses(property_uses).await,
            Store::Memory(store) => {
                store.insert_property_uses(property_uses).await;
                Ok(())
            }
        }
    }
}
