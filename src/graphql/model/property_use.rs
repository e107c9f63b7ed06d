use async_graphql::{ComplexObject, ID, SimpleObject};
use bson::Uuid;
use serde::{Deserialize, Serialize};

use crate::pagination::{ConnectionNode, CursorPosition};

use super::property::Property;

/// A use of a property, contributing units to its owner.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, SimpleObject)]
#[graphql(complex)]
pub struct PropertyUse {
    /// PropertyUse UUID.
    #[graphql(skip)]
    pub _id: Uuid,
    /// Display name of the use.
    pub name: String,
    /// Amount of units of the use.
    pub unit_count: i32,
    /// Property owning the use.
    #[graphql(skip)]
    pub property: OwningProperty,
}

/// Reference from a property use to the property owning it.
#[derive(Debug, Serialize, Deserialize, Hash, Eq, PartialEq, Copy, Clone)]
pub struct OwningProperty {
    /// UUID of the owning property.
    pub _id: Uuid,
}

impl PropertyUse {
    /// Creates a use owned by `property`.
    pub fn new(property: &Property, name: &str, unit_count: i32) -> Self {
        Self {
            _id: Uuid::new(),
            name: name.to_string(),
            unit_count,
            property: OwningProperty { _id: property._id },
        }
    }
}

impl ConnectionNode for PropertyUse {
    fn cursor_position(&self) -> CursorPosition {
        CursorPosition {
            name: self.name.clone(),
            id: self._id,
        }
    }
}

#[ComplexObject]
impl PropertyUse {
    /// PropertyUse UUID.
    async fn id(&self) -> ID {
        ID::from(self._id.to_string())
    }
}
