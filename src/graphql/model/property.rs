use async_graphql::{ComplexObject, Context, ID, Lookahead, Result, SimpleObject};
use bson::Uuid;
use serde::{Deserialize, Serialize};

use crate::{
    pagination::{
        ConnectionNode, ConnectionPlan, ConnectionSelection, CursorPosition,
        PROPERTY_USES_DEFAULT_SIZE, PageArguments,
    },
    store::Store,
};

use super::connection::property_use_connection::PropertyUseConnection;

/// A property owning a list of property uses.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Property {
    /// Property UUID.
    #[graphql(skip)]
    pub _id: Uuid,
    /// Display name of the property.
    pub name: String,
    /// Sum of unit counts of all uses, present if it was fetched together with the property.
    #[graphql(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub living_units: Option<i64>,
}

impl Property {
    pub fn new(name: &str) -> Self {
        Self {
            _id: Uuid::new(),
            name: name.to_string(),
            living_units: None,
        }
    }
}

impl ConnectionNode for Property {
    fn cursor_position(&self) -> CursorPosition {
        CursorPosition {
            name: self.name.clone(),
            id: self._id,
        }
    }
}

/// Data that fields of a selected property require beyond the stored document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PropertySelection {
    /// `livingUnits` was selected and needs the unit counts of all uses.
    pub living_units: bool,
}

impl PropertySelection {
    /// Inspects the lookahead of a field returning a property.
    pub fn from_lookahead(lookahead: &Lookahead<'_>) -> Self {
        Self {
            living_units: lookahead.field("livingUnits").exists(),
        }
    }
}

#[ComplexObject]
impl Property {
    /// Property UUID.
    async fn id(&self) -> ID {
        ID::from(self._id.to_string())
    }

    /// Sum of the unit counts of all uses of the property.
    async fn living_units<'a>(&self, ctx: &Context<'a>) -> Result<Option<i64>> {
        if let Some(living_units) = self.living_units {
            return Ok(Some(living_units));
        }
        let store = ctx.data::<Store>()?;
        let living_units = store.sum_unit_counts(self._id).await?;
        Ok(Some(living_units))
    }

    /// Retrieves uses of the property, ordered by name.
    async fn property_uses<'a>(
        &self,
        ctx: &Context<'a>,
        #[graphql(desc = "Describes that the `first` N property uses should be retrieved.")]
        first: Option<i32>,
        #[graphql(desc = "Cursor that retrieved property uses should follow.")] after: Option<
            String,
        >,
        #[graphql(desc = "Describes that the `last` N property uses should be retrieved.")]
        last: Option<i32>,
        #[graphql(desc = "Cursor that retrieved property uses should precede.")] before: Option<
            String,
        >,
    ) -> Result<PropertyUseConnection> {
        let store = ctx.data::<Store>()?;
        let selection = ConnectionSelection::from_lookahead(&ctx.look_ahead());
        let arguments = PageArguments {
            first,
            after,
            last,
            before,
        };
        let plan = ConnectionPlan::new(selection, arguments, PROPERTY_USES_DEFAULT_SIZE)?;
        let connection = store.property_uses(self._id, &plan).await?;
        Ok(PropertyUseConnection::from(connection))
    }
}
