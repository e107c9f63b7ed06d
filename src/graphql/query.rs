use async_graphql::{Context, Error, ID, Object, Result};
use bson::Uuid;
use log::debug;

use crate::{
    pagination::{ConnectionPlan, ConnectionSelection, DEFAULT_CONNECTION_SIZE, PageArguments},
    store::Store,
};

use super::model::{
    connection::property_connection::PropertyConnection,
    property::{Property, PropertySelection},
};

/// Describes GraphQL property queries.
pub struct Query;

#[Object]
impl Query {
    /// Retrieves property of specific id, `null` if it does not exist.
    async fn property<'a>(
        &self,
        ctx: &Context<'a>,
        #[graphql(desc = "UUID of property to retrieve.")] id: ID,
    ) -> Result<Option<Property>> {
        let store = ctx.data::<Store>()?;
        let Some(id) = parse_property_id(&id) else {
            return Ok(None);
        };
        let selection = PropertySelection::from_lookahead(&ctx.look_ahead());
        Ok(store.find_property(id, selection).await?)
    }

    /// Entity resolver for property of specific id.
    #[graphql(entity)]
    async fn property_entity_resolver<'a>(
        &self,
        ctx: &Context<'a>,
        #[graphql(key, desc = "UUID of property to retrieve.")] id: ID,
    ) -> Result<Property> {
        let store = ctx.data::<Store>()?;
        let not_found = || Error::new(format!("Property with UUID: `{}` not found.", id.as_str()));
        let uuid = parse_property_id(&id).ok_or_else(not_found)?;
        store
            .find_property(uuid, PropertySelection::default())
            .await?
            .ok_or_else(not_found)
    }

    /// Retrieves properties, ordered by name.
    async fn properties<'a>(
        &self,
        ctx: &Context<'a>,
        #[graphql(desc = "Describes that the `first` N properties should be retrieved.")]
        first: Option<i32>,
        #[graphql(desc = "Cursor that retrieved properties should follow.")] after: Option<String>,
        #[graphql(desc = "Describes that the `last` N properties should be retrieved.")]
        last: Option<i32>,
        #[graphql(desc = "Cursor that retrieved properties should precede.")] before: Option<String>,
    ) -> Result<PropertyConnection> {
        let store = ctx.data::<Store>()?;
        let lookahead = ctx.look_ahead();
        let selection = ConnectionSelection::from_lookahead(&lookahead);
        let node_selection =
            PropertySelection::from_lookahead(&lookahead.field("edges").field("node"));
        let arguments = PageArguments {
            first,
            after,
            last,
            before,
        };
        let plan = ConnectionPlan::new(selection, arguments, DEFAULT_CONNECTION_SIZE)?;
        let connection = store.properties(&plan, node_selection).await?;
        Ok(PropertyConnection::from(connection))
    }
}

/// Parses a GraphQL ID into a property UUID.
///
/// IDs which are no UUIDs cannot belong to a property and yield `None`.
fn parse_property_id(id: &ID) -> Option<Uuid> {
    match Uuid::parse_str(id.as_str()) {
        Ok(uuid) => Some(uuid),
        Err(_) => {
            debug!("Property ID `{}` is not a UUID.", id.as_str());
            None
        }
    }
}
