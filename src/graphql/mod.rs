use async_graphql::{EmptyMutation, EmptySubscription, Schema, extensions::Logger};

use crate::store::Store;

pub mod model;
pub mod query;

use query::Query;

/// GraphQL schema of the property service.
pub type PropertySchema = Schema<Query, EmptyMutation, EmptySubscription>;

/// Builds the schema executing requests against `store`.
pub fn build_schema(store: Store) -> PropertySchema {
    Schema::build(Query, EmptyMutation, EmptySubscription)
        .extension(Logger)
        .data(store)
        .enable_federation()
        .finish()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_graphql::{Request, Variables};
    use serde_json::{Value, json};

    use super::*;
    use crate::{
        graphql::model::property::Property,
        seed::seed,
        store::MemoryStore,
    };

    async fn seeded_schema() -> (PropertySchema, Store) {
        let store = Store::Memory(Arc::new(MemoryStore::new()));
        seed(&store).await.unwrap();
        (build_schema(store.clone()), store)
    }

    /// Executes a request and returns its data together with its error messages.
    async fn execute(schema: &PropertySchema, query: &str, variables: Value) -> (Value, Vec<String>) {
        let request = Request::new(query).variables(Variables::from_json(variables));
        let response = schema.execute(request).await;
        let errors = response.errors.iter().map(|e| e.message.clone()).collect();
        (response.data.into_json().unwrap(), errors)
    }

    async fn alpha_tower_id(schema: &PropertySchema) -> String {
        let (data, errors) = execute(
            schema,
            "{ properties(first: 1) { edges { node { id name } } } }",
            json!({}),
        )
        .await;
        assert!(errors.is_empty(), "{:?}", errors);
        let node = &data["properties"]["edges"][0]["node"];
        assert_eq!(node["name"], "Alpha Tower");
        node["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn total_count_alone_succeeds() {
        let (schema, _) = seeded_schema().await;
        let id = alpha_tower_id(&schema).await;
        let (data, errors) = execute(
            &schema,
            r#"query PropertyTotalCountOnly($id: ID!) {
                property(id: $id) {
                    name
                    livingUnits
                    propertyUses { totalCount }
                }
            }"#,
            json!({ "id": id }),
        )
        .await;
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(
            data,
            json!({"property": {
                "name": "Alpha Tower",
                "livingUnits": 150,
                "propertyUses": {"totalCount": 5}
            }})
        );
    }

    #[tokio::test]
    async fn total_count_through_fragment_is_count_only() {
        let (schema, _) = seeded_schema().await;
        let id = alpha_tower_id(&schema).await;
        let (data, errors) = execute(
            &schema,
            r#"query ($id: ID!) {
                property(id: $id) { propertyUses(after: "not a cursor") { ...Counted } }
            }
            fragment Counted on PropertyUseConnection { totalCount }"#,
            json!({ "id": id }),
        )
        .await;
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(data["property"]["propertyUses"]["totalCount"], 5);
    }

    #[tokio::test]
    async fn total_count_is_independent_of_page_size() {
        let (schema, _) = seeded_schema().await;
        let id = alpha_tower_id(&schema).await;
        let (data, errors) = execute(
            &schema,
            r#"query ($id: ID!) {
                property(id: $id) {
                    livingUnits
                    propertyUses(first: 2) {
                        totalCount
                        edges { node { id name unitCount } }
                    }
                }
            }"#,
            json!({ "id": id }),
        )
        .await;
        assert!(errors.is_empty(), "{:?}", errors);
        let property = &data["property"];
        assert_eq!(property["livingUnits"], 150);
        assert_eq!(property["propertyUses"]["totalCount"], 5);
        let names: Vec<&str> = property["propertyUses"]["edges"]
            .as_array()
            .unwrap()
            .iter()
            .map(|edge| edge["node"]["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Amenities", "Commercial"]);
    }

    #[tokio::test]
    async fn total_count_with_page_info_succeeds() {
        let (schema, _) = seeded_schema().await;
        let id = alpha_tower_id(&schema).await;
        let (data, errors) = execute(
            &schema,
            r#"query PropertyWithPageInfo($id: ID!) {
                property(id: $id) {
                    livingUnits
                    propertyUses {
                        totalCount
                        pageInfo { hasNextPage hasPreviousPage startCursor endCursor }
                    }
                }
            }"#,
            json!({ "id": id }),
        )
        .await;
        assert!(errors.is_empty(), "{:?}", errors);
        let property_uses = &data["property"]["propertyUses"];
        assert_eq!(data["property"]["livingUnits"], 150);
        assert_eq!(property_uses["totalCount"], 5);
        assert_eq!(property_uses["pageInfo"]["hasNextPage"], false);
        assert_eq!(property_uses["pageInfo"]["hasPreviousPage"], false);
        assert!(property_uses["pageInfo"]["startCursor"].is_string());
        assert!(property_uses["pageInfo"]["endCursor"].is_string());
    }

    #[tokio::test]
    async fn paginates_property_uses_with_cursors() {
        let (schema, _) = seeded_schema().await;
        let id = alpha_tower_id(&schema).await;
        let query = r#"query ($id: ID!, $after: String) {
            property(id: $id) {
                propertyUses(first: 3, after: $after) {
                    edges { cursor node { name unitCount } }
                    pageInfo { hasNextPage endCursor }
                }
            }
        }"#;
        let (first_page, errors) = execute(&schema, query, json!({ "id": id })).await;
        assert!(errors.is_empty(), "{:?}", errors);
        let first_uses = &first_page["property"]["propertyUses"];
        assert_eq!(first_uses["pageInfo"]["hasNextPage"], true);
        let end_cursor = first_uses["pageInfo"]["endCursor"].clone();

        let (second_page, errors) =
            execute(&schema, query, json!({ "id": id, "after": end_cursor })).await;
        assert!(errors.is_empty(), "{:?}", errors);
        let second_uses = &second_page["property"]["propertyUses"];
        assert_eq!(second_uses["pageInfo"]["hasNextPage"], false);
        assert_eq!(
            second_uses["edges"],
            json!([
                {"cursor": second_uses["edges"][0]["cursor"], "node": {"name": "Residential", "unitCount": 10}},
                {"cursor": second_uses["edges"][1]["cursor"], "node": {"name": "Storage", "unitCount": 40}}
            ])
        );
    }

    #[tokio::test]
    async fn property_without_uses_counts_zero() {
        let (schema, store) = seeded_schema().await;
        let empty = Property::new("Zeta Lot");
        let id = empty._id.to_string();
        store.insert_property(empty).await.unwrap();
        let (data, errors) = execute(
            &schema,
            r#"query ($id: ID!) {
                property(id: $id) { livingUnits propertyUses { totalCount } }
            }"#,
            json!({ "id": id }),
        )
        .await;
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(
            data,
            json!({"property": {"livingUnits": 0, "propertyUses": {"totalCount": 0}}})
        );
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_resolve_to_null() {
        let (schema, _) = seeded_schema().await;
        for id in [bson::Uuid::new().to_string(), "not-a-uuid".to_string()] {
            let (data, errors) = execute(
                &schema,
                "query ($id: ID!) { property(id: $id) { name } }",
                json!({ "id": id }),
            )
            .await;
            assert!(errors.is_empty(), "{:?}", errors);
            assert_eq!(data, json!({"property": null}));
        }
    }

    #[tokio::test]
    async fn entity_resolver_reports_missing_properties() {
        let (schema, _) = seeded_schema().await;
        let id = alpha_tower_id(&schema).await;
        let query = r#"query ($representations: [_Any!]!) {
            _entities(representations: $representations) { ... on Property { name } }
        }"#;
        let (data, errors) = execute(
            &schema,
            query,
            json!({ "representations": [{"__typename": "Property", "id": id}] }),
        )
        .await;
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(data, json!({"_entities": [{"name": "Alpha Tower"}]}));

        for missing in [bson::Uuid::new().to_string(), "not-a-uuid".to_string()] {
            let (_, errors) = execute(
                &schema,
                query,
                json!({ "representations": [{"__typename": "Property", "id": missing}] }),
            )
            .await;
            assert_eq!(
                errors,
                vec![format!("Property with UUID: `{}` not found.", missing)]
            );
        }
    }

    #[tokio::test]
    async fn undecodable_cursor_is_reported_for_pages() {
        let (schema, _) = seeded_schema().await;
        let id = alpha_tower_id(&schema).await;
        let (_, errors) = execute(
            &schema,
            r#"query ($id: ID!) {
                property(id: $id) { propertyUses(after: "garbage") { edges { cursor } } }
            }"#,
            json!({ "id": id }),
        )
        .await;
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Unsupported cursor type"), "{}", errors[0]);
    }

    #[tokio::test]
    async fn cursor_of_another_connection_is_reported() {
        let (schema, _) = seeded_schema().await;
        let id = alpha_tower_id(&schema).await;
        let (data, errors) = execute(
            &schema,
            "{ properties(first: 1) { pageInfo { endCursor } } }",
            json!({}),
        )
        .await;
        assert!(errors.is_empty(), "{:?}", errors);
        let property_cursor = data["properties"]["pageInfo"]["endCursor"].clone();
        let (_, errors) = execute(
            &schema,
            r#"query ($id: ID!, $after: String) {
                property(id: $id) { propertyUses(after: $after) { edges { cursor } } }
            }"#,
            json!({ "id": id, "after": property_cursor }),
        )
        .await;
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Unsupported cursor type"), "{}", errors[0]);
    }

    #[tokio::test]
    async fn rejects_first_together_with_last() {
        let (schema, _) = seeded_schema().await;
        let (_, errors) = execute(
            &schema,
            "{ properties(first: 1, last: 1) { totalCount } }",
            json!({}),
        )
        .await;
        assert_eq!(
            errors,
            vec!["The `first` and `last` arguments cannot be used at the same time.".to_string()]
        );
    }

    #[tokio::test]
    async fn connection_without_facets_fetches_nothing() {
        let (schema, _) = seeded_schema().await;
        let id = alpha_tower_id(&schema).await;
        let (data, errors) = execute(
            &schema,
            "query ($id: ID!) { property(id: $id) { propertyUses { __typename } } }",
            json!({ "id": id }),
        )
        .await;
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(
            data["property"]["propertyUses"]["__typename"],
            "PropertyUseConnection"
        );
    }

    #[tokio::test]
    async fn lists_properties_by_name_with_living_units() {
        let (schema, _) = seeded_schema().await;
        let (data, errors) = execute(
            &schema,
            "{ properties(last: 2) { totalCount edges { node { name livingUnits } } pageInfo { hasPreviousPage } } }",
            json!({}),
        )
        .await;
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(
            data,
            json!({"properties": {
                "totalCount": 5,
                "edges": [
                    {"node": {"name": "Epsilon Center", "livingUnits": 150}},
                    {"node": {"name": "Gamma Plaza", "livingUnits": 150}}
                ],
                "pageInfo": {"hasPreviousPage": true}
            }})
        );
    }
}
