//! Scripted check of count-only pagination on the `propertyUses` connection.
//!
//! Sends three documents against the first property (by name) and looks for the
//! `Unsupported cursor type` error that affected implementations report when a connection is asked
//! for its `totalCount` alone.

use async_graphql::{Request, Variables};
use graphql_client::{QueryBody, Response};
use log::{error, info, warn};
use serde_json::{Value, json};
use thiserror::Error;

use crate::graphql::PropertySchema;

/// Literal substring identifying the cursor error.
pub const CURSOR_ERROR_MARKER: &str = "Unsupported cursor type";

const SECTION_WIDTH: usize = 70;

/// Errors which prevent a diagnosis from running.
#[derive(Debug, Error)]
pub enum DiagnoseError {
    #[error("Request to GraphQL endpoint failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GraphQL response could not be converted to JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No properties found. Run with `--seed` first.")]
    NoProperties,
}

/// A fixed request document of the diagnosis.
pub struct Scenario {
    pub title: &'static str,
    pub explanation: &'static str,
    pub operation_name: &'static str,
    pub query: &'static str,
}

/// The three documents of the diagnosis, in execution order.
pub const SCENARIOS: [Scenario; 3] = [
    Scenario {
        title: "TEST 1: Query with ONLY totalCount",
        explanation: "Affected implementations fail with 'Unsupported cursor type' here, \
            because the connection has totalCount but NO edges and NO pageInfo.",
        operation_name: "PropertyTotalCountOnly",
        query: r#"
            query PropertyTotalCountOnly($id: ID!) {
                property(id: $id) {
                    name
                    livingUnits
                    propertyUses {
                        totalCount
                    }
                }
            }
        "#,
    },
    Scenario {
        title: "TEST 2: Query WITH edges",
        explanation: "Adding 'edges' avoids the cursor type error in affected implementations.",
        operation_name: "PropertyWithEdges",
        query: r#"
            query PropertyWithEdges($id: ID!) {
                property(id: $id) {
                    name
                    livingUnits
                    propertyUses {
                        totalCount
                        edges {
                            node {
                                id
                                name
                                unitCount
                            }
                        }
                    }
                }
            }
        "#,
    },
    Scenario {
        title: "TEST 3: Query WITH pageInfo",
        explanation: "Adding 'pageInfo' also avoids the cursor type error in affected implementations.",
        operation_name: "PropertyWithPageInfo",
        query: r#"
            query PropertyWithPageInfo($id: ID!) {
                property(id: $id) {
                    name
                    livingUnits
                    propertyUses {
                        totalCount
                        pageInfo {
                            hasNextPage
                            hasPreviousPage
                            startCursor
                            endCursor
                        }
                    }
                }
            }
        "#,
    },
];

const FIRST_PROPERTY_QUERY: &str = r#"
    query FirstProperty {
        properties(first: 1) {
            edges {
                node {
                    id
                }
            }
        }
    }
"#;

/// Data and error messages of an executed document.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticResponse {
    pub data: Value,
    pub errors: Vec<String>,
}

/// Where the documents are executed.
pub enum DiagnosticTarget {
    /// Executes against a schema in this process.
    InProcess(PropertySchema),
    /// Posts to the GraphQL endpoint of a running service.
    Remote {
        endpoint: String,
        client: reqwest::Client,
    },
}

impl DiagnosticTarget {
    pub fn remote(endpoint: String) -> Self {
        Self::Remote {
            endpoint,
            client: reqwest::Client::new(),
        }
    }

    async fn execute(
        &self,
        query: &'static str,
        operation_name: &'static str,
        variables: Value,
    ) -> Result<DiagnosticResponse, DiagnoseError> {
        match self {
            DiagnosticTarget::InProcess(schema) => {
                let request = Request::new(query)
                    .operation_name(operation_name)
                    .variables(Variables::from_json(variables));
                let response = schema.execute(request).await;
                let errors = response
                    .errors
                    .into_iter()
                    .map(|server_error| server_error.message)
                    .collect();
                Ok(DiagnosticResponse {
                    data: response.data.into_json()?,
                    errors,
                })
            }
            DiagnosticTarget::Remote { endpoint, client } => {
                let request_body = QueryBody {
                    variables,
                    query,
                    operation_name,
                };
                let response_body: Response<Value> = client
                    .post(endpoint.as_str())
                    .json(&request_body)
                    .send()
                    .await?
                    .json()
                    .await?;
                let errors = response_body
                    .errors
                    .unwrap_or_default()
                    .into_iter()
                    .map(|graphql_error| graphql_error.message)
                    .collect();
                Ok(DiagnosticResponse {
                    data: response_body.data.unwrap_or(Value::Null),
                    errors,
                })
            }
        }
    }

    /// Retrieves the UUID of the first property by name.
    async fn first_property_id(&self) -> Result<String, DiagnoseError> {
        let response = self
            .execute(FIRST_PROPERTY_QUERY, "FirstProperty", json!({}))
            .await?;
        response.data["properties"]["edges"][0]["node"]["id"]
            .as_str()
            .map(str::to_string)
            .ok_or(DiagnoseError::NoProperties)
    }
}

/// Classification of an executed document.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No errors were reported.
    Succeeded(Value),
    /// Errors were reported, `cursor_error` holds the first one containing `CURSOR_ERROR_MARKER`.
    Failed {
        errors: Vec<String>,
        cursor_error: Option<String>,
    },
}

impl Outcome {
    pub fn classify(response: DiagnosticResponse) -> Self {
        if response.errors.is_empty() {
            return Outcome::Succeeded(response.data);
        }
        let cursor_error = response
            .errors
            .iter()
            .find(|message| message.contains(CURSOR_ERROR_MARKER))
            .cloned();
        Outcome::Failed {
            errors: response.errors,
            cursor_error,
        }
    }

    pub fn cursor_error(&self) -> Option<&str> {
        match self {
            Outcome::Succeeded(_) => None,
            Outcome::Failed { cursor_error, .. } => cursor_error.as_deref(),
        }
    }
}

/// Outcomes of all scenarios.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub outcomes: Vec<(&'static str, Outcome)>,
}

impl Report {
    /// Cursor errors prefixed with the scenario that produced them.
    pub fn cursor_errors(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(index, (_, outcome))| {
                outcome
                    .cursor_error()
                    .map(|message| format!("Test {}: {}", index + 1, message))
            })
            .collect()
    }

    pub fn cursor_error_detected(&self) -> bool {
        self.outcomes
            .iter()
            .any(|(_, outcome)| outcome.cursor_error().is_some())
    }
}

/// Runs all scenarios sequentially against the first property and logs a summary.
pub async fn run_diagnosis(target: &DiagnosticTarget) -> Result<Report, DiagnoseError> {
    let property_id = target.first_property_id().await?;
    let mut outcomes = Vec::with_capacity(SCENARIOS.len());
    for scenario in &SCENARIOS {
        log_section(scenario.title);
        info!("{}", scenario.explanation);
        let response = target
            .execute(
                scenario.query,
                scenario.operation_name,
                json!({ "id": property_id }),
            )
            .await?;
        let outcome = Outcome::classify(response);
        log_outcome(&outcome)?;
        outcomes.push((scenario.title, outcome));
    }
    let report = Report { outcomes };
    log_summary(&report);
    Ok(report)
}

fn log_section(title: &str) {
    info!("{}", "=".repeat(SECTION_WIDTH));
    info!("{}", title);
    info!("{}", "=".repeat(SECTION_WIDTH));
}

fn log_outcome(outcome: &Outcome) -> Result<(), DiagnoseError> {
    match outcome {
        Outcome::Succeeded(data) => {
            info!("Query executed successfully.");
            info!("Result: {}", serde_json::to_string_pretty(data)?);
        }
        Outcome::Failed {
            errors,
            cursor_error,
        } => {
            error!("Errors found: {:?}", errors);
            if cursor_error.is_some() {
                error!("Cursor error confirmed: {}", CURSOR_ERROR_MARKER);
            }
        }
    }
    Ok(())
}

fn log_summary(report: &Report) {
    log_section("SUMMARY");
    if report.cursor_error_detected() {
        error!("CURSOR ERROR CONFIRMED: '{}' detected!", CURSOR_ERROR_MARKER);
        for message in report.cursor_errors() {
            error!("   - {}", message);
        }
        info!("The cursor error occurs when:");
        info!("  1. A field (livingUnits) selects from a relation (propertyUses)");
        info!("  2. The same relation is used in a connection with ONLY totalCount");
        info!("  3. NO 'edges' and NO 'pageInfo' are included");
        info!("Workarounds: include 'edges' or 'pageInfo' in the query.");
    } else {
        info!("No cursor type error detected in this run.");
        let failed = report
            .outcomes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, Outcome::Failed { .. }))
            .count();
        if failed > 0 {
            warn!("{} scenario(s) failed for other reasons.", failed);
        }
    }
    info!("{}", "=".repeat(SECTION_WIDTH));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        graphql::build_schema,
        seed::seed,
        store::{MemoryStore, Store},
    };

    #[test]
    fn classifies_cursor_errors_by_substring() {
        let outcome = Outcome::classify(DiagnosticResponse {
            data: Value::Null,
            errors: vec![
                "Something else".to_string(),
                "Unsupported cursor type undefined".to_string(),
            ],
        });
        assert_eq!(
            outcome.cursor_error(),
            Some("Unsupported cursor type undefined")
        );

        let other_failure = Outcome::classify(DiagnosticResponse {
            data: Value::Null,
            errors: vec!["Something else".to_string()],
        });
        assert_eq!(other_failure.cursor_error(), None);

        let success = Outcome::classify(DiagnosticResponse {
            data: json!({"property": null}),
            errors: vec![],
        });
        assert_eq!(success, Outcome::Succeeded(json!({"property": null})));
    }

    #[test]
    fn report_prefixes_cursor_errors_with_scenario() {
        let report = Report {
            outcomes: vec![
                (
                    SCENARIOS[0].title,
                    Outcome::Failed {
                        errors: vec!["Unsupported cursor type".to_string()],
                        cursor_error: Some("Unsupported cursor type".to_string()),
                    },
                ),
                (SCENARIOS[1].title, Outcome::Succeeded(Value::Null)),
            ],
        };
        assert!(report.cursor_error_detected());
        assert_eq!(
            report.cursor_errors(),
            vec!["Test 1: Unsupported cursor type".to_string()]
        );
    }

    #[tokio::test]
    async fn seeded_service_passes_all_scenarios() {
        let store = Store::Memory(Arc::new(MemoryStore::new()));
        seed(&store).await.unwrap();
        let target = DiagnosticTarget::InProcess(build_schema(store));
        let report = run_diagnosis(&target).await.unwrap();
        assert!(!report.cursor_error_detected());
        assert_eq!(report.outcomes.len(), 3);
        for (title, outcome) in &report.outcomes {
            match outcome {
                Outcome::Succeeded(data) => {
                    assert_eq!(data["property"]["name"], "Alpha Tower", "{}", title);
                    assert_eq!(data["property"]["livingUnits"], 150, "{}", title);
                    assert_eq!(data["property"]["propertyUses"]["totalCount"], 5, "{}", title);
                }
                failed => panic!("{} failed: {:?}", title, failed),
            }
        }
    }

    #[tokio::test]
    async fn empty_store_aborts_diagnosis() {
        let store = Store::Memory(Arc::new(MemoryStore::new()));
        let target = DiagnosticTarget::InProcess(build_schema(store));
        let result = run_diagnosis(&target).await;
        assert!(matches!(result, Err(DiagnoseError::NoProperties)));
    }
}
