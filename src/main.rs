use std::{env, error::Error, fs, sync::Arc};

use async_graphql::{EmptyMutation, EmptySubscription, SDLExportOptions, Schema, http::GraphiQLSource};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Router,
    extract::State,
    response::{self, IntoResponse},
    routing::get,
};
use clap::Parser;
use log::info;
use mongodb::{Client, options::ClientOptions};
use simple_logger::SimpleLogger;

mod diagnose;
use diagnose::{DiagnosticTarget, run_diagnosis};

mod graphql;
use graphql::{PropertySchema, build_schema, query::Query};

mod pagination;

mod seed;
use seed::seed;

mod store;
use store::{MemoryStore, MongoStore, Store};

/// Database used if `$MONGODB_DATABASE` is not set.
const DEFAULT_DATABASE: &str = "property-database";

/// Builds the GraphiQL frontend.
async fn graphiql() -> impl IntoResponse {
    response::Html(GraphiQLSource::build().endpoint("/").finish())
}

/// Establishes database connection and returns the client.
async fn db_connection() -> Result<Client, Box<dyn Error>> {
    let uri = env::var("MONGODB_URI").map_err(|_| "$MONGODB_URI is not set.")?;

    // Parse a connection string into an options struct.
    let mut client_options = ClientOptions::parse(uri).await?;

    // Manually set an option.
    client_options.app_name = Some("Property".to_string());

    // Get a handle to the deployment.
    Ok(Client::with_options(client_options)?)
}

/// Selects the store backend.
///
/// The in-memory store starts empty, the MongoDB store connects to `$MONGODB_URI`.
async fn build_store(in_memory: bool) -> Result<Store, Box<dyn Error>> {
    if in_memory {
        info!("Using in-memory store.");
        return Ok(Store::Memory(Arc::new(MemoryStore::new())));
    }
    let client = db_connection().await?;
    let database_name =
        env::var("MONGODB_DATABASE").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());
    info!("Using MongoDB database `{}`.", database_name);
    Ok(Store::Mongo(MongoStore::new(client.database(&database_name))))
}

/// Command line arguments selecting what the binary does.
///
/// Without `--generate-schema`, `--seed`, `--diagnose` or `--endpoint` the GraphQL service is started.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Generates GraphQL schema in `./schemas/property.graphql`.
    #[arg(long)]
    generate_schema: bool,
    /// Replaces the content of the store with the demo data set.
    #[arg(long)]
    seed: bool,
    /// Runs the count-only pagination diagnosis against this process.
    #[arg(long)]
    diagnose: bool,
    /// Runs the count-only pagination diagnosis against a running service at this URL instead.
    #[arg(long)]
    endpoint: Option<String>,
    /// Uses an in-memory store which is seeded on startup instead of MongoDB.
    #[arg(long)]
    in_memory: bool,
    /// Port the GraphQL service listens on.
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

/// Activates logger and parses arguments. Generates the schema, seeds, diagnoses or starts the GraphQL server.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::new().init()?;

    let args = Args::parse();
    if args.generate_schema {
        return generate_schema();
    }
    if let Some(endpoint) = args.endpoint {
        run_diagnosis(&DiagnosticTarget::remote(endpoint)).await?;
        return Ok(());
    }
    let store = build_store(args.in_memory).await?;
    if args.seed || args.in_memory {
        seed(&store).await?;
    }
    if args.diagnose {
        run_diagnosis(&DiagnosticTarget::InProcess(build_schema(store))).await?;
    } else if !args.seed || args.in_memory {
        start_service(store, args.port).await?;
    }
    Ok(())
}

/// Writes the SDL of the schema to `./schemas/property.graphql`.
fn generate_schema() -> Result<(), Box<dyn Error>> {
    let schema = Schema::build(Query, EmptyMutation, EmptySubscription).finish();
    fs::create_dir_all("./schemas")?;
    let sdl_export_options = SDLExportOptions::new().federation();
    let schema_sdl = schema.sdl_with_options(sdl_export_options);
    fs::write("./schemas/property.graphql", schema_sdl)?;
    info!("GraphQL schema: ./schemas/property.graphql was successfully generated!");
    Ok(())
}

/// Describes the handler for GraphQL requests.
async fn graphql_handler(
    State(schema): State<PropertySchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

/// Starts property service on `port`.
async fn start_service(store: Store, port: u16) -> Result<(), Box<dyn Error>> {
    let schema = build_schema(store);
    let app = Router::new()
        .route("/", get(graphiql).post(graphql_handler))
        .with_state(schema);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("GraphiQL IDE: http://0.0.0.0:{}", port);
    axum::serve(listener, app).await?;
    Ok(())
}
