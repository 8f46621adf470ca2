//! sparql: command-line client for SPARQL 1.1 Protocol endpoints
//!
//! Uses the sparql-client library to run queries and updates against a
//! remote endpoint.

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use sparql_client::rdf::{Dataset, NamedNode};
use sparql_client::{
    ClientConfig, GraphSelector, ProtocolVersion, QueryForm, QueryOptions, RequestMethod,
    ResultFormat, SparqlClient, SparqlResults, UpdateOptions,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sparql", version, about = "SPARQL 1.1 Protocol client")]
struct Cli {
    /// YAML client configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SPARQL endpoint URL
    #[arg(long, global = true, env = "SPARQL_ENDPOINT")]
    endpoint: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
    Tsv,
    Xml,
    Turtle,
    Ntriples,
    Nquads,
    Rdfxml,
    Jsonld,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a SPARQL query
    Query {
        /// The query string
        query: String,

        /// Send the query without parsing it (requires --form)
        #[arg(long)]
        raw: bool,

        /// Query form, used in raw mode
        #[arg(long)]
        form: Option<QueryForm>,

        /// GET or POST
        #[arg(long)]
        method: Option<RequestMethod>,

        /// SPARQL protocol version, 1.0 or 1.1
        #[arg(long)]
        protocol: Option<ProtocolVersion>,

        /// Result format to request
        #[arg(long)]
        result_format: Option<ResultFormat>,

        /// default-graph-uri parameter, repeatable
        #[arg(long)]
        default_graph: Vec<String>,

        /// named-graph-uri parameter, repeatable
        #[arg(long)]
        named_graph: Vec<String>,
    },
    /// Send a raw SPARQL update
    Update {
        update: String,
    },
    /// LOAD a document into the store
    Load {
        from: String,
        #[arg(long)]
        into: Option<String>,
        #[arg(long)]
        silent: bool,
    },
    /// CLEAR default, named, all or a graph IRI
    Clear {
        graph: GraphSelector,
        #[arg(long)]
        silent: bool,
    },
    /// DROP default, named, all or a graph IRI
    Drop {
        graph: GraphSelector,
        #[arg(long)]
        silent: bool,
    },
    /// CREATE a graph
    Create {
        graph: String,
        #[arg(long)]
        silent: bool,
    },
    /// COPY one graph to another
    Copy {
        from: GraphSelector,
        to: GraphSelector,
        #[arg(long)]
        silent: bool,
    },
    /// MOVE one graph to another
    Move {
        from: GraphSelector,
        to: GraphSelector,
        #[arg(long)]
        silent: bool,
    },
    /// ADD one graph to another
    Add {
        from: GraphSelector,
        to: GraphSelector,
        #[arg(long)]
        silent: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => ClientConfig::from_yaml_file(path)?,
        None => ClientConfig::default(),
    };
    let client = SparqlClient::new(config)?;
    let endpoint = cli
        .endpoint
        .ok_or("no endpoint given, use --endpoint or SPARQL_ENDPOINT")?;
    let format = cli.format;

    match cli.command {
        Commands::Query {
            query,
            raw,
            form,
            method,
            protocol,
            result_format,
            default_graph,
            named_graph,
        } => {
            let raw = raw || client.config().raw_mode;
            let mut options = QueryOptions::new().raw(raw);
            options.request_method = method;
            options.protocol_version = protocol;
            options.result_format = result_format;
            for graph in &default_graph {
                options = options.with_default_graph(NamedNode::new(graph)?);
            }
            for graph in &named_graph {
                options = options.with_named_graph(NamedNode::new(graph)?);
            }

            let results = if raw {
                let form = form.ok_or("--raw needs --form select|ask|construct|describe")?;
                run_form_query(&client, &endpoint, form, &query, &options).await?
            } else {
                client.query(&endpoint, &query, &options).await?
            };
            print_results(&results, format)
        }
        Commands::Update { update } => {
            client.update(&endpoint, &update, &UpdateOptions::new().raw(true)).await?;
            println!("OK");
            Ok(())
        }
        Commands::Load { from, into, silent } => {
            let into = into.as_deref().map(NamedNode::new).transpose()?;
            client.load(&endpoint, from.as_str(), into, &UpdateOptions::new().silent(silent)).await?;
            println!("OK");
            Ok(())
        }
        Commands::Clear { graph, silent } => {
            client.clear(&endpoint, &graph, &UpdateOptions::new().silent(silent)).await?;
            println!("OK");
            Ok(())
        }
        Commands::Drop { graph, silent } => {
            client.drop(&endpoint, &graph, &UpdateOptions::new().silent(silent)).await?;
            println!("OK");
            Ok(())
        }
        Commands::Create { graph, silent } => {
            client.create(&endpoint, graph.as_str(), &UpdateOptions::new().silent(silent)).await?;
            println!("OK");
            Ok(())
        }
        Commands::Copy { from, to, silent } => {
            client.copy(&endpoint, &from, &to, &UpdateOptions::new().silent(silent)).await?;
            println!("OK");
            Ok(())
        }
        Commands::Move { from, to, silent } => {
            client.move_graph(&endpoint, &from, &to, &UpdateOptions::new().silent(silent)).await?;
            println!("OK");
            Ok(())
        }
        Commands::Add { from, to, silent } => {
            client.add(&endpoint, &from, &to, &UpdateOptions::new().silent(silent)).await?;
            println!("OK");
            Ok(())
        }
    }
}

async fn run_form_query(
    client: &SparqlClient,
    endpoint: &str,
    form: QueryForm,
    query: &str,
    options: &QueryOptions,
) -> Result<SparqlResults, Box<dyn std::error::Error>> {
    let results = match form {
        QueryForm::Select => SparqlResults::Bindings(client.select(endpoint, query, options).await?),
        QueryForm::Ask => SparqlResults::Boolean(client.ask(endpoint, query, options).await?),
        QueryForm::Construct => SparqlResults::Dataset(client.construct(endpoint, query, options).await?),
        QueryForm::Describe => SparqlResults::Dataset(client.describe(endpoint, query, options).await?),
    };
    Ok(results)
}

fn print_results(results: &SparqlResults, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let result_format = match format {
        OutputFormat::Table => {
            print_table(results);
            return Ok(());
        }
        OutputFormat::Json if results.form().is_graph_form() => ResultFormat::JsonLd,
        OutputFormat::Json => ResultFormat::Json,
        OutputFormat::Csv => ResultFormat::Csv,
        OutputFormat::Tsv => ResultFormat::Tsv,
        OutputFormat::Xml => ResultFormat::Xml,
        OutputFormat::Turtle => ResultFormat::Turtle,
        OutputFormat::Ntriples => ResultFormat::NTriples,
        OutputFormat::Nquads => ResultFormat::NQuads,
        OutputFormat::Rdfxml => ResultFormat::RdfXml,
        OutputFormat::Jsonld => ResultFormat::JsonLd,
    };

    let output = results.serialize(result_format)?;
    if matches!(result_format, ResultFormat::Json | ResultFormat::JsonLd) {
        let value: serde_json::Value = serde_json::from_str(&output)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", output);
    }
    Ok(())
}

fn print_table(results: &SparqlResults) {
    match results {
        SparqlResults::Boolean(value) => println!("{}", value),
        SparqlResults::Bindings(solutions) => {
            if solutions.variables.is_empty() {
                println!("(no results)");
                return;
            }

            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(&solutions.variables);

            for solution in solutions.iter() {
                let cells: Vec<String> = solutions
                    .variables
                    .iter()
                    .map(|v| solution.get(v).map(|t| t.to_string()).unwrap_or_default())
                    .collect();
                table.add_row(cells);
            }

            println!("{}", table);
            println!("{} row(s)", solutions.len());
        }
        SparqlResults::Graph(graph) => print_quads(&Dataset::from(graph.clone())),
        SparqlResults::Dataset(dataset) => print_quads(dataset),
    }
}

fn print_quads(dataset: &Dataset) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["subject", "predicate", "object", "graph"]);

    for quad in dataset.quads() {
        table.add_row(vec![
            quad.subject.to_string(),
            quad.predicate.to_string(),
            quad.object.to_string(),
            quad.graph.map(|g| g.to_string()).unwrap_or_default(),
        ]);
    }

    println!("{}", table);
    println!("{} triple(s)", dataset.len());
}
