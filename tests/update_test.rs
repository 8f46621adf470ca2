//! Integration tests for SPARQL updates
//!
//! Wire shapes of direct and URL-encoded updates, generated update text and
//! the raw update guard.

mod common;

use common::{client, ENDPOINT};
use sparql_client::rdf::{
    Dataset, Description, Literal, NamedNode, PrefixMap, Quad, RdfPredicate, Triple,
};
use sparql_client::{
    ClientConfig, GraphSelector, HttpResponse, RequestMethod, SparqlClientError, UpdateOptions,
    UpdateRequestMethod,
};

fn iri(s: &str) -> NamedNode {
    NamedNode::new(s).unwrap()
}

fn triple(subject: &str) -> Triple {
    Triple::new(
        iri(subject).into(),
        RdfPredicate::new("http://example.org/p").unwrap(),
        Literal::new_simple_literal("v").into(),
    )
}

fn dataset() -> Dataset {
    let mut dataset = Dataset::new();
    dataset.insert(Quad::from_triple(triple("http://example.org/s1")));
    dataset.insert(Quad::new(
        iri("http://example.org/s2").into(),
        RdfPredicate::new("http://example.org/p").unwrap(),
        Literal::new_simple_literal("v").into(),
        Some(iri("http://example.org/g")),
    ));
    dataset
}

#[tokio::test]
async fn test_direct_update_wire_shape() {
    let (client, transport) = client(ClientConfig::default());
    let options = UpdateOptions::new().with_using_graph(iri("http://example.org/g"));

    client.clear(ENDPOINT, &GraphSelector::All, &options).await.unwrap();

    let request = transport.last_request();
    assert_eq!(request.method.as_str(), "POST");
    assert_eq!(request.headers["content-type"], "application/sparql-update");
    assert!(request.headers.get("accept").is_none());
    assert_eq!(
        request.full_url(),
        "http://example.org/sparql?using-graph-uri=http%3A%2F%2Fexample.org%2Fg"
    );
    assert_eq!(transport.body(), "CLEAR ALL");
}

#[tokio::test]
async fn test_url_encoded_update_wire_shape() {
    let (client, transport) = client(ClientConfig::default());
    let options = UpdateOptions::new()
        .with_request_method(UpdateRequestMethod::UrlEncoded)
        .with_using_graph(iri("http://example.org/d"))
        .with_using_named_graph(iri("http://example.org/n"));

    client.drop(ENDPOINT, &GraphSelector::Default, &options).await.unwrap();

    let request = transport.last_request();
    assert_eq!(request.method.as_str(), "POST");
    assert_eq!(request.headers["content-type"], "application/x-www-form-urlencoded");
    assert_eq!(request.full_url(), ENDPOINT);
    assert_eq!(
        transport.body(),
        "update=DROP%20DEFAULT\
         &using-graph-uri=http%3A%2F%2Fexample.org%2Fd\
         &using-named-graph-uri=http%3A%2F%2Fexample.org%2Fn"
    );
}

#[tokio::test]
async fn test_update_request_method_from_config() {
    let config = ClientConfig::default().with_update_request_method(UpdateRequestMethod::UrlEncoded);
    let (client, transport) = client(config);

    client
        .create(ENDPOINT, "http://example.org/g", &UpdateOptions::new())
        .await
        .unwrap();
    assert_eq!(
        transport.body(),
        "update=CREATE%20GRAPH%20%3Chttp%3A%2F%2Fexample.org%2Fg%3E"
    );
}

#[tokio::test]
async fn test_insert_data_wraps_named_graphs() {
    let (client, transport) = client(ClientConfig::default());

    client.insert_data(ENDPOINT, dataset(), &UpdateOptions::new()).await.unwrap();

    let body = transport.body();
    assert!(body.starts_with("INSERT DATA {\n<http://example.org/s1>"));
    assert_eq!(body.matches("GRAPH <http://example.org/g> {").count(), 1);

    let graph_block = &body[body.find("GRAPH").unwrap()..];
    assert!(graph_block.contains("<http://example.org/s2>"));
    assert!(!graph_block.contains("<http://example.org/s1>"));
}

#[tokio::test]
async fn test_delete_data_merge_graphs() {
    let (client, transport) = client(ClientConfig::default());

    client
        .delete_data(ENDPOINT, dataset(), &UpdateOptions::new().merge_graphs(true))
        .await
        .unwrap();

    let body = transport.body();
    assert!(body.starts_with("DELETE DATA {\n"));
    assert!(!body.contains("GRAPH"));
    assert!(body.contains("<http://example.org/s1>"));
    assert!(body.contains("<http://example.org/s2>"));
}

#[tokio::test]
async fn test_insert_description_with_prefixes() {
    let (client, transport) = client(ClientConfig::default());
    let description = Description::new(iri("http://example.org/alice"))
        .add(
            RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap(),
            Literal::new_simple_literal("Alice"),
        )
        .with_prefixes(PrefixMap::new().with_prefix("foaf", "http://xmlns.com/foaf/0.1/"));

    client
        .insert_data(ENDPOINT, description.clone(), &UpdateOptions::new())
        .await
        .unwrap();
    assert!(transport
        .body()
        .starts_with("PREFIX foaf: <http://xmlns.com/foaf/0.1/>\nINSERT DATA {"));

    let options = UpdateOptions::new().with_prefixes(PrefixMap::new().with_prefix("ex", "http://example.org/"));
    client.insert_data(ENDPOINT, description, &options).await.unwrap();
    let body = transport.body();
    assert!(body.starts_with("PREFIX ex: <http://example.org/>\nINSERT DATA {"));
    assert!(!body.contains("PREFIX foaf:"));
}

#[tokio::test]
async fn test_graph_management_updates() {
    let (client, transport) = client(ClientConfig::default());
    let g = GraphSelector::graph("http://example.org/g").unwrap();
    let silent = UpdateOptions::new().silent(true);

    client
        .load(ENDPOINT, "http://example.org/data.ttl", Some(iri("http://example.org/g")), &silent)
        .await
        .unwrap();
    assert_eq!(
        transport.body(),
        "LOAD SILENT <http://example.org/data.ttl> INTO GRAPH <http://example.org/g>"
    );

    client.copy(ENDPOINT, &GraphSelector::Default, &g, &UpdateOptions::new()).await.unwrap();
    assert_eq!(transport.body(), "COPY DEFAULT TO GRAPH <http://example.org/g>");

    client.move_graph(ENDPOINT, &g, &GraphSelector::Default, &silent).await.unwrap();
    assert_eq!(transport.body(), "MOVE SILENT GRAPH <http://example.org/g> TO DEFAULT");

    client.add(ENDPOINT, &g, &GraphSelector::Default, &UpdateOptions::new()).await.unwrap();
    assert_eq!(transport.body(), "ADD GRAPH <http://example.org/g> TO DEFAULT");

    client.clear(ENDPOINT, &g, &UpdateOptions::new()).await.unwrap();
    assert_eq!(transport.body(), "CLEAR GRAPH <http://example.org/g>");

    client.drop(ENDPOINT, &GraphSelector::Named, &silent).await.unwrap();
    assert_eq!(transport.body(), "DROP SILENT NAMED");

    assert_eq!(transport.requests().len(), 6);
}

#[tokio::test]
async fn test_invalid_graph_arguments_fail_locally() {
    let (client, transport) = client(ClientConfig::default());

    let err = client
        .add(ENDPOINT, &GraphSelector::All, &GraphSelector::Default, &UpdateOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SparqlClientError::InvalidOption { option: "graph", .. }));

    let err = client
        .load(ENDPOINT, "relative/data.ttl", None, &UpdateOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SparqlClientError::Rdf(_)));

    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_raw_update_requires_raw_mode() {
    let (client, transport) = client(ClientConfig::default());
    let text = "DELETE WHERE { ?s ?p ?o }";

    let err = client.update(ENDPOINT, text, &UpdateOptions::new()).await.unwrap_err();
    assert!(matches!(err, SparqlClientError::RawModeRequired));
    assert!(transport.requests().is_empty());

    client.update(ENDPOINT, text, &UpdateOptions::new().raw(true)).await.unwrap();
    assert_eq!(transport.body(), text);

    let (client, transport) = common::client(ClientConfig::default().with_raw_mode(true));
    client.update(ENDPOINT, text, &UpdateOptions::new()).await.unwrap();
    assert_eq!(transport.body(), text);
}

#[tokio::test]
async fn test_update_http_error() {
    let (client, transport) = client(ClientConfig::default());
    transport.respond(HttpResponse::new(500).with_body("store is read-only"));

    let err = client
        .clear(ENDPOINT, &GraphSelector::Default, &UpdateOptions::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(500));

    let request = err.request().unwrap();
    assert_eq!(request.method, RequestMethod::Post);
    assert_eq!(request.payload, "CLEAR DEFAULT");
    assert_eq!(request.operation.to_string(), "clear update");
}
