//! SparqlClient: public entry points
//!
//! Every call builds a fresh [`Request`] through an operation strategy,
//! executes it and lets the strategy evaluate the response. The client
//! holds no mutable state, so it can be shared between tasks.

use crate::config::ClientConfig;
use crate::error::{SparqlClientError, SparqlClientResult};
use crate::rdf::{Dataset, IntoIri, NamedNode};
use crate::sparql::update::{self, GraphSelector, UpdateData};
use crate::sparql::{
    OperationStrategy, QueryForm, QueryOperation, QueryOptions, Request, Solutions, SparqlResults,
    UpdateForm, UpdateOperation, UpdateOptions,
};
use crate::transport::{Executor, HttpTransport, ReqwestTransport};
use std::sync::Arc;
use tracing::debug;

/// Client of SPARQL 1.1 Protocol endpoints
///
/// # Example
/// ```no_run
/// # use sparql_client::{ClientConfig, SparqlClient, QueryOptions};
/// # async fn run() -> sparql_client::SparqlClientResult<()> {
/// let client = SparqlClient::new(ClientConfig::default())?;
/// let solutions = client
///     .select("https://dbpedia.org/sparql", "SELECT * WHERE { ?s ?p ?o } LIMIT 3", &QueryOptions::new())
///     .await?;
/// println!("{} rows", solutions.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SparqlClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn HttpTransport>,
}

impl SparqlClient {
    /// Client sending requests with `reqwest`
    pub fn new(config: ClientConfig) -> SparqlClientResult<Self> {
        let transport = ReqwestTransport::new(&config.transport)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Client sending requests through a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run any query, decoding the result by its parsed form.
    ///
    /// Fails in raw mode, where no form is known.
    pub async fn query(
        &self,
        endpoint: &str,
        query: &str,
        options: &QueryOptions,
    ) -> SparqlClientResult<SparqlResults> {
        if self.raw_mode(options.raw_mode) {
            return Err(SparqlClientError::QueryInRawMode);
        }
        let form = QueryForm::of(&spargebra::Query::parse(query, None)?);
        self.run_query(endpoint, form, query, options).await
    }

    pub async fn select(
        &self,
        endpoint: &str,
        query: &str,
        options: &QueryOptions,
    ) -> SparqlClientResult<Solutions> {
        let results = self.form_query(endpoint, QueryForm::Select, query, options).await?;
        let kind = results.kind();
        results.into_solutions().ok_or(SparqlClientError::UnexpectedResult {
            form: QueryForm::Select,
            kind,
        })
    }

    pub async fn ask(&self, endpoint: &str, query: &str, options: &QueryOptions) -> SparqlClientResult<bool> {
        let results = self.form_query(endpoint, QueryForm::Ask, query, options).await?;
        results.as_boolean().ok_or(SparqlClientError::UnexpectedResult {
            form: QueryForm::Ask,
            kind: results.kind(),
        })
    }

    pub async fn construct(
        &self,
        endpoint: &str,
        query: &str,
        options: &QueryOptions,
    ) -> SparqlClientResult<Dataset> {
        self.graph_query(endpoint, QueryForm::Construct, query, options).await
    }

    pub async fn describe(
        &self,
        endpoint: &str,
        query: &str,
        options: &QueryOptions,
    ) -> SparqlClientResult<Dataset> {
        self.graph_query(endpoint, QueryForm::Describe, query, options).await
    }

    /// Send hand-written update text. Requires raw mode.
    pub async fn update(&self, endpoint: &str, text: &str, options: &UpdateOptions) -> SparqlClientResult<()> {
        if !self.raw_mode(options.raw_mode) {
            return Err(SparqlClientError::RawModeRequired);
        }
        self.run_update(endpoint, UpdateForm::Generic, text.to_string(), options).await
    }

    pub async fn insert_data(
        &self,
        endpoint: &str,
        data: impl Into<UpdateData>,
        options: &UpdateOptions,
    ) -> SparqlClientResult<()> {
        self.update_data(endpoint, UpdateForm::InsertData, data.into(), options).await
    }

    pub async fn delete_data(
        &self,
        endpoint: &str,
        data: impl Into<UpdateData>,
        options: &UpdateOptions,
    ) -> SparqlClientResult<()> {
        self.update_data(endpoint, UpdateForm::DeleteData, data.into(), options).await
    }

    /// `LOAD <from> [INTO GRAPH <to>]`
    pub async fn load(
        &self,
        endpoint: &str,
        from: impl IntoIri,
        to: Option<NamedNode>,
        options: &UpdateOptions,
    ) -> SparqlClientResult<()> {
        let text = update::load(from, to, options.silent)?;
        self.run_update(endpoint, UpdateForm::Load, text, options).await
    }

    pub async fn clear(
        &self,
        endpoint: &str,
        graph: &GraphSelector,
        options: &UpdateOptions,
    ) -> SparqlClientResult<()> {
        let text = update::clear(graph, options.silent);
        self.run_update(endpoint, UpdateForm::Clear, text, options).await
    }

    pub async fn create(
        &self,
        endpoint: &str,
        graph: impl IntoIri,
        options: &UpdateOptions,
    ) -> SparqlClientResult<()> {
        let text = update::create(graph, options.silent)?;
        self.run_update(endpoint, UpdateForm::Create, text, options).await
    }

    pub async fn drop(
        &self,
        endpoint: &str,
        graph: &GraphSelector,
        options: &UpdateOptions,
    ) -> SparqlClientResult<()> {
        let text = update::drop(graph, options.silent);
        self.run_update(endpoint, UpdateForm::Drop, text, options).await
    }

    pub async fn copy(
        &self,
        endpoint: &str,
        from: &GraphSelector,
        to: &GraphSelector,
        options: &UpdateOptions,
    ) -> SparqlClientResult<()> {
        self.transfer(endpoint, UpdateForm::Copy, from, to, options).await
    }

    /// `MOVE`, named so because `move` is a keyword
    pub async fn move_graph(
        &self,
        endpoint: &str,
        from: &GraphSelector,
        to: &GraphSelector,
        options: &UpdateOptions,
    ) -> SparqlClientResult<()> {
        self.transfer(endpoint, UpdateForm::Move, from, to, options).await
    }

    pub async fn add(
        &self,
        endpoint: &str,
        from: &GraphSelector,
        to: &GraphSelector,
        options: &UpdateOptions,
    ) -> SparqlClientResult<()> {
        self.transfer(endpoint, UpdateForm::Add, from, to, options).await
    }

    fn raw_mode(&self, option: Option<bool>) -> bool {
        option.unwrap_or(self.config.raw_mode)
    }

    /// Query through a form-specific function: the parsed form must match
    /// unless in raw mode
    async fn form_query(
        &self,
        endpoint: &str,
        form: QueryForm,
        query: &str,
        options: &QueryOptions,
    ) -> SparqlClientResult<SparqlResults> {
        if !self.raw_mode(options.raw_mode) {
            let actual = QueryForm::of(&spargebra::Query::parse(query, None)?);
            if actual != form {
                return Err(SparqlClientError::QueryFormMismatch { expected: form, actual });
            }
        }
        self.run_query(endpoint, form, query, options).await
    }

    async fn graph_query(
        &self,
        endpoint: &str,
        form: QueryForm,
        query: &str,
        options: &QueryOptions,
    ) -> SparqlClientResult<Dataset> {
        let results = self.form_query(endpoint, form, query, options).await?;
        let kind = results.kind();
        results
            .into_dataset()
            .ok_or(SparqlClientError::UnexpectedResult { form, kind })
    }

    async fn run_query(
        &self,
        endpoint: &str,
        form: QueryForm,
        query: &str,
        options: &QueryOptions,
    ) -> SparqlClientResult<SparqlResults> {
        let operation = QueryOperation::new(form, options, &self.config);
        let request = Request::build(
            &operation,
            endpoint,
            query,
            &options.headers,
            &options.dataset,
            self.config.http_headers.as_ref(),
        )?;
        self.execute(&operation, request).await
    }

    async fn update_data(
        &self,
        endpoint: &str,
        form: UpdateForm,
        data: UpdateData,
        options: &UpdateOptions,
    ) -> SparqlClientResult<()> {
        let text = update::update_data(form, data, options.prefixes.as_ref(), options.merge_graphs)?;
        self.run_update(endpoint, form, text, options).await
    }

    async fn transfer(
        &self,
        endpoint: &str,
        form: UpdateForm,
        from: &GraphSelector,
        to: &GraphSelector,
        options: &UpdateOptions,
    ) -> SparqlClientResult<()> {
        let text = update::transfer(form, from, to, options.silent)?;
        self.run_update(endpoint, form, text, options).await
    }

    async fn run_update(
        &self,
        endpoint: &str,
        form: UpdateForm,
        text: String,
        options: &UpdateOptions,
    ) -> SparqlClientResult<()> {
        let operation = UpdateOperation::new(form, options, &self.config);
        let request = Request::build(
            &operation,
            endpoint,
            text,
            &options.headers,
            &options.dataset,
            self.config.http_headers.as_ref(),
        )?;
        self.execute(&operation, request).await
    }

    async fn execute<S: OperationStrategy + Sync>(&self, strategy: &S, mut request: Request) -> SparqlClientResult<S::Output> {
        let response = Executor::new(self.transport.as_ref(), &self.config)
            .execute(&mut request)
            .await?;
        debug!(status = response.status, operation = %request.operation, "evaluating SPARQL response");
        strategy.evaluate_response(&request, &response)
    }
}
