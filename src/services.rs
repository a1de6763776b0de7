use crate::columns::ColumnResolver;
use crate::config::Config;
use crate::errors::{AppError, ResultExt};
use crate::models::{VectorSearchRequest, VectorSearchResponse, DEFAULT_SEARCH_LIMIT};
use crate::pipeline::NormalizationPipeline;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

// ============ Vector Search wire models ============

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedColumn {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexSchema {
    #[serde(default)]
    pub fields: Option<Vec<NamedColumn>>,
    #[serde(default)]
    pub columns: Option<Vec<NamedColumn>>,
}

impl IndexSchema {
    /// Names from `fields`, else from `columns`; blank names are skipped.
    pub fn column_names(&self) -> Vec<String> {
        self.fields
            .as_ref()
            .or(self.columns.as_ref())
            .map(|cols| named(cols))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub schema: Option<IndexSchema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultManifest {
    #[serde(default)]
    pub columns: Option<Vec<NamedColumn>>,
    #[serde(default)]
    pub schema: Option<IndexSchema>,
}

impl ResultManifest {
    pub fn column_names(&self) -> Vec<String> {
        match self.columns.as_ref() {
            Some(cols) => named(cols),
            None => self
                .schema
                .as_ref()
                .map(IndexSchema::column_names)
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryIndexResponse {
    #[serde(default)]
    pub manifest: Option<ResultManifest>,
    #[serde(default)]
    pub result: Option<Value>,
}

impl QueryIndexResponse {
    /// Raw result items: `result.data_array`, or `result` itself when the
    /// backend returns a bare list.
    pub fn items(self) -> Vec<Value> {
        match self.result {
            Some(Value::Object(mut result)) => match result.remove("data_array") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct QueryIndexPayload<'a> {
    query_text: &'a str,
    columns: &'a [String],
    num_results: u32,
}

fn named(cols: &[NamedColumn]) -> Vec<String> {
    cols.iter()
        .filter_map(|c| c.name.as_deref())
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .collect()
}

// ============ Vector Search client ============

#[derive(Clone)]
pub struct VectorSearchClient {
    client: Client,
    host: String,
    token: Option<String>,
}

impl VectorSearchClient {
    pub fn new(host: String, token: Option<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn index_url(&self, index_name: &str, suffix: Option<&str>) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.host)
            .map_err(|e| AppError::InternalError(format!("Invalid vector search host: {}", e)))?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                AppError::InternalError("Vector search host cannot be a base URL".to_string())
            })?;
            segments
                .pop_if_empty()
                .extend(["api", "2.0", "vector-search", "indexes", index_name]);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Fetch index metadata, including its column schema when the backend exposes one.
    pub async fn get_index(&self, index_name: &str) -> Result<IndexInfo, AppError> {
        let url = self.index_url(index_name, None)?;
        tracing::info!("Vector Search: fetching index info for {}", index_name);

        let response = self.authorized(self.client.get(url)).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::BackendError(format!(
                "get_index returned status {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::BackendError(format!("Failed to parse index info response: {}", e))
        })
    }

    /// Run a similarity query against an index.
    pub async fn query_index(
        &self,
        index_name: &str,
        query_text: &str,
        columns: &[String],
        num_results: u32,
    ) -> Result<QueryIndexResponse, AppError> {
        let url = self.index_url(index_name, Some("query"))?;
        tracing::info!(
            "Vector Search: querying {} for {:?} (columns: {:?}, num_results: {})",
            index_name,
            query_text,
            columns,
            num_results
        );

        let payload = QueryIndexPayload {
            query_text,
            columns,
            num_results,
        };
        let response = self
            .authorized(self.client.post(url))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Vector Search returned error {}: {}", status, error_text);
            return Err(AppError::BackendError(format!(
                "query_index returned status {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::BackendError(format!("Failed to parse query response: {}", e))
        })
    }
}

// ============ Search flow ============

pub struct SearchService {
    client: Option<VectorSearchClient>,
    pipeline: NormalizationPipeline,
    max_results: u32,
}

impl SearchService {
    pub fn new(client: Option<VectorSearchClient>, max_results: u32) -> Self {
        Self {
            client,
            pipeline: NormalizationPipeline::new(ColumnResolver::default()),
            max_results: max_results.max(1),
        }
    }

    /// Builds the service from config. A missing host leaves search disabled.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = match config.vector_search_host.clone() {
            Some(host) => Some(VectorSearchClient::new(
                host,
                config.vector_search_token.clone(),
                config.backend_timeout(),
            )?),
            None => None,
        };
        Ok(Self::new(client, config.max_search_results))
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    fn effective_limit(&self, limit: Option<u32>) -> u32 {
        match limit {
            Some(0) | None => DEFAULT_SEARCH_LIMIT.min(self.max_results),
            Some(n) => n.min(self.max_results),
        }
    }

    /// Columns advertised by the index schema, or the resolver default when
    /// the schema cannot be read.
    async fn discover_columns(&self, client: &VectorSearchClient, index_name: &str) -> Vec<String> {
        let defaults = self.pipeline.resolver().default_columns().to_vec();
        match client.get_index(index_name).await {
            Ok(info) => {
                let columns = info
                    .schema
                    .as_ref()
                    .map(IndexSchema::column_names)
                    .unwrap_or_default();
                if columns.is_empty() {
                    tracing::info!("Index {} exposes no schema columns, using defaults", index_name);
                    defaults
                } else {
                    columns
                }
            }
            Err(e) => {
                tracing::warn!("Could not read schema for {}: {}. Using defaults", index_name, e);
                defaults
            }
        }
    }

    pub async fn search(&self, request: &VectorSearchRequest) -> Result<VectorSearchResponse, AppError> {
        if request.query.trim().is_empty() {
            return Err(AppError::BadRequest("Query cannot be empty".to_string()));
        }
        if request.index_name.trim().is_empty() {
            return Err(AppError::BadRequest("index_name cannot be empty".to_string()));
        }

        let client = self.client.as_ref().ok_or_else(|| {
            AppError::BackendUnavailable(
                "Vector search API not available. Set VECTOR_SEARCH_HOST to enable it".to_string(),
            )
        })?;

        tracing::debug!(
            "Search on endpoint {} index {}",
            request.endpoint_name,
            request.index_name
        );

        let requested = self.discover_columns(client, &request.index_name).await;
        let limit = self.effective_limit(request.limit);

        let response = client
            .query_index(&request.index_name, &request.query, &requested, limit)
            .await
            .with_context(|| format!("Vector search on {}", request.index_name))?;

        let advertised = response
            .manifest
            .as_ref()
            .map(ResultManifest::column_names)
            .unwrap_or_default();
        let items = response.items();
        tracing::info!(
            "Vector search returned {} item(s), manifest columns: {:?}",
            items.len(),
            advertised
        );

        let results = self
            .pipeline
            .normalize_values(items, &requested, Some(&advertised));

        Ok(VectorSearchResponse {
            results,
            query: request.query.clone(),
        })
    }
}
