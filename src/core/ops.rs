//! Portal operations
//!
//! The dataset submissions and search-index management calls the portal
//! exposes: RNA-seq and IGV uploads (batched, two-phase), the project-page
//! dataset editing forms (callset registration, IGV mappings, RNA-seq with
//! tissue), phenotype prioritization upload, search-index status and
//! deletion, scoped search-data delete triggers, and gene-variant lookup.

use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use crate::config::ClientConfig;
use crate::core::batch::{BatchConfig, BatchCoordinator, BatchStats, SubRequest};
use crate::core::dispatch::{Dispatcher, HttpDispatcher, Method};
use crate::form::{self, FormField};
use crate::store::{StatsStore, UploadKind, UploadStats};
use crate::utils::error::{ClientError, Result};

/// Number of RNA-seq sample requests kept in flight at once
const RNA_SEQ_CONCURRENCY: usize = 10;

const SEARCH_STATUS_PATH: &str = "/api/data_management/elasticsearch_status";
const DELETE_INDEX_PATH: &str = "/api/data_management/delete_index";
const UPDATE_RNA_SEQ_PATH: &str = "/api/data_management/update_rna_seq";
const ADD_IGV_PATH: &str = "/api/data_management/add_igv";
const PHENOTYPE_PRIORITIZATION_PATH: &str =
    "/api/data_management/load_phenotype_prioritization_data";
const GENE_VARIANT_LOOKUP_PATH: &str = "/api/gene_variant_lookup";

/// Entity scope for triggering search-data deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDataEntity {
    /// Delete search data for a whole project
    Project,
    /// Delete search data for a single family
    Family,
}

impl SearchDataEntity {
    fn as_str(self) -> &'static str {
        match self {
            SearchDataEntity::Project => "project",
            SearchDataEntity::Family => "family",
        }
    }

    fn fields(self) -> Vec<FormField> {
        match self {
            SearchDataEntity::Project => form::trigger_delete_project_fields(),
            SearchDataEntity::Family => form::trigger_delete_family_fields(),
        }
    }
}

/// Client for a genomics data portal
///
/// Holds the stats store its submissions publish into; clone the store (via
/// [`PortalClient::store`]) wherever results need to be rendered.
pub struct PortalClient<D = HttpDispatcher> {
    config: ClientConfig,
    dispatcher: Arc<D>,
    coordinator: BatchCoordinator<D>,
    store: StatsStore,
}

impl PortalClient<HttpDispatcher> {
    /// Create a client over the shared pooled HTTP dispatcher
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let dispatcher = Arc::new(HttpDispatcher::with_timeout(config.request_timeout()));
        Self::with_dispatcher(config, dispatcher)
    }
}

impl<D: Dispatcher> PortalClient<D> {
    /// Create a client over a custom dispatcher
    pub fn with_dispatcher(config: ClientConfig, dispatcher: Arc<D>) -> Result<Self> {
        config.validate()?;
        let store = StatsStore::new();
        let coordinator = BatchCoordinator::new(Arc::clone(&dispatcher), store.clone());
        Ok(Self {
            config,
            dispatcher,
            coordinator,
            store,
        })
    }

    /// The projection this client publishes submission outcomes into
    pub fn store(&self) -> &StatsStore {
        &self.store
    }

    /// Load the current search-index status into the store
    ///
    /// A failed status request is recorded in the status slot as
    /// `{"errors": [message]}` rather than propagated, so the page can render
    /// it alongside a stale status.
    pub async fn load_search_status(&self) -> Result<()> {
        let url = self.config.endpoint(SEARCH_STATUS_PATH)?;
        // the guard clears the flag even if this future is dropped mid-request
        let loading = self.store.begin_search_status_load();
        let outcome = self.dispatcher.dispatch(Method::Get, &url, None).await;
        drop(loading);

        match outcome {
            Ok(status) => self.store.set_search_status(status),
            Err(e) => self
                .store
                .set_search_status(json!({ "errors": [e.message] })),
        }
        Ok(())
    }

    /// Delete a search index; the response replaces the status slot
    pub async fn delete_search_index(&self, index: &str) -> Result<()> {
        let url = self.config.endpoint(DELETE_INDEX_PATH)?;
        let status = self
            .dispatcher
            .dispatch(Method::Post, &url, Some(&json!({ "index": index })))
            .await
            .map_err(ClientError::Request)?;
        info!(index, "deleted search index");
        self.store.set_search_status(status);
        Ok(())
    }

    /// Upload RNA-seq sample data
    ///
    /// Two-phase: the form values are POSTed to the update endpoint, then one
    /// sub-request per returned sample guid loads that sample, at most
    /// [`RNA_SEQ_CONCURRENCY`] in flight at a time.
    pub async fn upload_rna_seq(&self, values: &Value) -> Result<BatchStats> {
        self.validate_values(&form::load_rna_fields(), values)?;
        self.submit_rna_seq(values).await
    }

    /// Upload RNA-seq sample data from the project page
    ///
    /// Same flow as [`PortalClient::upload_rna_seq`]; the project form
    /// additionally captures the sampled tissue.
    pub async fn upload_project_rna_seq(&self, values: &Value) -> Result<BatchStats> {
        self.validate_values(&form::project_rna_fields(), values)?;
        self.submit_rna_seq(values).await
    }

    async fn submit_rna_seq(&self, values: &Value) -> Result<BatchStats> {
        let url = self.config.endpoint(UPDATE_RNA_SEQ_PATH)?;
        self.coordinator
            .submit_multiple(
                UploadKind::RnaSeq,
                &url,
                values,
                |response, values| expand_rna_seq_samples(&self.config, response, values),
                |n| format!("Successfully loaded data for {} RNA-seq samples", n),
                BatchConfig::new().with_concurrency(RNA_SEQ_CONCURRENCY),
            )
            .await
    }

    /// Register an already-loaded callset index with a project
    ///
    /// Single POST; the response (updated samples, individuals, and families)
    /// is returned wholesale.
    pub async fn upload_callset(&self, project_guid: &str, values: &Value) -> Result<Value> {
        self.validate_values(&form::upload_callset_fields(), values)?;
        let url = self
            .config
            .endpoint(&format!("/api/project/{}/add_dataset/variants", project_guid))?;
        self.dispatcher
            .dispatch(Method::Post, &url, Some(values))
            .await
            .map_err(ClientError::Request)
    }

    /// Add IGV tracks from a project-page upload
    ///
    /// The upload control has already parsed the mapping file; its `updates`
    /// rows fan out to one request per individual, keyed by individual id.
    pub async fn add_project_igv(&self, values: &Value) -> Result<BatchStats> {
        self.validate_values(&form::project_igv_fields(), values)?;
        let mapping = values.get("mappingFile").cloned().unwrap_or(Value::Null);
        self.coordinator
            .submit_batch(
                UploadKind::Igv,
                &mapping,
                values,
                |mapping, _| expand_igv_updates(&self.config, mapping),
                |n| format!("Successfully added IGV tracks for {} samples", n),
                BatchConfig::new(),
            )
            .await
    }

    /// Add IGV track paths for individuals
    ///
    /// Two-phase: the parsed upload is POSTed first, then one sub-request per
    /// returned update row, keyed by individual id, all dispatched at once.
    pub async fn add_igv(&self, values: &Value) -> Result<BatchStats> {
        let url = self.config.endpoint(ADD_IGV_PATH)?;
        self.coordinator
            .submit_multiple(
                UploadKind::Igv,
                &url,
                values,
                |response, _| expand_igv_updates(&self.config, response),
                |n| format!("Successfully added IGV tracks for {} samples", n),
                BatchConfig::new(),
            )
            .await
    }

    /// Upload phenotype prioritization data (single request, not batched)
    ///
    /// The raw response replaces the phenotype-prioritization stats slot.
    pub async fn upload_phenotype_prioritization(&self, values: &Value) -> Result<Value> {
        let url = self.config.endpoint(PHENOTYPE_PRIORITIZATION_PATH)?;
        let response = self
            .dispatcher
            .dispatch(Method::Post, &url, Some(values))
            .await
            .map_err(ClientError::Request)?;
        self.store.publish(
            UploadKind::PhenotypePrioritization,
            UploadStats::Single(response.clone()),
        );
        Ok(response)
    }

    /// Trigger deletion of search data for a project or family
    pub async fn trigger_search_data_update(
        &self,
        entity: SearchDataEntity,
        values: &Value,
    ) -> Result<Value> {
        self.validate_values(&entity.fields(), values)?;
        let url = self.config.endpoint(&format!(
            "/api/data_management/trigger_delete_{}",
            entity.as_str()
        ))?;
        self.dispatcher
            .dispatch(Method::Post, &url, Some(values))
            .await
            .map_err(ClientError::Request)
    }

    /// Look up variants within a gene across all projects
    ///
    /// The result is also stored for display via [`StatsStore::variant_lookup`].
    pub async fn gene_variant_lookup(&self, values: &Value) -> Result<Value> {
        self.validate_values(&[form::genome_version_field()], values)?;
        let url = self.config.endpoint(GENE_VARIANT_LOOKUP_PATH)?;
        let response = self
            .dispatcher
            .dispatch(Method::Post, &url, Some(values))
            .await
            .map_err(ClientError::Request)?;
        self.store.set_variant_lookup(response.clone());
        Ok(response)
    }

    fn validate_values(&self, fields: &[FormField], values: &Value) -> Result<()> {
        let values = values.as_object().cloned().unwrap_or_default();
        form::validate_form(fields, &values).map_err(|errors| {
            ClientError::Validation(
                errors
                    .into_iter()
                    .map(|(name, message)| format!("{}: {}", name, message))
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })
    }
}

fn expand_rna_seq_samples(
    config: &ClientConfig,
    response: &Value,
    values: &Value,
) -> Result<Vec<SubRequest>> {
    let sample_guids = string_array(response, "sampleGuids")?;
    let file_name = response.get("fileName").cloned().unwrap_or(Value::Null);
    let data_type = values.get("dataType").cloned().unwrap_or(Value::Null);

    sample_guids
        .into_iter()
        .map(|guid| {
            let url = config.endpoint(&format!("/api/load_rna_seq_sample/{}", guid))?;
            Ok(SubRequest::post(
                url,
                guid,
                json!({ "fileName": file_name, "dataType": data_type }),
            ))
        })
        .collect()
}

fn expand_igv_updates(config: &ClientConfig, response: &Value) -> Result<Vec<SubRequest>> {
    let updates = response
        .get("updates")
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::Config("response is missing the updates list".to_string()))?;

    updates
        .iter()
        .map(|update| {
            let row = update.as_object().ok_or_else(|| {
                ClientError::Config("IGV update entries must be objects".to_string())
            })?;
            let individual_guid = required_str(row, "individualGuid")?;
            let individual_id = required_str(row, "individualId")?;

            // the remaining fields are the per-sample update body
            let mut body = row.clone();
            body.remove("individualGuid");
            body.remove("individualId");

            let url = config.endpoint(&format!(
                "/api/individual/{}/update_igv_sample",
                individual_guid
            ))?;
            Ok(SubRequest::post(url, individual_id, Value::Object(body)))
        })
        .collect()
}

fn string_array(value: &Value, field: &str) -> Result<Vec<String>> {
    let items = value
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::Config(format!("response is missing the {} list", field)))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| ClientError::Config(format!("{} entries must be strings", field)))
        })
        .collect()
}

fn required_str(row: &serde_json::Map<String, Value>, field: &str) -> Result<String> {
    row.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ClientError::Config(format!("IGV update entry is missing {}", field)))
}
