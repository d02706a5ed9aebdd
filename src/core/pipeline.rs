//! Gap-search pipeline.
//!
//! Runs the stages strictly in order, each one over every server/library
//! before the next starts:
//! - credential check (fatal on failure)
//! - server probe
//! - library refresh
//! - owned-movie index (from the previous run's snapshots)
//! - library sync
//! - gap search

use crate::core::indexer::build_owned_index;
use crate::core::prober::{probe_servers, refresh_libraries};
use crate::core::report::{Outcome, RunReport, RunStatus, Stage, StageReport, Subject};
use crate::core::searcher::{search_gaps, SearchContext};
use crate::core::store::SnapshotStore;
use crate::core::synchronizer::{sync_libraries, SyncContext};
use crate::models::{ApiKey, Secret, ServerRegistry};
use crate::services::notify::NotificationSink;
use crate::services::{CredentialStatus, MediaServerClient, MetadataService};
use crate::{Error, Result};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

/// Inputs of one run, resolved once by the caller.
#[derive(Debug, Clone)]
pub struct RunInput {
    pub registry: ServerRegistry,
    pub tmdb_api_key: Option<Secret>,
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Servers or libraries processed at once within a stage.
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// The gap-search pipeline and its collaborators.
pub struct Pipeline {
    metadata: Arc<dyn MetadataService>,
    media: Arc<dyn MediaServerClient>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn NotificationSink>,
    config: PipelineConfig,
    run_lock: Mutex<()>,
}

impl Pipeline {
    pub fn new(
        metadata: Arc<dyn MetadataService>,
        media: Arc<dyn MediaServerClient>,
        store: Arc<dyn SnapshotStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self::with_config(metadata, media, store, notifier, PipelineConfig::default())
    }

    pub fn with_config(
        metadata: Arc<dyn MetadataService>,
        media: Arc<dyn MediaServerClient>,
        store: Arc<dyn SnapshotStore>,
        notifier: Arc<dyn NotificationSink>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            metadata,
            media,
            store,
            notifier,
            config,
            run_lock: Mutex::new(()),
        }
    }

    /// Run every stage once.
    ///
    /// Fails with [`Error::RunInProgress`] if another run holds the pipeline
    /// or the store, and with a credential error if TMDB cannot be used.
    /// Failures of single servers, libraries or collections only show up in
    /// the report.
    pub async fn run(&self, input: RunInput) -> Result<RunReport> {
        self.run_then(input, |_| Ok(())).await
    }

    /// Like [`Pipeline::run`], then hands the report to `finish` before the
    /// run releases its locks. Callers persist run results there.
    pub async fn run_then<F>(&self, input: RunInput, finish: F) -> Result<RunReport>
    where
        F: FnOnce(&RunReport) -> Result<()>,
    {
        let _guard = self.run_lock.try_lock().map_err(|_| Error::RunInProgress)?;
        let _store_lock = self.store.lock_run()?;

        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("gap_search", run_id = %run_id);
        let report = self.run_stages(run_id, input).instrument(span).await?;
        finish(&report)?;
        Ok(report)
    }

    async fn run_stages(&self, run_id: String, input: RunInput) -> Result<RunReport> {
        let RunInput {
            registry,
            tmdb_api_key,
        } = input;

        if registry.is_empty() {
            tracing::warn!("No Plex servers configured. Canceling search.");
            return Ok(RunReport {
                run_id,
                status: RunStatus::NoServers,
                stages: Vec::new(),
                registry,
                missing: Vec::new(),
            });
        }

        let mut stages = Vec::new();
        let concurrency = self.config.concurrency;

        let (credential_report, api_key) = self.check_credential(tmdb_api_key.as_ref()).await;
        self.emit(&credential_report);
        let api_key = api_key?;
        stages.push(credential_report);

        tracing::info!("Probing {} servers", registry.len());
        let probe_report = probe_servers(self.media.as_ref(), &registry, concurrency).await;
        self.emit(&probe_report);
        stages.push(probe_report);

        tracing::info!("Refreshing libraries");
        let (refresh_report, registry) = refresh_libraries(self.media.as_ref(), &registry, concurrency).await;
        self.emit(&refresh_report);
        stages.push(refresh_report);

        let index = build_owned_index(&registry, self.store.as_ref())?;

        tracing::info!("Scanning library movies");
        let sync_ctx = SyncContext {
            media: self.media.as_ref(),
            metadata: self.metadata.as_ref(),
            store: self.store.as_ref(),
            api_key: &api_key,
            index: &index,
        };
        let sync_report = sync_libraries(&sync_ctx, &registry, concurrency).await;
        self.emit(&sync_report);
        stages.push(sync_report);

        tracing::info!("Searching for missing movies");
        let search_ctx = SearchContext {
            metadata: self.metadata.as_ref(),
            store: self.store.as_ref(),
            api_key: &api_key,
            index: &index,
        };
        let (search_report, missing) = search_gaps(&search_ctx, &registry, concurrency).await;
        self.emit(&search_report);
        stages.push(search_report);

        Ok(RunReport {
            run_id,
            status: RunStatus::Completed,
            stages,
            registry,
            missing,
        })
    }

    /// Resolve and test the TMDB credential.
    ///
    /// The report always holds exactly one outcome; the key is returned only
    /// when TMDB accepted it.
    async fn check_credential(&self, configured: Option<&Secret>) -> (StageReport, Result<ApiKey>) {
        let subject = Subject {
            server_id: String::new(),
            server_name: "TMDB".to_string(),
            library_key: None,
            library_title: None,
        };

        let result = match ApiKey::resolve(configured) {
            None => Err(Error::TmdbApiKeyMissing),
            Some(key) => match self.metadata.test_credential(&key).await {
                Ok(CredentialStatus::Valid) => Ok(key),
                Ok(CredentialStatus::Invalid { reason }) => Err(Error::TmdbApiKeyInvalid(reason)),
                Err(Error::MetadataUnavailable(reason)) => Err(Error::MetadataUnavailable(reason)),
                Err(e) => Err(Error::MetadataUnavailable(e.to_string())),
            },
        };

        let outcome = match &result {
            Ok(_) => Outcome::ok(Stage::CredentialCheck, subject, 0),
            Err(e) => {
                tracing::error!("TMDB credential check failed: {}", e);
                Outcome::failed(Stage::CredentialCheck, subject, credential_reason(e))
            }
        };

        (
            StageReport {
                stage: Stage::CredentialCheck,
                outcomes: vec![outcome],
            },
            result,
        )
    }

    /// Send every outcome of a finished stage to the sink, in order.
    fn emit(&self, report: &StageReport) {
        for outcome in &report.outcomes {
            self.notifier.notify(&outcome.notification());
        }
    }
}

fn credential_reason(err: &Error) -> String {
    match err {
        Error::TmdbApiKeyMissing => "API key not configured".to_string(),
        Error::TmdbApiKeyInvalid(reason) | Error::MetadataUnavailable(reason) => reason.clone(),
        other => other.to_string(),
    }
}
