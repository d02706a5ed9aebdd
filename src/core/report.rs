//! Per-item outcomes of each pipeline stage and the report of a whole run.

use crate::models::notification::Notification;
use crate::models::snapshot::MissingSnapshot;
use crate::models::{Library, Server, ServerRegistry};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    CredentialCheck,
    ProbeServers,
    RefreshLibraries,
    SyncLibraries,
    SearchGaps,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::CredentialCheck => write!(f, "TMDB credential"),
            Stage::ProbeServers => write!(f, "Server connectivity"),
            Stage::RefreshLibraries => write!(f, "Library refresh"),
            Stage::SyncLibraries => write!(f, "Library scan"),
            Stage::SearchGaps => write!(f, "Gap search"),
        }
    }
}

/// The server, and for library stages the library, an outcome is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    pub server_id: String,
    pub server_name: String,
    pub library_key: Option<String>,
    pub library_title: Option<String>,
}

impl Subject {
    pub fn server(server: &Server) -> Self {
        Self {
            server_id: server.id.clone(),
            server_name: server.name.clone(),
            library_key: None,
            library_title: None,
        }
    }

    pub fn library(server: &Server, library: &Library) -> Self {
        Self {
            library_key: Some(library.key.clone()),
            library_title: Some(library.title.clone()),
            ..Self::server(server)
        }
    }
}

/// Result of one work item: a count on success, a short reason on failure.
///
/// The count is libraries found, movies scanned or movies missing, depending
/// on the stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub stage: Stage,
    pub subject: Subject,
    pub result: std::result::Result<usize, String>,
}

impl Outcome {
    pub fn ok(stage: Stage, subject: Subject, count: usize) -> Self {
        Self {
            stage,
            subject,
            result: Ok(count),
        }
    }

    pub fn failed<S: Into<String>>(stage: Stage, subject: Subject, reason: S) -> Self {
        Self {
            stage,
            subject,
            result: Err(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The user-facing event for this outcome.
    pub fn notification(&self) -> Notification {
        let Subject {
            server_id,
            server_name,
            library_key,
            library_title,
        } = self.subject.clone();
        let library_key = library_key.unwrap_or_default();
        let library_title = library_title.unwrap_or_default();

        match (&self.result, self.stage) {
            (Ok(_), Stage::CredentialCheck) => Notification::TmdbConnectionSucceeded,
            (Err(reason), Stage::CredentialCheck) => Notification::TmdbConnectionFailed {
                reason: reason.clone(),
            },
            (Ok(_), Stage::ProbeServers) => Notification::ServerConnectSucceeded {
                server_id,
                server_name,
            },
            (Err(reason), Stage::ProbeServers) => Notification::ServerConnectFailed {
                server_id,
                server_name,
                reason: reason.clone(),
            },
            (Ok(count), Stage::RefreshLibraries) => Notification::LibrariesRefreshSucceeded {
                server_id,
                server_name,
                library_count: *count,
            },
            (Err(reason), Stage::RefreshLibraries) => Notification::LibrariesRefreshFailed {
                server_id,
                server_name,
                reason: reason.clone(),
            },
            (Ok(count), Stage::SyncLibraries) => Notification::LibraryScanSucceeded {
                server_id,
                server_name,
                library_key,
                library_title,
                movie_count: *count,
            },
            (Err(reason), Stage::SyncLibraries) => Notification::LibraryScanFailed {
                server_id,
                server_name,
                library_key,
                library_title,
                reason: reason.clone(),
            },
            (Ok(count), Stage::SearchGaps) => Notification::GapSearchSucceeded {
                server_id,
                server_name,
                library_key,
                library_title,
                missing_count: *count,
            },
            (Err(reason), Stage::SearchGaps) => Notification::GapSearchFailed {
                server_id,
                server_name,
                library_key,
                library_title,
                reason: reason.clone(),
            },
        }
    }
}

/// All outcomes of one stage, in work-item order.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage: Stage,
    pub outcomes: Vec<Outcome>,
}

impl StageReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// No servers configured; nothing was done.
    NoServers,
    /// Every stage ran (individual items may still have failed).
    Completed,
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub status: RunStatus,
    pub stages: Vec<StageReport>,
    /// Servers with their refreshed libraries.
    pub registry: ServerRegistry,
    /// Gap search results, one per successfully searched library.
    pub missing: Vec<MissingSnapshot>,
}

impl RunReport {
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }


    pub fn total_missing(&self) -> usize {
        self.missing.iter().map(|m| m.recommendations.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LibraryKind, Secret};

    #[test]
    fn test_outcome_notification_is_attributed() {
        let server = Server::new("abc", "Den", "h", 32400, Secret::new("t"));
        let library = Library::new("abc", "3", "4K Movies", LibraryKind::Movie);
        let outcome = Outcome::failed(Stage::SyncLibraries, Subject::library(&server, &library), "timed out");

        assert_eq!(
            outcome.notification(),
            Notification::LibraryScanFailed {
                server_id: "abc".to_string(),
                server_name: "Den".to_string(),
                library_key: "3".to_string(),
                library_title: "4K Movies".to_string(),
                reason: "timed out".to_string(),
            }
        );
    }

    #[test]
    fn test_stage_report_counts() {
        let server = Server::new("abc", "Den", "h", 32400, Secret::new("t"));
        let report = StageReport {
            stage: Stage::ProbeServers,
            outcomes: vec![
                Outcome::ok(Stage::ProbeServers, Subject::server(&server), 0),
                Outcome::failed(Stage::ProbeServers, Subject::server(&server), "down"),
            ],
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
    }
}
