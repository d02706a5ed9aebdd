//! Events reported to the user while a gap search runs.

/// One success or failure event.
///
/// Carries display names alongside identifiers so a sink can render it
/// without looking anything up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    TmdbConnectionSucceeded,
    TmdbConnectionFailed {
        reason: String,
    },
    ServerConnectSucceeded {
        server_id: String,
        server_name: String,
    },
    ServerConnectFailed {
        server_id: String,
        server_name: String,
        reason: String,
    },
    LibrariesRefreshSucceeded {
        server_id: String,
        server_name: String,
        library_count: usize,
    },
    LibrariesRefreshFailed {
        server_id: String,
        server_name: String,
        reason: String,
    },
    LibraryScanSucceeded {
        server_id: String,
        server_name: String,
        library_key: String,
        library_title: String,
        movie_count: usize,
    },
    LibraryScanFailed {
        server_id: String,
        server_name: String,
        library_key: String,
        library_title: String,
        reason: String,
    },
    GapSearchSucceeded {
        server_id: String,
        server_name: String,
        library_key: String,
        library_title: String,
        missing_count: usize,
    },
    GapSearchFailed {
        server_id: String,
        server_name: String,
        library_key: String,
        library_title: String,
        reason: String,
    },
}

impl Notification {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Notification::TmdbConnectionFailed { .. }
                | Notification::ServerConnectFailed { .. }
                | Notification::LibrariesRefreshFailed { .. }
                | Notification::LibraryScanFailed { .. }
                | Notification::GapSearchFailed { .. }
        )
    }

    /// Machine identifier of the server this event is about, if any.
    pub fn server_id(&self) -> Option<&str> {
        match self {
            Notification::TmdbConnectionSucceeded | Notification::TmdbConnectionFailed { .. } => None,
            Notification::ServerConnectSucceeded { server_id, .. }
            | Notification::ServerConnectFailed { server_id, .. }
            | Notification::LibrariesRefreshSucceeded { server_id, .. }
            | Notification::LibrariesRefreshFailed { server_id, .. }
            | Notification::LibraryScanSucceeded { server_id, .. }
            | Notification::LibraryScanFailed { server_id, .. }
            | Notification::GapSearchSucceeded { server_id, .. }
            | Notification::GapSearchFailed { server_id, .. } => Some(server_id),
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notification::TmdbConnectionSucceeded => write!(f, "TMDB connection successful"),
            Notification::TmdbConnectionFailed { reason } => {
                write!(f, "TMDB connection failed: {}", reason)
            }
            Notification::ServerConnectSucceeded { server_name, .. } => {
                write!(f, "Connected to {}", server_name)
            }
            Notification::ServerConnectFailed { server_name, reason, .. } => {
                write!(f, "Could not connect to {}: {}", server_name, reason)
            }
            Notification::LibrariesRefreshSucceeded {
                server_name,
                library_count,
                ..
            } => write!(f, "{}: {} libraries found", server_name, library_count),
            Notification::LibrariesRefreshFailed { server_name, reason, .. } => {
                write!(f, "{}: libraries not found: {}", server_name, reason)
            }
            Notification::LibraryScanSucceeded {
                server_name,
                library_title,
                movie_count,
                ..
            } => write!(f, "{} / {}: scanned {} movies", server_name, library_title, movie_count),
            Notification::LibraryScanFailed {
                server_name,
                library_title,
                reason,
                ..
            } => write!(f, "{} / {}: scan failed: {}", server_name, library_title, reason),
            Notification::GapSearchSucceeded {
                server_name,
                library_title,
                missing_count,
                ..
            } => write!(f, "{} / {}: {} missing movies", server_name, library_title, missing_count),
            Notification::GapSearchFailed {
                server_name,
                library_title,
                reason,
                ..
            } => write!(f, "{} / {}: search failed: {}", server_name, library_title, reason),
        }
    }
}
