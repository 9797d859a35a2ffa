//! Spec file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::schema::OpenApiConfig;
use crate::routing::{BuildError, RouteTable, RouteTableBuilder};
use crate::spec::{load_spec, SpecError};

/// Why a reload attempt was rejected.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Load the spec at `path` and compile a fresh route table from it.
pub fn rebuild_routes(
    path: &Path,
    openapi: &OpenApiConfig,
    builder: &RouteTableBuilder,
) -> Result<RouteTable, ReloadError> {
    let spec = load_spec(path, openapi)?;
    Ok(builder.build(&spec)?)
}

/// A watcher that recompiles the route table when the spec file changes.
pub struct SpecWatcher {
    path: PathBuf,
    openapi: OpenApiConfig,
    builder: RouteTableBuilder,
    update_tx: mpsc::UnboundedSender<RouteTable>,
}

impl SpecWatcher {
    /// Create a new SpecWatcher.
    ///
    /// Returns the watcher and a receiver for rebuilt tables.
    pub fn new(
        path: &Path,
        openapi: OpenApiConfig,
        builder: RouteTableBuilder,
    ) -> (Self, mpsc::UnboundedReceiver<RouteTable>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                openapi,
                builder,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    ///
    /// Watching stops when the returned handle is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let SpecWatcher {
            path,
            openapi,
            builder,
            update_tx,
        } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!(path = ?path, "Spec file change detected, rebuilding routes");
                        match rebuild_routes(&path, &openapi, &builder) {
                            Ok(table) => {
                                let _ = update_tx.send(table);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to reload spec: {}. Keeping current routes.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?watched, "Spec watcher started");
        Ok(watcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::Synthesizer;
    use std::io::Write;

    fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new(Synthesizer::default()).with_seed(Some(5))
    }

    #[test]
    fn test_rebuild_routes() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"openapi":"3.0.0","info":{{"title":"t","version":"1"}},"paths":{{"/a":{{"get":{{}}}}}}}}"#
        )
        .unwrap();

        let table = rebuild_routes(file.path(), &OpenApiConfig::default(), &builder()).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_rebuild_rejects_bad_spec() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = rebuild_routes(file.path(), &OpenApiConfig::default(), &builder()).unwrap_err();
        assert!(matches!(err, ReloadError::Spec(_)));
    }
}
