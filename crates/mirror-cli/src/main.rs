//! `ocimesh`: peer-to-peer pull-through mirror sidecar for an OCI
//! container registry.

mod cli;
mod error;
mod shutdown;
mod tracing_init;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use cli::{Cli, Commands};
use ocimesh_bootstrap::StaticSeeds;
use ocimesh_common::{ImageFilter, PeerRecord};
use ocimesh_config::MirrorConfiguration;
use ocimesh_oci_client::{InMemoryStore, OciStore};
use ocimesh_registry_http::{AppState, Metrics};
use ocimesh_router::{GossipRouter, Router};
use ocimesh_tracker::TrackerConfig;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use url::Url;

use crate::error::Result;

/// Shutdown grace period: how long the main loop waits for spawned
/// components to finish once cancellation has started.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    tracing_init::init(cli.level, cli.json);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start async runtime: {err}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli.command)) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "ocimesh exited with an error");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Configuration {
            registries,
            mirror_registries,
            output_dir,
        } => run_configuration(registries, mirror_registries, output_dir),
        Commands::Registry {
            registry_addr,
            router_addr,
            metrics_addr,
            registries,
            image_filter,
            content_store_socket,
            content_store_namespace,
            control_plane_namespace,
            control_plane_name,
            webhook_addr,
        } => {
            run_registry(
                registry_addr,
                router_addr,
                metrics_addr,
                registries,
                image_filter,
                content_store_socket,
                content_store_namespace,
                control_plane_namespace,
                control_plane_name,
                webhook_addr,
            )
            .await
        }
    }
}

fn run_configuration(registries: Vec<Url>, mirror_registries: Vec<Url>, output_dir: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&output_dir).map_err(ocimesh_config::Error::Io)?;

    let config = MirrorConfiguration {
        registries,
        mirror_registries,
    };
    let path = output_dir.join("mirror.toml");
    config.write(&path)?;
    info!(path = %path.display(), "wrote mirror configuration");
    Ok(())
}

async fn run_registry(
    registry_addr: SocketAddr,
    router_addr: SocketAddr,
    metrics_addr: SocketAddr,
    registries: Vec<Url>,
    image_filter: Option<String>,
    content_store_socket: Option<PathBuf>,
    content_store_namespace: Option<String>,
    control_plane_namespace: Option<String>,
    control_plane_name: Option<String>,
    webhook_addr: Option<SocketAddr>,
) -> Result<()> {
    if let Some(socket) = &content_store_socket {
        info!(
            socket = %socket.display(),
            namespace = ?content_store_namespace,
            "content-store socket/namespace accepted; this build serves from an in-memory store"
        );
    }
    if let (Some(namespace), Some(name)) = (&control_plane_namespace, &control_plane_name) {
        info!(%namespace, %name, "control-plane lease accepted; running as a single, statically-bootstrapped node");
    }
    if let Some(addr) = webhook_addr {
        warn!(%addr, "webhook listener is not implemented");
    }

    let image_filter = match image_filter {
        Some(pattern) => ImageFilter::parse(&pattern)?,
        None => ImageFilter::match_all(),
    };

    let cancel = CancellationToken::new();
    shutdown::install_signal_handlers(cancel.clone());

    let oci: Arc<dyn OciStore> = Arc::new(InMemoryStore::new());
    let local_peer = PeerRecord::new(router_addr.ip());
    let router: Arc<dyn Router> = Arc::new(GossipRouter::new(local_peer));

    let bootstrapper = StaticSeeds::default();
    if ocimesh_bootstrap::get_with_retry(&bootstrapper, &cancel, Duration::from_secs(5))
        .await
        .is_none()
        && !cancel.is_cancelled()
    {
        info!("no seed peers configured; running as the sole node in the overlay");
    }

    let metrics = Metrics::new();
    let state = AppState {
        oci: oci.clone(),
        router: router.clone(),
        http_client: reqwest::Client::new(),
        registry_port: registry_addr.port(),
        metrics: metrics.clone(),
    };

    info!(?registries, %registry_addr, %router_addr, %metrics_addr, "starting mirror sidecar");

    let mut tasks = tokio::task::JoinSet::new();

    tasks.spawn({
        let cancel = cancel.clone();
        let oci = oci.clone();
        let router = router.clone();
        async move {
            ocimesh_tracker::track(cancel, oci, router, image_filter, TrackerConfig::default())
                .await
                .map_err(crate::error::Error::from)
        }
    });

    tasks.spawn({
        let cancel = cancel.clone();
        async move {
            ocimesh_registry_http::serve_registry(registry_addr, state, cancel)
                .await
                .map_err(crate::error::Error::from)
        }
    });

    tasks.spawn({
        let cancel = cancel.clone();
        async move {
            ocimesh_registry_http::serve_metrics(metrics_addr, metrics, cancel)
                .await
                .map_err(crate::error::Error::from)
        }
    });

    let mut first_error = None;
    loop {
        let next = if cancel.is_cancelled() {
            match tokio::time::timeout(SHUTDOWN_GRACE, tasks.join_next()).await {
                Ok(next) => next,
                Err(_) => {
                    warn!("shutdown grace period elapsed with components still running");
                    break;
                }
            }
        } else {
            tasks.join_next().await
        };

        let Some(result) = next else { break };

        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(%err, "component failed, cancelling remaining components");
                cancel.cancel();
                first_error.get_or_insert(err);
            }
            Err(join_err) => {
                error!(%join_err, "component task panicked, cancelling remaining components");
                cancel.cancel();
                first_error.get_or_insert(crate::error::Error::from(join_err));
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_configuration_writes_a_file_under_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("certs.d");

        run_configuration(
            vec!["https://docker.io".parse().unwrap()],
            vec!["https://mirror.example.com".parse().unwrap()],
            output_dir.clone(),
        )
        .unwrap();

        let written = MirrorConfiguration::read(output_dir.join("mirror.toml")).unwrap();
        assert_eq!(written.registries.len(), 1);
        assert_eq!(written.mirror_registries.len(), 1);
    }

    #[test]
    fn run_configuration_creates_missing_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output_dir = dir.path().join("nested").join("certs.d");
        assert!(!output_dir.exists());

        run_configuration(vec!["https://docker.io".parse().unwrap()], vec![], output_dir.clone()).unwrap();

        assert!(output_dir.join("mirror.toml").exists());
    }
}
