//! Command-line surface: write a mirror configuration file, or run the
//! mirror sidecar.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use url::Url;

use crate::tracing_init::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "ocimesh")]
#[command(about = "Peer-to-peer pull-through mirror sidecar for an OCI container registry")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level. Overridden by `RUST_LOG` when set.
    #[arg(short = 'l', long, global = true, default_value = "warn", value_enum)]
    pub level: LogLevel,

    /// Emit structured JSON logs instead of pretty-printed ones.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a mirror-configuration file for the container runtime to pick up.
    Configuration {
        /// Upstream registries this mirror is willing to serve for.
        #[arg(long = "registries", required = true, num_args = 1..)]
        registries: Vec<Url>,

        /// Registries the local runtime should route through this mirror.
        #[arg(long = "mirror-registries", num_args = 0..)]
        mirror_registries: Vec<Url>,

        /// Directory the configuration file is written into.
        #[arg(long, default_value = "/etc/containerd/certs.d")]
        output_dir: PathBuf,
    },
    /// Run the mirror sidecar: serve the registry front door, track local
    /// content into the peer directory, and mirror misses from peers.
    Registry {
        /// Address the OCI Distribution v2 front door listens on.
        #[arg(long, default_value = "0.0.0.0:5000")]
        registry_addr: SocketAddr,

        /// Address this node advertises itself under in the peer directory.
        #[arg(long, default_value = "0.0.0.0:5001")]
        router_addr: SocketAddr,

        /// Address the Prometheus metrics endpoint listens on.
        #[arg(long, default_value = "0.0.0.0:9090")]
        metrics_addr: SocketAddr,

        /// Upstream registries this node mirrors for.
        #[arg(long = "registries", required = true, num_args = 1..)]
        registries: Vec<Url>,

        /// Glob restricting which image references get advertised to peers.
        #[arg(long)]
        image_filter: Option<String>,

        /// Content-runtime socket path (e.g. the containerd content-store socket).
        #[arg(long)]
        content_store_socket: Option<PathBuf>,

        /// Content-runtime namespace to read image content from.
        #[arg(long)]
        content_store_namespace: Option<String>,

        /// Control-plane namespace the leader-election lease lives in.
        #[arg(long)]
        control_plane_namespace: Option<String>,

        /// Control-plane leader-election lease name.
        #[arg(long)]
        control_plane_name: Option<String>,

        /// Address to receive content-change webhooks on, if any.
        #[arg(long)]
        webhook_addr: Option<SocketAddr>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_requires_registries() {
        let result = Cli::try_parse_from(["ocimesh", "configuration"]);
        assert!(result.is_err());
    }

    #[test]
    fn configuration_accepts_multiple_registries() {
        let cli = Cli::try_parse_from([
            "ocimesh",
            "configuration",
            "--registries",
            "https://docker.io",
            "https://ghcr.io",
        ])
        .unwrap();
        let Commands::Configuration { registries, .. } = cli.command else {
            panic!("expected Configuration subcommand");
        };
        assert_eq!(registries.len(), 2);
    }

    #[test]
    fn registry_requires_registries() {
        let result = Cli::try_parse_from([
            "ocimesh",
            "registry",
            "--registry-addr",
            "0.0.0.0:5000",
            "--router-addr",
            "0.0.0.0:5001",
            "--metrics-addr",
            "0.0.0.0:9090",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn registry_defaults_apply_when_omitted() {
        let cli = Cli::try_parse_from(["ocimesh", "registry", "--registries", "https://docker.io"]).unwrap();
        let Commands::Registry {
            registry_addr,
            router_addr,
            metrics_addr,
            image_filter,
            ..
        } = cli.command
        else {
            panic!("expected Registry subcommand");
        };
        assert_eq!(registry_addr.port(), 5000);
        assert_eq!(router_addr.port(), 5001);
        assert_eq!(metrics_addr.port(), 9090);
        assert!(image_filter.is_none());
    }

    #[test]
    fn global_level_and_json_flags_are_accepted() {
        let cli = Cli::try_parse_from([
            "ocimesh",
            "--level",
            "debug",
            "--json",
            "registry",
            "--registries",
            "https://docker.io",
        ])
        .unwrap();
        assert!(cli.json);
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        let result = Cli::try_parse_from(["ocimesh"]);
        assert!(result.is_err());
    }
}
