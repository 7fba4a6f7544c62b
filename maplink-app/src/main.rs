use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use maplink::{
    manifest::write_manifest,
    permalink::{decode_with, encode, PermalinkState},
    LogNotifier, MapSlot, MemoryHistory, ReqwestClient, Viewer, ViewerConfig,
};

#[derive(Parser, Debug)]
#[command(name = "maplink", about = "Permalink and dataset tools for the maplink viewer")]
struct Cli {
    /// Viewer configuration (JSON); built-in defaults when omitted
    #[arg(long, env = "MAPLINK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a permalink query and print the state it restores
    Decode { query: String },
    /// Encode a JSON permalink state into a query string
    Encode { state: String },
    /// Open a permalink in a headless viewer and print the maps it builds
    Open { query: String },
    /// Write manifest.json for the GeoJSON datasets in a folder
    Manifest { dir: PathBuf },
    /// Fetch the WMTS and WMS capabilities and the OSM manifest
    Capabilities,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ViewerConfig> {
    let config = match path {
        Some(path) => ViewerConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    Ok(config.with_env_overrides())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    maplink::init_logging();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Decode { query } => {
            let (state, warnings) = decode_with(&query, &config.catalog(), &config.view);
            println!("{}", serde_json::to_string_pretty(&state)?);
            for warning in &warnings {
                eprintln!("warning: {}", warning);
            }
            println!("?{}", encode(&state));
        }
        Command::Encode { state } => {
            let state: PermalinkState =
                serde_json::from_str(&state).context("state must be a JSON permalink state")?;
            println!("?{}", encode(&state));
        }
        Command::Open { query } => {
            let history = MemoryHistory::new();
            let mut viewer = Viewer::new(config, Box::new(history.clone()), Box::new(LogNotifier));
            for warning in viewer.bootstrap(&query)? {
                eprintln!("warning: {}", warning);
            }
            for &slot in MapSlot::active(viewer.state().is_split()) {
                if let Some(map) = viewer.map(slot) {
                    println!("{} map: {}", slot, map.list_layers().join(", "));
                }
            }
            if let Some(written) = history.current() {
                println!("{}", written);
            }
        }
        Command::Manifest { dir } => {
            let (path, count) = write_manifest(&dir)?;
            println!("Wrote {} datasets to {}", count, path.display());
        }
        Command::Capabilities => {
            let client = ReqwestClient::new()?;
            let mut viewer = Viewer::new(config, Box::new(MemoryHistory::new()), Box::new(LogNotifier));
            if !viewer.load_remote_within(&client, Duration::from_secs(30)).await {
                log::warn!("Listing what arrived before the deadline");
            }

            match viewer.capabilities() {
                Some(capabilities) => {
                    for layer in &capabilities.layers {
                        println!("wmts  {:<24} {}", layer.identifier, layer.title);
                    }
                }
                None => log::warn!("No WMTS capabilities"),
            }
            for layer in viewer.overlay_catalog().wms() {
                println!("wms   {:<24} {}", layer.name, layer.title);
            }
            for item in viewer.overlay_catalog().osm_items() {
                println!("osm   {:<24} {}", item.id, item.title);
            }
        }
    }
    Ok(())
}
