use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec2;
use tileworld_common::{WorldGrid, WorldRequest};
use tileworld_fetch::{ClientConfig, FetchError, WorldClient};
use tileworld_render::{DebugTextRenderer, RenderView, Renderer};
use tileworld_scene::{Scene, SceneConfig, ScenePhase};
use tileworld_server::{DEFAULT_SERVER_ADDRESS, ServerConfig, WorldServer};
use tileworld_worldgen::{NoiseParams, generate_world};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tileworld-cli", about = "CLI tool for tile world operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Generate a world locally and print it
    Generate {
        #[arg(long, default_value = "0")]
        seed: i64,
        /// Tiles per side
        #[arg(long, default_value = "32")]
        size: u32,
        /// Print the JSON body the service would return
        #[arg(long)]
        json: bool,
    },
    /// Fetch a world from a running service and print the resulting scene
    Fetch {
        /// Service base URL
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        endpoint: String,
        #[arg(long, default_value = "123")]
        seed: i64,
        #[arg(long, default_value = "64")]
        size: u32,
        /// Give up after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Run the world generation service until Ctrl+C
    Serve {
        #[arg(long, default_value = DEFAULT_SERVER_ADDRESS)]
        address: String,
        /// Largest accepted size parameter
        #[arg(long, default_value = "512")]
        max_size: u32,
    },
}

/// Build a scene from a fetch outcome with a view wide enough for the whole map.
fn scene_for(request: WorldRequest, result: Result<WorldGrid, FetchError>) -> Scene {
    let config = SceneConfig::default();
    let mut scene = Scene::new(SceneConfig {
        viewport: Vec2::splat(request.size as f32 * config.tile_edge),
        ..config
    });
    // A fresh scene always accepts both transitions.
    let _ = scene.begin_loading(request);
    let _ = scene.complete_loading(result);
    scene
}

fn print_scene(scene: &Scene) {
    let out = DebugTextRenderer::new().render(scene, &RenderView::of_scene(scene));
    print!("{out}");
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("tileworld-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", tileworld_common::crate_info());
            println!("worldgen: {}", tileworld_worldgen::crate_info());
            println!("fetch: {}", tileworld_fetch::crate_info());
            println!("server: {}", tileworld_server::crate_info());
            println!("input: {}", tileworld_input::crate_info());
            println!("scene: {}", tileworld_scene::crate_info());
            println!("render: {}", tileworld_render::crate_info());
        }
        Commands::Generate { seed, size, json } => {
            let request = WorldRequest::new(seed, size);
            let grid = generate_world(&request, &NoiseParams::default())
                .context("generating world")?;
            if json {
                println!("{}", grid.to_json());
            } else {
                print_scene(&scene_for(request, Ok(grid)));
            }
        }
        Commands::Fetch {
            endpoint,
            seed,
            size,
            timeout_ms,
        } => {
            let client = WorldClient::new(&ClientConfig {
                base_url: endpoint,
                timeout_ms,
            })?;
            let request = WorldRequest::new(seed, size);
            let result = runtime()?.block_on(client.fetch(request));
            let scene = scene_for(request, result);
            print_scene(&scene);
            if let ScenePhase::Failed(reason) = scene.phase() {
                anyhow::bail!("could not load world from {}: {reason}", client.endpoint());
            }
        }
        Commands::Serve { address, max_size } => {
            let config = ServerConfig {
                max_size,
                ..ServerConfig::default()
            };
            runtime()?.block_on(async move {
                let server = WorldServer::bind(address.as_str(), config).await?;
                let handle = server.run()?;
                println!("Serving worlds on http://{}", handle.address());

                tokio::signal::ctrl_c()
                    .await
                    .context("waiting for Ctrl+C")?;
                println!("Served {} requests", handle.requests_served());
                handle.shutdown().await?;
                anyhow::Ok(())
            })?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generated_scene_is_ready() {
        let request = WorldRequest::new(5, 6);
        let grid = generate_world(&request, &NoiseParams::default()).unwrap();
        let scene = scene_for(request, Ok(grid));
        assert!(scene.is_ready());
        let out = DebugTextRenderer::new().render(&scene, &RenderView::of_scene(&scene));
        assert_eq!(out.lines().skip(2).count(), 6);
        assert_eq!(out.matches('@').count(), 1);
    }

    #[test]
    fn failed_fetch_prints_reason() {
        let scene = scene_for(WorldRequest::new(0, 4), Err(FetchError::Network { status: 502 }));
        assert!(matches!(scene.phase(), ScenePhase::Failed(_)));
        let out = DebugTextRenderer::new().render(&scene, &RenderView::of_scene(&scene));
        assert!(out.contains("HTTP 502"));
    }
}
