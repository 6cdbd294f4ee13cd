use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use foundation::math::Viewport;
use layers::{Feature, FeatureCollection};
use serde::Deserialize;
use spider::{SpiderOptions, SpiderOptionsPatch, build_spider};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Prints the spider layout a map would draw when a cluster is expanded.
#[derive(Debug, Parser)]
#[command(name = "spider-layout", version, about)]
struct Args {
    /// Cluster JSON `{"cluster": <Feature>, "leaves": [<Feature>, ...]}`, or `-` for stdin.
    #[arg(long)]
    input: PathBuf,
    /// Option overrides as camelCase JSON (e.g. `{"circleSpiralSwitchover": 8}`).
    #[arg(long)]
    options: Option<PathBuf>,
    #[arg(long, default_value_t = 12.0)]
    zoom: f64,
    #[arg(long, default_value_t = 1024.0)]
    width: f64,
    #[arg(long, default_value_t = 768.0)]
    height: f64,
    /// World tile edge in pixels at zoom 0.
    #[arg(long, default_value_t = 512.0)]
    tile_size: f64,
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Deserialize)]
struct SpiderInput {
    cluster: Feature,
    #[serde(default)]
    leaves: Vec<Feature>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = real_main(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(args: Args) -> Result<(), String> {
    let input: SpiderInput = serde_json::from_str(&read_text(&args.input)?)
        .map_err(|e| format!("parse {:?}: {e}", args.input))?;

    let mut options = SpiderOptions::default();
    if let Some(path) = &args.options {
        let patch: SpiderOptionsPatch =
            serde_json::from_str(&read_text(path)?).map_err(|e| format!("parse {path:?}: {e}"))?;
        debug!(?patch, "applying option overrides");
        options.merge(&patch);
    }

    let out = layout(&input, &options, &args)?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&out)
    } else {
        serde_json::to_string(&out)
    }
    .map_err(|e| format!("encode output: {e}"))?;
    println!("{json}");
    Ok(())
}

fn read_text(path: &Path) -> Result<String, String> {
    if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| format!("read stdin: {e}"))?;
        return Ok(text);
    }
    fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))
}

fn layout(input: &SpiderInput, options: &SpiderOptions, args: &Args) -> Result<FeatureCollection, String> {
    if !(args.tile_size > 0.0 && args.width > 0.0 && args.height > 0.0) {
        return Err("--width, --height and --tile-size must be positive".to_string());
    }
    let center = input
        .cluster
        .position()
        .ok_or_else(|| "cluster feature has no coordinates".to_string())?;

    if let Some(info) = input.cluster.cluster_info()
        && info.point_count > options.max_features_in_web as u64
    {
        info!(
            cluster = %info.id,
            point_count = info.point_count,
            "a click on this cluster would zoom in instead of expanding"
        );
    }

    let members = &input.leaves[..input.leaves.len().min(options.max_features_in_web)];
    let viewport = Viewport::new(center, args.zoom, args.width, args.height).with_tile_size(args.tile_size);
    let shapes = build_spider(center, members, &options.layout, &viewport);
    info!(
        members = members.len(),
        mode = ?options.layout.mode_for(members.len()),
        "spider laid out"
    );
    Ok(FeatureCollection::from(shapes))
}
