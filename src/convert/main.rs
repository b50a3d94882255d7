//! CSV to GeoJSON converter.
//!
//! Reads point rows from a CSV file, labels each row with the region that
//! contains it in every boundary layer, and writes GeoJSON markers (plus,
//! optionally, the labelled CSV).

mod config;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use csv2geojson::io::boundaries::DEFAULT_NAME_PROPERTY;
use csv2geojson::io::{load_layer, write_markers, Table};
use csv2geojson::{
    indexed_keys, Annotator, CoordinateColumns, Execution, MissPolicy, SpatialJoin,
    DEFAULT_KEY_PREFIX,
};

use crate::config::{Config, LayerConfig};

#[derive(Parser, Debug)]
#[command(name = "csv2geojson")]
#[command(about = "Convert CSV rows with longitude/latitude columns to GeoJSON markers")]
struct Args {
    /// Input CSV file with longitude and latitude columns
    input: PathBuf,

    /// Output file for GeoJSON markers
    output: PathBuf,

    /// Also write the CSV with the region columns appended
    #[arg(long, alias = "dumpCSV")]
    dump_csv: Option<PathBuf>,

    /// Boundary GeoJSON files, coarsest first (e.g. ADM0.geojson,ADM1.geojson)
    #[arg(long, value_delimiter = ',')]
    bounds: Vec<PathBuf>,

    /// Name of the longitude column [default: longitude]
    #[arg(long = "long")]
    long: Option<String>,

    /// Name of the latitude column [default: latitude]
    #[arg(long = "lat")]
    lat: Option<String>,

    /// Boundary feature property holding the region name [default: shapeName]
    #[arg(long)]
    name_property: Option<String>,

    /// Prefix of the added columns; the layer index is appended
    #[arg(long, default_value = DEFAULT_KEY_PREFIX)]
    key_prefix: String,

    /// Value written when no region contains a point [default: empty]
    #[arg(long)]
    unmatched: Option<String>,

    /// Use the closest region when no region contains a point
    #[arg(long)]
    nearest: bool,

    /// Join records on all cores
    #[arg(long)]
    parallel: bool,

    /// Join records on this many threads (implies --parallel)
    #[arg(long)]
    threads: Option<usize>,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::default(),
    };

    let columns = CoordinateColumns::new(
        args.long.clone().unwrap_or(config.columns.longitude.clone()),
        args.lat.clone().unwrap_or(config.columns.latitude.clone()),
    );

    info!("csv2geojson");
    info!("Input: {}", args.input.display());

    // Layers come first: a bad boundary file must fail before any output
    let layer_configs = resolve_layers(&args, &config);
    let mut layers = Vec::with_capacity(layer_configs.len());
    for layer_config in &layer_configs {
        let name_property = resolve_name_property(&args, layer_config);
        layers.push(load_layer(&layer_config.path, name_property)?);
    }
    let keys = resolve_keys(&args, &layer_configs);

    let mut table = Table::read(&args.input, &columns)?;

    if !layers.is_empty() {
        let miss_policy = if args.nearest {
            MissPolicy::Nearest
        } else {
            config.join.miss_policy
        };
        let unmatched = args
            .unmatched
            .clone()
            .unwrap_or(config.join.unmatched.clone());
        let execution = resolve_execution(&args, &config);

        let join = SpatialJoin::new(layers).with_miss_policy(miss_policy);
        let annotator = Annotator::new(join, keys.clone())?.with_unmatched(unmatched);

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
        );
        pb.set_message(format!(
            "Joining {} records against {} layers",
            table.records.len(),
            annotator.keys().len()
        ));
        pb.enable_steady_tick(Duration::from_millis(120));

        let records = std::mem::take(&mut table.records);
        table.records = annotator.annotate(records, execution)?;

        pb.finish_with_message("Join complete");
    }

    write_markers(&args.output, &table.records)?;

    if let Some(path) = &args.dump_csv {
        table.write(path, &keys)?;
    }

    Ok(())
}

/// `--bounds` replaces any layers listed in the config file
fn resolve_layers(args: &Args, config: &Config) -> Vec<LayerConfig> {
    if args.bounds.is_empty() {
        return config.layers.clone();
    }
    args.bounds
        .iter()
        .map(|path| LayerConfig {
            path: path.clone(),
            name_property: None,
            key: None,
        })
        .collect()
}

/// `--name-property` wins over a layer's configured property
fn resolve_name_property<'a>(args: &'a Args, layer_config: &'a LayerConfig) -> &'a str {
    args.name_property
        .as_deref()
        .or(layer_config.name_property.as_deref())
        .unwrap_or(DEFAULT_NAME_PROPERTY)
}

/// Configured keys where given, `{prefix}{index}` otherwise
fn resolve_keys(args: &Args, layer_configs: &[LayerConfig]) -> Vec<String> {
    layer_configs
        .iter()
        .zip(indexed_keys(&args.key_prefix, layer_configs.len()))
        .map(|(layer_config, default_key)| layer_config.key.clone().unwrap_or(default_key))
        .collect()
}

fn resolve_execution(args: &Args, config: &Config) -> Execution {
    let threads = args.threads.or(config.join.threads);
    if args.parallel || config.join.parallel || threads.is_some() {
        Execution::Parallel { threads }
    } else {
        Execution::Sequential
    }
}
