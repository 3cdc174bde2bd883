//! Command-line interface for the accident analysis pipeline.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Instant;

use crate::config::{HotspotConfig, PipelineConfig};
use crate::core::loaders::{load_accidents_csv, Dataset};
use crate::core::writers::{write_centroids_csv, write_counts_csv, write_labeled_points_csv};
use crate::processors::clustering::cluster_hotspots;
use crate::processors::geo::extract_geo_points;
use crate::processors::summaries;
use crate::visualization;

#[derive(Parser)]
#[command(name = "crash-hotspots")]
#[command(about = "Chicago traffic-accident analysis pipeline", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a dataset overview (row counts, geo coverage)
    Summary {
        /// Input accident CSV file
        csv_file: PathBuf,
    },

    /// Look up one accident record by crash_record_id
    Lookup {
        /// Input accident CSV file
        csv_file: PathBuf,
        /// Crash record identifier to search for
        crash_id: String,
    },

    /// Render the accident location map as a PNG
    Map {
        /// Input accident CSV file
        csv_file: PathBuf,
        /// Output PNG file (defaults to accident_map.png next to the CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Cluster accident locations into hotspots and render/export results
    Hotspots {
        /// Input accident CSV file
        csv_file: PathBuf,
        /// Output directory for PNG and CSV artifacts
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Number of clusters
        #[arg(short)]
        k: Option<usize>,
        /// Random seed for centroid initialization
        #[arg(long)]
        seed: Option<u64>,
        /// Number of restarts (best inertia wins)
        #[arg(long)]
        restarts: Option<usize>,
        /// Iteration cap per run
        #[arg(long)]
        max_iterations: Option<usize>,
    },

    /// Render a summary bar chart for one dimension
    Chart {
        /// Input accident CSV file
        csv_file: PathBuf,
        /// Which summary to chart
        #[arg(value_enum)]
        dimension: ChartDimension,
        /// Output PNG file (defaults to <dimension>.png next to the CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Keep only the top N categories
        #[arg(long)]
        top: Option<usize>,
    },
}

/// Chartable summary dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChartDimension {
    /// Accidents by hour of day
    Hour,
    /// Accidents by lighting condition
    Lighting,
    /// Accidents by weather condition
    Weather,
    /// Average daily accidents by weather condition
    WeatherDaily,
    /// Accidents by roadway surface condition
    RoadSurface,
    /// Accidents by traffic control device
    TrafficControl,
    /// Top primary contributory causes
    Cause,
    /// Crash types stacked by trafficway type
    TrafficwayCrashType,
    /// Total injuries by first crash type
    Injuries,
    /// Accidents by posted speed limit
    SpeedLimit,
}

impl ChartDimension {
    fn file_stem(self) -> &'static str {
        match self {
            Self::Hour => "accidents_by_hour",
            Self::Lighting => "accidents_by_lighting",
            Self::Weather => "accidents_by_weather",
            Self::WeatherDaily => "avg_daily_by_weather",
            Self::RoadSurface => "accidents_by_road_surface",
            Self::TrafficControl => "accidents_by_traffic_control",
            Self::Cause => "top_contributory_causes",
            Self::TrafficwayCrashType => "crash_type_by_trafficway",
            Self::Injuries => "injuries_by_crash_type",
            Self::SpeedLimit => "accidents_by_speed_limit",
        }
    }
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.len() > 39 {
            format!("{}...", &value[..36])
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<39} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    let result = match cli.command {
        Commands::Summary { csv_file } => cmd_summary(&csv_file),
        Commands::Lookup { csv_file, crash_id } => cmd_lookup(&csv_file, &crash_id),
        Commands::Map { csv_file, output } => cmd_map(&csv_file, output, &config),
        Commands::Hotspots {
            csv_file,
            output_dir,
            k,
            seed,
            restarts,
            max_iterations,
        } => {
            // Build clustering config with CLI overrides
            let cluster_config = HotspotConfig {
                k: k.unwrap_or(config.clustering.k),
                seed: seed.unwrap_or(config.clustering.seed),
                restarts: restarts.unwrap_or(config.clustering.restarts),
                max_iterations: max_iterations.unwrap_or(config.clustering.max_iterations),
            };
            cmd_hotspots(&csv_file, output_dir, &cluster_config, &config)
        }
        Commands::Chart {
            csv_file,
            dimension,
            output,
            top,
        } => cmd_chart(&csv_file, dimension, output, top, &config),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn load_dataset(csv_file: &PathBuf) -> Result<Dataset> {
    let spinner = create_spinner("Loading accident dataset...");
    let dataset = load_accidents_csv(csv_file)
        .with_context(|| format!("failed to load {}", csv_file.display()));
    spinner.finish_and_clear();
    dataset
}

fn sibling_path(csv_file: &PathBuf, file_name: &str) -> PathBuf {
    csv_file
        .parent()
        .map(|p| p.join(file_name))
        .unwrap_or_else(|| PathBuf::from(file_name))
}

fn cmd_summary(csv_file: &PathBuf) -> Result<()> {
    let start = Instant::now();
    let dataset = load_dataset(csv_file)?;
    let geo_points = extract_geo_points(&dataset);
    let dated = dataset
        .records()
        .iter()
        .filter(|r| r.crash_date.is_some())
        .count();

    print_summary(
        "Dataset Overview",
        &[
            ("Input file", csv_file.display().to_string()),
            ("Records", dataset.len().to_string()),
            ("With coordinates", geo_points.len().to_string()),
            ("With crash date", dated.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}

fn cmd_lookup(csv_file: &PathBuf, crash_id: &str) -> Result<()> {
    let dataset = load_dataset(csv_file)?;

    let Some(record) = dataset.find_by_id(crash_id) else {
        println!("No accident record found for id '{}'", crash_id);
        return Ok(());
    };

    let show = |s: &Option<String>| s.clone().unwrap_or_else(|| "-".to_string());
    print_summary(
        "Accident Record",
        &[
            ("Crash record id", record.crash_record_id.clone()),
            (
                "Crash date",
                record
                    .crash_date
                    .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            (
                "Location",
                match (record.latitude, record.longitude) {
                    (Some(lat), Some(lon)) => format!("{:.6}, {:.6}", lat, lon),
                    _ => "-".to_string(),
                },
            ),
            ("Weather", show(&record.weather_condition)),
            ("Lighting", show(&record.lighting_condition)),
            ("Road surface", show(&record.roadway_surface_cond)),
            ("Traffic control", show(&record.traffic_control_device)),
            ("Primary cause", show(&record.prim_contributory_cause)),
            ("First crash type", show(&record.first_crash_type)),
            (
                "Injuries total",
                record
                    .injuries_total
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            (
                "Speed limit",
                record
                    .speed_limit
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ],
    );
    Ok(())
}

fn cmd_map(csv_file: &PathBuf, output: Option<PathBuf>, config: &PipelineConfig) -> Result<()> {
    let start = Instant::now();
    let dataset = load_dataset(csv_file)?;
    let points = extract_geo_points(&dataset);
    if points.is_empty() {
        bail!("no records with valid coordinates; skipping map");
    }

    let output_path = output.unwrap_or_else(|| sibling_path(csv_file, "accident_map.png"));

    let spinner = create_spinner("Rendering accident map...");
    let render = visualization::plot_accident_map(&output_path, &points, &config.rendering);
    spinner.finish_and_clear();
    render.context("failed to render accident map")?;

    print_summary(
        "Accident Map Complete",
        &[
            ("Input file", csv_file.display().to_string()),
            ("Output PNG", output_path.display().to_string()),
            ("Points plotted", points.len().to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}

fn cmd_hotspots(
    csv_file: &PathBuf,
    output_dir: Option<PathBuf>,
    cluster_config: &HotspotConfig,
    config: &PipelineConfig,
) -> Result<()> {
    let start = Instant::now();
    let dataset = load_dataset(csv_file)?;
    let points = extract_geo_points(&dataset);

    let out_dir = output_dir.unwrap_or_else(|| {
        csv_file
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });

    info!(
        "Clustering {} points: k={} seed={} restarts={} max_iterations={}",
        points.len(),
        cluster_config.k,
        cluster_config.seed,
        cluster_config.restarts,
        cluster_config.max_iterations
    );

    let spinner = create_spinner("Clustering accident hotspots...");
    let hotspots = cluster_hotspots(&points, cluster_config);
    spinner.finish_and_clear();
    let hotspots = hotspots.context("hotspot clustering failed")?;

    let png_path = out_dir.join("hotspot_map.png");
    let labels_path = out_dir.join("hotspot_labels.csv");
    let centroids_path = out_dir.join("hotspot_centroids.csv");

    visualization::plot_hotspot_map(
        &png_path,
        &points,
        &hotspots.labels,
        &hotspots.centroids,
        &config.rendering,
    )
    .context("failed to render hotspot map")?;
    write_labeled_points_csv(&labels_path, &points, &hotspots.labels)?;
    write_centroids_csv(&centroids_path, &hotspots.centroids)?;

    let sizes = hotspots.cluster_sizes();
    info!("Cluster sizes: {:?}", sizes);

    print_summary(
        "Hotspot Clustering Complete",
        &[
            ("Input file", csv_file.display().to_string()),
            ("Output PNG", png_path.display().to_string()),
            ("Labels CSV", labels_path.display().to_string()),
            ("Centroids CSV", centroids_path.display().to_string()),
            ("Points clustered", points.len().to_string()),
            ("k", cluster_config.k.to_string()),
            ("Seed", cluster_config.seed.to_string()),
            ("Inertia", format!("{:.4}", hotspots.inertia)),
            ("Largest cluster", sizes.iter().max().copied().unwrap_or(0).to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}

fn cmd_chart(
    csv_file: &PathBuf,
    dimension: ChartDimension,
    output: Option<PathBuf>,
    top: Option<usize>,
    config: &PipelineConfig,
) -> Result<()> {
    let start = Instant::now();
    let dataset = load_dataset(csv_file)?;
    let records = dataset.records();

    let output_path =
        output.unwrap_or_else(|| sibling_path(csv_file, &format!("{}.png", dimension.file_stem())));
    let csv_path = output_path.with_extension("csv");

    let spinner = create_spinner("Aggregating and rendering chart...");

    // Stacked chart has its own shape; everything else is (category, value)
    if dimension == ChartDimension::TrafficwayCrashType {
        let groups = summaries::crash_type_by_trafficway(records);
        let render =
            visualization::plot_stacked_bar_chart(&output_path, &groups, &config.rendering);
        spinner.finish_and_clear();
        render.context("failed to render stacked chart")?;

        let totals: Vec<(String, f64)> = groups
            .iter()
            .map(|(name, segments)| {
                let total: u64 = segments.iter().map(|(_, v)| *v).sum();
                (name.clone(), total as f64)
            })
            .collect();
        write_counts_csv(&csv_path, &totals)?;

        print_summary(
            "Chart Complete",
            &[
                ("Dimension", format!("{:?}", dimension)),
                ("Output PNG", output_path.display().to_string()),
                ("Table CSV", csv_path.display().to_string()),
                ("Categories", groups.len().to_string()),
                ("Duration", format!("{:.2?}", start.elapsed())),
            ],
        );
        return Ok(());
    }

    let rows: Vec<(String, f64)> = match dimension {
        ChartDimension::Hour => summaries::hourly_counts(records)
            .iter()
            .enumerate()
            .map(|(hour, &count)| (format!("{:02}", hour), count as f64))
            .collect(),
        ChartDimension::Lighting => to_f64(summaries::counts_by_category(
            records,
            |r| r.lighting_condition.as_deref(),
            top,
        )),
        ChartDimension::Weather => to_f64(summaries::counts_by_category(
            records,
            |r| r.weather_condition.as_deref(),
            top,
        )),
        ChartDimension::WeatherDaily => summaries::average_daily_by_weather(records),
        ChartDimension::RoadSurface => to_f64(summaries::counts_by_category(
            records,
            |r| r.roadway_surface_cond.as_deref(),
            top,
        )),
        ChartDimension::TrafficControl => to_f64(summaries::counts_by_category(
            records,
            |r| r.traffic_control_device.as_deref(),
            top,
        )),
        ChartDimension::Cause => to_f64(summaries::counts_by_category(
            records,
            |r| r.prim_contributory_cause.as_deref(),
            // The cause taxonomy runs to dozens of values; cap by default
            top.or(Some(20)),
        )),
        ChartDimension::Injuries => summaries::injuries_by_crash_type(records),
        ChartDimension::SpeedLimit => summaries::counts_by_speed_limit(records)
            .into_iter()
            .map(|(speed, count)| (speed.to_string(), count as f64))
            .collect(),
        ChartDimension::TrafficwayCrashType => unreachable!("handled above"),
    };

    let render = visualization::plot_bar_chart(&output_path, &rows, &config.rendering);
    spinner.finish_and_clear();
    render.context("failed to render chart")?;
    write_counts_csv(&csv_path, &rows)?;

    print_summary(
        "Chart Complete",
        &[
            ("Dimension", format!("{:?}", dimension)),
            ("Output PNG", output_path.display().to_string()),
            ("Table CSV", csv_path.display().to_string()),
            ("Categories", rows.len().to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}

fn to_f64(rows: Vec<(String, u64)>) -> Vec<(String, f64)> {
    rows.into_iter().map(|(k, v)| (k, v as f64)).collect()
}
