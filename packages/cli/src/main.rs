#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal tools for the cowork map.
//!
//! ```text
//! cowork_map provinces
//! cowork_map mask [--province Varna]
//! cowork_map cities Varna
//! cowork_map explore [--width 1280 --height 800]
//! ```
//!
//! Every command accepts `--boundaries <file>` and `--locations <file>`;
//! data not given as a file is loaded from the backend configured through
//! `COWORK_MAP_BACKEND_URL` and friends. Running with no subcommand starts
//! `explore`.

mod data;
mod explore;

use clap::{Parser, Subcommand};
use cowork_map_cli_utils::{MultiProgress, with_spinner};
use cowork_map_explorer::{MountData, fetch_mount_data};
use cowork_map_province::{mask::build_mask, normalize::normalize, registry::ProvinceRegistry};
use cowork_map_selection::{SelectionMachine, aggregate::count_by_province};
use cowork_map_selection_models::SelectionEvent;
use cowork_map_viewport::ViewportConfig;
use cowork_map_viewport_models::ScreenSize;
use geojson::{GeoJson, Geometry, Value};
use serde_json::json;

use crate::data::DataArgs;

#[derive(Parser)]
#[command(name = "cowork_map", about = "Explore coworking locations by province")]
struct Cli {
    #[command(flatten)]
    data: DataArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registry provinces with their boundary feature and location count
    Provinces,
    /// Print the mask polygon as `GeoJSON`
    Mask {
        /// Cut the hole for this province only
        #[arg(long)]
        province: Option<String>,
    },
    /// Print the city aggregates of a province as JSON
    Cities {
        /// Province name (English or native)
        province: String,
    },
    /// Drill down interactively
    Explore {
        /// Simulated map width in pixels
        #[arg(long, default_value = "1280")]
        width: f64,
        /// Simulated map height in pixels
        #[arg(long, default_value = "800")]
        height: f64,
        /// Zoom used when a province is selected
        #[arg(long)]
        province_zoom: Option<f64>,
        /// Zoom used when a city is selected
        #[arg(long)]
        city_zoom: Option<f64>,
    },
}

async fn load(multi: &MultiProgress, args: &DataArgs) -> Result<MountData, Box<dyn std::error::Error>> {
    let collaborators = data::collaborators(args)?;
    Ok(with_spinner(multi, "Loading map data...", fetch_mount_data(&collaborators)).await?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = cowork_map_cli_utils::init_logger();
    let cli = Cli::parse();
    let registry = ProvinceRegistry::bulgaria();

    let command = cli.command.unwrap_or(Commands::Explore {
        width: 1280.0,
        height: 800.0,
        province_zoom: None,
        city_zoom: None,
    });

    match command {
        Commands::Provinces => {
            let data = load(&multi, &cli.data).await?;
            let provinces = normalize(&data.boundaries);
            let counts = count_by_province(&data.records, registry.definitions());

            println!("{:<16} {:<16} {:<24} LOCATIONS", "NAME", "NATIVE", "FEATURE");
            println!("{}", "-".repeat(68));

            for def in registry.definitions() {
                let feature = registry.raw_name_in(def, &provinces).unwrap_or("-");
                let count = counts
                    .iter()
                    .find(|(d, _)| d.name == def.name)
                    .map_or(0, |(_, n)| *n);
                println!(
                    "{:<16} {:<16} {:<24} {count}",
                    def.name, def.native_name, feature
                );
            }

            let unmatched = provinces
                .features
                .iter()
                .filter(|f| registry.resolve_feature(f).is_none())
                .count();
            println!(
                "\n{} province(s), {} feature(s), {unmatched} unmatched feature(s)",
                registry.definitions().len(),
                provinces.len()
            );
        }
        Commands::Mask { province } => {
            let data = load(&multi, &cli.data).await?;
            let provinces = normalize(&data.boundaries);

            let raw = match province.as_deref() {
                Some(name) => {
                    let def = registry
                        .resolve(name)
                        .ok_or_else(|| format!("Unknown province: {name}"))?;
                    Some(
                        registry
                            .raw_name_in(def, &provinces)
                            .ok_or_else(|| format!("No boundary feature for {}", def.name))?,
                    )
                }
                None => None,
            };

            let mask = build_mask(&provinces, raw);
            let geojson = GeoJson::Geometry(Geometry::new(Value::from(&mask)));
            println!("{}", serde_json::to_string_pretty(&geojson)?);
        }
        Commands::Cities { province } => {
            let data = load(&multi, &cli.data).await?;
            let mut machine = SelectionMachine::new(registry, data.records);

            if !machine
                .apply(&SelectionEvent::ClickProvince {
                    name: province.clone(),
                })
                .is_applied()
            {
                return Err(format!("Unknown province: {province}").into());
            }

            let cities: Vec<_> = machine
                .aggregates()
                .iter()
                .map(|city| {
                    json!({
                        "name": city.name,
                        "key": city.key,
                        "count": city.count(),
                        "centroid": city.centroid,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&cities)?);
        }
        Commands::Explore {
            width,
            height,
            province_zoom,
            city_zoom,
        } => {
            let defaults = ViewportConfig::default();
            let config = ViewportConfig {
                province_zoom: province_zoom.unwrap_or(defaults.province_zoom),
                city_zoom: city_zoom.unwrap_or(defaults.city_zoom),
                ..defaults
            };
            let collaborators = data::collaborators(&cli.data)?;
            explore::run(&multi, collaborators, config, ScreenSize::new(width, height)).await?;
        }
    }

    Ok(())
}
