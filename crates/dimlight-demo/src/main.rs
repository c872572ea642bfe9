//! Dimlight Demo — resolves resources from a directory through a provider
//! and writes the results next to each other for comparison.
//!
//! This stands in for a host application: it owns the dark-mode flag,
//! builds the provider once from that flag, and only ever talks to it
//! through the `Resources` trait.

mod batch;
mod config;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dimlight_core::color::to_hex;
use dimlight_core::{
    Configuration, DesaturatedResources, DirAssetStore, DisplayMetrics, PlainResources,
    ResourceContext, ResourceId, Resources,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Overrides, load_engine_config};
use crate::error::DemoError;

#[derive(Parser)]
#[command(name = "dimlight-demo")]
#[command(about = "Resolve image and color resources through a dark-mode desaturating provider")]
struct Cli {
    /// Resource directory (drawable*/ folders, colors.json, color_states.json)
    #[arg(short, long)]
    assets: PathBuf,

    /// Output directory for transformed images
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// Engine config JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Force dark mode on
    #[arg(long, conflicts_with = "light")]
    dark: bool,

    /// Force dark mode off
    #[arg(long)]
    light: bool,

    /// Darkness applied in dark mode (0.0 to 1.0)
    #[arg(long)]
    darkness: Option<f32>,

    /// Blend toward grayscale (0.0 to 1.0)
    #[arg(long)]
    saturation: Option<f32>,

    /// Display density in dpi, used to pick density-qualified assets
    #[arg(long, default_value_t = 160)]
    density: u32,

    /// Bypass the provider and export untransformed resources
    #[arg(long)]
    plain: bool,

    /// Worker threads used to resolve images
    #[arg(short, long, default_value_t = 4)]
    jobs: usize,

    /// Color resources to print
    #[arg(long = "color")]
    colors: Vec<String>,

    /// Image resource ids (numbers or file stems)
    ids: Vec<String>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        let dark_mode = match (self.dark, self.light) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Overrides {
            dark_mode,
            darkness_amount: self.darkness,
            saturation_amount: self.saturation,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "dimlight-demo failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), DemoError> {
    let engine = load_engine_config(cli.config.as_deref(), cli.overrides())?;
    let context = ResourceContext::new(
        DisplayMetrics {
            density_dpi: cli.density,
            ..Default::default()
        },
        Configuration {
            night_mode: engine.dark_mode,
            locale: None,
        },
    );
    let store = Arc::new(DirAssetStore::open(&cli.assets)?);

    let resources: Box<dyn Resources> = if cli.plain {
        Box::new(PlainResources::new(store, context))
    } else {
        Box::new(DesaturatedResources::new(&engine, store, context))
    };

    for name in &cli.colors {
        let id = ResourceId::parse(name);
        let color = resources.color(&id)?;
        println!("{id}: {}", to_hex(color));
    }

    if cli.ids.is_empty() {
        return Ok(());
    }

    std::fs::create_dir_all(&cli.out).map_err(|source| DemoError::Write {
        path: cli.out.clone(),
        source,
    })?;

    let ids: Vec<ResourceId> = cli.ids.iter().map(String::as_str).map(ResourceId::parse).collect();
    info!(count = ids.len(), jobs = cli.jobs, out = %cli.out.display(), "exporting resources");

    let items = batch::export_all(resources.as_ref(), &ids, &cli.out, cli.jobs);
    batch::report(&items)
}
