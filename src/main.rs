//! solar-panda – West Africa solar GHI dashboard.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Configuration or data loading failed

mod cli;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, OutputFormat};
use solar_panda::color::CountryColors;
use solar_panda::config::Config;
use solar_panda::state::{DashboardState, DatasetCache};
use solar_panda::ui::report;

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    log::debug!("arguments: {args:?}");

    if let Err(e) = run(args) {
        log::error!("{e:#}");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warnings (or debug with `-v`).
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

/// Fold command-line overrides into the file configuration.
fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(dir) = &args.data_dir {
        config.data.data_dir = dir.clone();
    }
    if let Some(ext) = &args.ext {
        config.data.extension = ext.clone();
    }
    if let Some(policy) = args.on_missing_ghi {
        config.data.missing_field = policy;
    }
    if let Some(seed) = args.seed {
        config.data.synthetic.seed = Some(seed);
    }
    if let Some(countries) = &args.countries {
        config.dashboard.countries = countries.clone();
    }
    if let Some(granularity) = args.granularity {
        config.dashboard.granularity = granularity;
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    let cache = DatasetCache::new(config.data.clone());
    let dataset = cache.get_or_load().context("loading solar data")?;

    let state = DashboardState {
        selection: config.dashboard.selection(),
        granularity: config.dashboard.granularity,
    };
    let views = state.views(&dataset);

    let colors = CountryColors::default();
    let mut out = io::stdout().lock();
    match args.format {
        OutputFormat::Text => {
            report::write_text(&mut out, dataset.origin(), state.granularity, &views, &colors)?
        }
        OutputFormat::Json => {
            report::write_json_lines(&mut out, dataset.origin(), state.granularity, &views, &colors)?
        }
    }
    out.flush()?;
    Ok(())
}
