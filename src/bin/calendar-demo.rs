//! Renders two synthetic return calendars to the terminal.
//!
//! ```bash
//! calendar-demo
//! calendar-demo --ansi --seed 7
//! calendar-demo --config demo.toml
//! RUST_LOG=calendar_grid=debug calendar-demo
//! ```

use std::path::PathBuf;

use anyhow::Context;
use calendar_grid::{
    Clock, DateRange, MonthLabel, Palette, RenderOptions, Rgb, SyntheticReturns, SystemClock, TextRenderer,
    WeekdayLabel, add_in_month, add_on_weekday, plot,
};
use chrono::{Datelike, NaiveDate};
use clap::Parser;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calendar-demo")]
#[command(about = "Render synthetic daily returns as calendar heatmaps", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML file overriding the demo parameters
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the first dataset (the second uses seed + 1)
    #[arg(long)]
    seed: Option<u64>,

    /// Paint cells with 24-bit ANSI colors
    #[arg(long)]
    ansi: bool,
}

/// One rendered calendar: a range, its generator, and a single adjustment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Dataset {
    title:   String,
    /// Explicit range; takes precedence over `year`
    range:   Option<DateRange>,
    /// Whole calendar year; with neither set, January 1st of this year through today
    year:    Option<i32>,
    returns: SyntheticReturns,
    palette: Palette,
    /// Added to every day in this month
    month:   Option<(MonthLabel, f64)>,
    /// Added to every day on this weekday
    weekday: Option<(WeekdayLabel, f64)>,
}

impl Dataset {
    fn range(&self, clock: &impl Clock) -> anyhow::Result<DateRange> {
        if let Some(range) = self.range {
            return Ok(range);
        }
        let year = self.year.unwrap_or_else(|| clock.today().year());
        let start = NaiveDate::from_ymd_opt(year, 1, 1).with_context(|| format!("invalid year {year}"))?;
        let range = match self.year {
            Some(_) => {
                let end = NaiveDate::from_ymd_opt(year, 12, 31).with_context(|| format!("invalid year {year}"))?;
                DateRange::new(start, end)?
            },
            None => DateRange::ending_today(start, clock)?,
        };
        Ok(range)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct DemoConfig {
    #[serde(default = "default_datasets")]
    datasets: Vec<Dataset>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            datasets: default_datasets(),
        }
    }
}

fn default_datasets() -> Vec<Dataset> {
    let strong_march = Dataset {
        title: "Synthetic daily returns 2023 (strong March)".to_owned(),
        year: Some(2023),
        returns: SyntheticReturns::new(42, 0.0005, 0.01),
        month: Some((MonthLabel::Mar, 0.01)),
        ..Dataset::default()
    };
    let weak_mondays = Dataset {
        title: "Synthetic daily returns 2022 (weak Mondays)".to_owned(),
        year: Some(2022),
        returns: SyntheticReturns::new(43, 0.0, 0.015),
        palette: Palette {
            negative: Rgb::new(0xd7, 0x30, 0x27),
            zero:     Rgb::new(0xff, 0xff, 0xbf),
            positive: Rgb::new(0x1a, 0x98, 0x50),
        },
        weekday: Some((WeekdayLabel::Mon, -0.005)),
        ..Dataset::default()
    };
    vec![strong_march, weak_mondays]
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<DemoConfig> {
    let Some(path) = path else {
        return Ok(DemoConfig::default());
    };
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config = toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
    info!("Loaded demo config from {}", path.display());
    Ok(config)
}

fn render_dataset(dataset: &Dataset, range: &DateRange, renderer: &mut TextRenderer) -> anyhow::Result<String> {
    let mut values = dataset.returns.generate_for(range)?;

    if let Some((month, delta)) = dataset.month {
        let changed = add_in_month(&mut values, range, month, delta);
        info!(%month, delta, changed, "adjusted month");
    }
    if let Some((weekday, delta)) = dataset.weekday {
        let changed = add_on_weekday(&mut values, range, weekday, delta);
        info!(%weekday, delta, changed, "adjusted weekday");
    }

    let options = RenderOptions::default()
        .with_title(dataset.title.clone())
        .with_palette(dataset.palette);
    let out = plot(&values, range.start(), range.end(), &options, renderer)
        .with_context(|| format!("rendering {}", dataset.title))?;
    Ok(out)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    if let Some(seed) = cli.seed {
        for (offset, dataset) in (0u64..).zip(config.datasets.iter_mut()) {
            dataset.returns.seed = seed.wrapping_add(offset);
        }
    }

    let mut renderer = TextRenderer::new(cli.ansi);
    for dataset in &config.datasets {
        let range = dataset.range(&SystemClock)?;
        info!(%range, seed = dataset.returns.seed, "rendering dataset");
        let out = render_dataset(dataset, &range, &mut renderer)?;
        println!("{out}");
    }

    Ok(())
}
