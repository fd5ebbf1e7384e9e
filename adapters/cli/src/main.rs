#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a grid scenario headlessly.

mod config;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::Scenario, session::Session};

/// Loads a scenario, plans the player's route to a clicked point and walks it.
#[derive(Debug, Parser)]
#[command(name = "cellgrid", version)]
struct Cli {
    /// Scenario file describing bounds and entities.
    #[arg(long)]
    scenario: PathBuf,
    /// Maximum number of ticks to simulate. Defaults to the scenario value.
    #[arg(long)]
    ticks: Option<usize>,
    /// World-space click position as `X,Y`. Overrides the scenario value.
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    click: Option<Vec2>,
    /// Tracing filter directive. Falls back to `RUST_LOG`, then `info`.
    #[arg(long)]
    log_filter: Option<String>,
}

/// Entry point for the cellgrid command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_filter.as_deref())?;

    let scenario = Scenario::load(&cli.scenario)?;
    let click = cli
        .click
        .or(scenario.click())
        .context("no click target; pass --click or set `click` in the scenario")?;
    let ticks = cli.ticks.unwrap_or(scenario.ticks());

    let mut session = Session::new(&scenario)?;
    let steps = session.click(click)?;
    let report = session.run(ticks)?;

    info!(
        planned = steps,
        ticks = report.ticks,
        committed = report.committed,
        rejected = report.rejected,
        arrivals = report.arrivals,
        cell = ?session.player_cell()?,
        position = ?session.player_position(),
        "run finished"
    );
    Ok(())
}

fn init_tracing(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{directive}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}

fn parse_point(value: &str) -> Result<Vec2, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `X,Y`, got `{value}`"))?;
    let parse = |component: &str| {
        component
            .trim()
            .parse::<f32>()
            .map_err(|error| format!("invalid coordinate `{component}`: {error}"))
    };
    Ok(Vec2::new(parse(x)?, parse(y)?))
}
