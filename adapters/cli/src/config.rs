//! Scenario files describing the initial grid population.

use std::{collections::BTreeSet, fs, path::Path};

use anyhow::{bail, Context, Result};
use cellgrid_core::{CellBounds, EntityId, GridCoord, DEFAULT_TRANSITION_SPEED};
use cellgrid_system_pathfinding::HeuristicMode;
use glam::Vec2;
use serde::Deserialize;

const DEFAULT_TICKS: usize = 600;

/// Validated scenario ready to seed a session.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Scenario {
    player: EntityId,
    bounds: CellBounds,
    heuristic: HeuristicMode,
    ticks: usize,
    click: Option<Vec2>,
    entities: Vec<EntitySpec>,
}

/// Entity to register with the grid before the first tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct EntitySpec {
    pub(crate) id: EntityId,
    pub(crate) cell: GridCoord,
    pub(crate) solid: bool,
    pub(crate) speed: f32,
}

impl Scenario {
    /// Reads and validates the scenario stored at `path`.
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid scenario {}", path.display()))
    }

    /// Parses and validates scenario TOML.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let file: ScenarioFile =
            toml::from_str(contents).context("failed to parse scenario toml contents")?;

        let min = GridCoord::new(file.bounds.min[0], file.bounds.min[1]);
        let max = GridCoord::new(file.bounds.max[0], file.bounds.max[1]);
        let Some(bounds) = CellBounds::new(min, max) else {
            bail!("scenario bounds are inverted: min {min:?} lies beyond max {max:?}");
        };

        let mut seen = BTreeSet::new();
        let mut entities = Vec::with_capacity(file.entities.len());
        for entry in file.entities {
            let id = EntityId::new(entry.id);
            if !seen.insert(id) {
                bail!("scenario lists entity {id} more than once");
            }
            let cell = GridCoord::new(entry.cell[0], entry.cell[1]);
            if !bounds.contains(cell) {
                bail!("entity {id} at {cell:?} lies outside the scenario bounds");
            }
            entities.push(EntitySpec {
                id,
                cell,
                solid: entry.solid,
                speed: entry.speed.unwrap_or(DEFAULT_TRANSITION_SPEED),
            });
        }

        let player = EntityId::new(file.player);
        if !seen.contains(&player) {
            bail!("player entity {player} is not listed among the scenario entities");
        }

        Ok(Self {
            player,
            bounds,
            heuristic: file.heuristic.into(),
            ticks: file.ticks.unwrap_or(DEFAULT_TICKS),
            click: file.click.map(Vec2::from),
            entities,
        })
    }

    pub(crate) const fn player(&self) -> EntityId {
        self.player
    }

    pub(crate) const fn bounds(&self) -> CellBounds {
        self.bounds
    }

    pub(crate) const fn heuristic(&self) -> HeuristicMode {
        self.heuristic
    }

    pub(crate) const fn ticks(&self) -> usize {
        self.ticks
    }

    pub(crate) const fn click(&self) -> Option<Vec2> {
        self.click
    }

    pub(crate) fn entities(&self) -> &[EntitySpec] {
        &self.entities
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    player: u32,
    ticks: Option<usize>,
    click: Option<[f32; 2]>,
    #[serde(default)]
    heuristic: HeuristicSetting,
    bounds: BoundsEntry,
    #[serde(default)]
    entities: Vec<EntityEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoundsEntry {
    min: [i16; 2],
    max: [i16; 2],
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityEntry {
    id: u32,
    cell: [i16; 2],
    #[serde(default = "default_solid")]
    solid: bool,
    speed: Option<f32>,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum HeuristicSetting {
    #[default]
    Truncated,
    Exact,
}

impl From<HeuristicSetting> for HeuristicMode {
    fn from(setting: HeuristicSetting) -> Self {
        match setting {
            HeuristicSetting::Truncated => Self::Truncated,
            HeuristicSetting::Exact => Self::Exact,
        }
    }
}

fn default_solid() -> bool {
    true
}
