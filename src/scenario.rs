use anyhow::{Context, Result};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use tracing::{info, warn};

use crate::common::Cell;
use crate::map::Map;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Route {
    pub start: Cell,
    pub goal: Cell,
}

/// A batch of start/goal queries against one map.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Scenario {
    #[serde(default)]
    pub map: Option<String>,
    pub routes: Vec<Route>,
}

impl Scenario {
    /// Read a MovingAI `.scen` file. Coordinates there are `x y` (column
    /// first); they are stored here as `(row, col)`.
    pub fn load_from_scen(path: &str) -> Result<Scenario> {
        let file = File::open(path).with_context(|| format!("failed to open scenario {path}"))?;
        let reader = BufReader::new(file);
        let mut lines = reader.lines();

        // First line is "version x.x" which we can skip
        let _version = lines.next().transpose()?;

        let mut scenario = Scenario::default();
        for (line_no, line) in lines.enumerate() {
            let line = line?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }
            if parts.len() < 8 {
                anyhow::bail!("{path}:{}: expected at least 8 fields", line_no + 2);
            }

            let field = |idx: usize| -> Result<usize> {
                parts[idx]
                    .parse()
                    .with_context(|| format!("{path}:{}: bad field {idx}", line_no + 2))
            };
            let route = Route {
                start: (field(5)?, field(4)?),
                goal: (field(7)?, field(6)?),
            };

            if scenario.map.is_none() {
                scenario.map = Some(parts[1].to_string());
            }
            scenario.routes.push(route);
        }

        Ok(scenario)
    }

    pub fn load_from_yaml(path: &str) -> Result<Scenario> {
        let file = File::open(path).with_context(|| format!("failed to open scenario {path}"))?;
        let reader = BufReader::new(file);
        let scenario = serde_yaml::from_reader(reader)?;
        Ok(scenario)
    }

    /// Pick the loader from the file extension.
    pub fn load(path: &str) -> Result<Scenario> {
        if path.ends_with(".scen") {
            Self::load_from_scen(path)
        } else {
            Self::load_from_yaml(path)
        }
    }

    pub fn write_to_yaml(&self, path: &str) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = io::BufWriter::new(file);
        let yaml_data = serde_yaml::to_string(self)?;
        writer.write_all(yaml_data.as_bytes())?;

        Ok(())
    }

    /// `num_routes` random start/goal pairs on walkable cells of `map`.
    pub fn generate_random<R: Rng + ?Sized>(map: &Map, num_routes: usize, rng: &mut R) -> Scenario {
        let routes: Vec<Route> = (0..num_routes)
            .map_while(|_| map.random_endpoints(&mut *rng))
            .map(|(start, goal)| Route { start, goal })
            .collect();

        if routes.len() < num_routes {
            warn!("map has fewer than two walkable cells, no routes generated");
        }
        info!("Generate scen: {routes:?}");
        Scenario { map: None, routes }
    }
}
