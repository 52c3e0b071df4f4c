use anyhow::{anyhow, Context};
use clap::Parser;
use serde::Deserialize;

use crate::common::{CornerCutting, SearchConfig};

#[derive(Parser, Debug)]
#[command(
    name = "Grid A*",
    about = "A* shortest path search on a grid, in one shot or step by step.",
    version = "1.0"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the map file, a random grid is generated if absent")]
    pub map_path: Option<String>,

    #[arg(long, help = "Rows of the random grid")]
    pub rows: Option<usize>,

    #[arg(long, help = "Columns of the random grid")]
    pub cols: Option<usize>,

    #[arg(long, help = "Probability that a random cell is an obstacle")]
    pub obstacle_chance: Option<f64>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, help = "Path to a .scen or YAML scenario file")]
    pub scenario_path: Option<String>,

    #[arg(long, help = "Number of random queries when no scenario is given")]
    pub num_queries: Option<usize>,

    #[arg(long, help = "Allow diagonal moves (Euclidean metric)", default_value_t = false)]
    pub allow_diagonal: bool,

    #[arg(
        long,
        help = "Reject diagonal moves between two blocked orthogonal cells",
        default_value_t = false
    )]
    pub forbid_corner_cutting: bool,

    #[arg(long, help = "Print the open and closed sets after every expansion", default_value_t = false)]
    pub show_search_process: bool,

    #[arg(long, help = "Delay between stepwise frames in milliseconds")]
    pub visualization_delay_ms: Option<u64>,

    #[arg(long, help = "Print stepwise snapshots as JSON lines", default_value_t = false)]
    pub emit_json: bool,

    #[arg(long, help = "Path to the YAML result report")]
    pub output_path: Option<String>,

    #[arg(long, help = "Log filter, overridden by RUST_LOG")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub map_path: Option<String>,
    pub rows: usize,
    pub cols: usize,
    pub obstacle_chance: f64,
    pub seed: u64,
    pub scenario_path: Option<String>,
    pub num_queries: usize,
    pub allow_diagonal: bool,
    pub corner_cutting: CornerCutting,
    pub show_search_process: bool,
    pub visualization_delay_ms: u64,
    pub emit_json: bool,
    pub output_path: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_path: None,
            rows: 10,
            cols: 10,
            obstacle_chance: 0.3,
            seed: 0,
            scenario_path: None,
            num_queries: 1,
            allow_diagonal: false,
            corner_cutting: CornerCutting::Allow,
            show_search_process: false,
            visualization_delay_ms: 100,
            emit_json: false,
            output_path: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(yaml).context("failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Flags given on the command line win over the file.
    pub fn override_from_command_line(mut self, cli: &Cli) -> anyhow::Result<Self> {
        if let Some(map_path) = &cli.map_path {
            self.map_path = Some(map_path.clone());
        }
        if let Some(rows) = cli.rows {
            self.rows = rows;
        }
        if let Some(cols) = cli.cols {
            self.cols = cols;
        }
        if let Some(obstacle_chance) = cli.obstacle_chance {
            self.obstacle_chance = obstacle_chance;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(scenario_path) = &cli.scenario_path {
            self.scenario_path = Some(scenario_path.clone());
        }
        if let Some(num_queries) = cli.num_queries {
            self.num_queries = num_queries;
        }
        if let Some(delay) = cli.visualization_delay_ms {
            self.visualization_delay_ms = delay;
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        if let Some(log_level) = &cli.log_level {
            self.log_level = log_level.clone();
        }
        self.allow_diagonal |= cli.allow_diagonal;
        self.show_search_process |= cli.show_search_process;
        self.emit_json |= cli.emit_json;
        if cli.forbid_corner_cutting {
            self.corner_cutting = CornerCutting::Forbid;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..1.0).contains(&self.obstacle_chance) {
            return Err(anyhow!(
                "Obstacle chance must be in [0, 1), got {}",
                self.obstacle_chance
            ));
        }

        if self.map_path.is_none() && (self.rows == 0 || self.cols == 0) {
            return Err(anyhow!(
                "Random grid needs at least one row and one column, got {}x{}",
                self.rows,
                self.cols
            ));
        }

        if self.scenario_path.is_none() && self.num_queries == 0 {
            return Err(anyhow!("Number of queries must be greater than 0"));
        }
        Ok(())
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            allow_diagonal: self.allow_diagonal,
            corner_cutting: self.corner_cutting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search_config(), SearchConfig::new(false));
    }

    #[test]
    fn test_from_yaml_str() {
        let config = Config::from_yaml_str(
            "rows: 20\ncols: 30\nallow_diagonal: true\ncorner_cutting: forbid\nseed: 42\n",
        )
        .unwrap();
        assert_eq!(config.rows, 20);
        assert_eq!(config.cols, 30);
        assert_eq!(config.seed, 42);
        assert_eq!(config.obstacle_chance, 0.3);
        assert_eq!(
            config.search_config(),
            SearchConfig {
                allow_diagonal: true,
                corner_cutting: CornerCutting::Forbid,
            }
        );

        assert!(Config::from_yaml_str("obstacle_chance: 1.5\n").is_err());
        assert!(Config::from_yaml_str("rows: [1, 2]\n").is_err());
    }

    #[test]
    fn test_override_from_command_line() {
        let cli = Cli::parse_from([
            "grid_astar",
            "--rows",
            "7",
            "--allow-diagonal",
            "--forbid-corner-cutting",
            "--visualization-delay-ms",
            "0",
        ]);
        let config = Config::default().override_from_command_line(&cli).unwrap();
        assert_eq!(config.rows, 7);
        assert_eq!(config.cols, 10);
        assert_eq!(config.visualization_delay_ms, 0);
        assert!(config.allow_diagonal);
        assert_eq!(config.corner_cutting, CornerCutting::Forbid);

        let cli = Cli::parse_from(["grid_astar", "--num-queries", "0"]);
        assert!(Config::default().override_from_command_line(&cli).is_err());
    }
}
