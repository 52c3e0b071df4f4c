use grid_astar::config::{Cli, Config};
use grid_astar::map::Map;
use grid_astar::scenario::{Route, Scenario};
use grid_astar::stat::Stats;
use grid_astar::{PathResult, PathSearch, SearchSnapshot};

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct RouteReport {
    route: Route,
    result: Option<PathResult>,
    error: Option<String>,
    stats: Option<Stats>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("failed to read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    if cli.config.is_none() {
        info!("No config file specified, using default config");
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let map = match &config.map_path {
        Some(map_path) => Map::from_file(map_path)?,
        None => Map::random(config.rows, config.cols, config.obstacle_chance, &mut rng)?,
    };
    let scenario = match &config.scenario_path {
        Some(scenario_path) => Scenario::load(scenario_path)?,
        None => Scenario::generate_random(&map, config.num_queries, &mut rng),
    };
    info!(
        "map {}x{}, {} queries, search config {:?}",
        map.height,
        map.width,
        scenario.routes.len(),
        config.search_config()
    );

    let search = PathSearch::new(&map, config.search_config());
    let mut reports = Vec::with_capacity(scenario.routes.len());
    for route in &scenario.routes {
        let report = if config.show_search_process {
            run_stepwise(&search, &config, *route)?
        } else {
            run_sync(&search, *route)
        };
        reports.push(report);
    }

    if let Some(output_path) = &config.output_path {
        let file = std::fs::File::create(output_path)
            .with_context(|| format!("failed to create report: {output_path}"))?;
        serde_yaml::to_writer(file, &reports)?;
        info!("Report written to {output_path}");
    }

    Ok(())
}

fn run_sync(search: &PathSearch<&Map>, route: Route) -> RouteReport {
    if let Err(err) = search.validate_endpoints(route.start, route.goal) {
        return rejected(route, err);
    }
    let (result, stats) = search.find_path_sync_with_stats(route.start, route.goal);
    info!("{:?} -> {:?}: {}", route.start, route.goal, result.summary());
    stats.print();
    RouteReport {
        route,
        result: Some(result),
        error: None,
        stats: Some(stats),
    }
}

fn run_stepwise(
    search: &PathSearch<&Map>,
    config: &Config,
    route: Route,
) -> anyhow::Result<RouteReport> {
    let mut steps = match search.find_path_stepwise_checked(route.start, route.goal) {
        Ok(steps) => steps,
        Err(err) => return Ok(rejected(route, err)),
    };
    let delay = Duration::from_millis(config.visualization_delay_ms);

    let mut result = PathResult::NotFound;
    for snapshot in steps.by_ref() {
        if config.emit_json {
            println!("{}", serde_json::to_string(&snapshot)?);
        } else {
            let path = snapshot.result().and_then(PathResult::path);
            println!(
                "{}\n",
                search
                    .oracle()
                    .render((route.start, route.goal), Some(&snapshot), path)
            );
        }
        if let SearchSnapshot::Finished { result: final_result, .. } = snapshot {
            result = final_result;
        } else if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    info!("{:?} -> {:?}: {}", route.start, route.goal, result.summary());
    steps.stats().print();
    Ok(RouteReport {
        route,
        result: Some(result),
        error: None,
        stats: Some(steps.stats().clone()),
    })
}

fn rejected(route: Route, err: grid_astar::SearchError) -> RouteReport {
    warn!("skip query {:?} -> {:?}: {err}", route.start, route.goal);
    RouteReport {
        route,
        result: None,
        error: Some(err.to_string()),
        stats: None,
    }
}
