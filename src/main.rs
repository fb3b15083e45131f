use stemsim::{bench_broad_phase, bench_step_curve};
use stemsim::{PresetKind, Scenario, ScenarioConfig};

use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Headless runner for stemsim scenarios")]
struct Args {
    /// Scenario file, looked up under `scenarios/` unless it is a path that exists
    #[arg(short, long = "file", default_value = "bouncing_balls.yaml")]
    file_name: String,

    /// Run a built-in preset instead of a scenario file
    #[arg(long)]
    preset: Option<String>,

    /// Number of steps; defaults to t_end / dt
    #[arg(long)]
    steps: Option<usize>,

    /// Print metrics every N steps (0 = only the last step)
    #[arg(long, default_value_t = 0)]
    report_every: usize,

    /// Run the broad-phase and step benchmarks and exit
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let direct = PathBuf::from(file_name);
    let config_path = if direct.exists() {
        direct
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };
    let file = File::open(&config_path).with_context(|| format!("opening {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig =
        serde_yaml::from_reader(reader).with_context(|| format!("parsing {}", config_path.display()))?;
    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_broad_phase(&[200, 400, 800, 1600, 3200])?;
        bench_step_curve(2000, 250, 5)?;
        return Ok(());
    }

    let mut scenario = match &args.preset {
        Some(name) => Scenario::from_preset(name.parse::<PresetKind>()?)?,
        None => Scenario::build_scenario(load_scenario_from_yaml(&args.file_name)?)?,
    };

    let steps = args.steps.unwrap_or_else(|| scenario.engine.parameters.step_count());
    log::info!("running {} steps of dt = {}", steps, scenario.engine.parameters.dt);

    let mut last = None;
    for i in 1..=steps {
        let metrics = scenario.step();
        if args.report_every > 0 && i % args.report_every == 0 {
            println!("{}", serde_yaml::to_string(&metrics)?);
        }
        last = Some(metrics);
    }

    if let Some(metrics) = last {
        println!("{}", serde_yaml::to_string(&metrics)?);
    }
    for body in &scenario.system.bodies {
        println!(
            "{:>24}  x = [{:>10.4}, {:>10.4}, {:>10.4}]  |v| = {:.4}",
            body.id.as_str(), body.x.x, body.x.y, body.x.z, body.v.norm()
        );
    }

    Ok(())
}
