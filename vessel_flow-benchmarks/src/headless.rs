use vessel_flow::prelude::*;

use clap::{Parser, Subcommand};
use kdam::BarExt;
use serde::{Deserialize, Serialize};

#[derive(Subcommand, Debug)]
enum SubCommand {
    /// Run a single simulation and store its snapshots
    Run {
        /// Number of ticks to simulate
        #[arg(short, long, default_value_t = 3600)]
        n_steps: usize,

        /// Store a snapshot every n-th tick
        #[arg(long, default_value_t = 60)]
        snapshot_interval: usize,

        /// File in which the snapshots are stored as json
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Compare the time per tick of both collision strategies
    Compare {
        /// Number of cells per measurement
        #[arg(short, long, num_args = 1.., default_values_t = [100, 300, 1000, 3000])]
        n_cells: Vec<usize>,

        /// Ticks per measurement
        #[arg(long, default_value_t = 100)]
        n_steps: usize,
    },
}

/// Run the vessel flow simulation without any graphical output
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CLIArgs {
    /// Settings file in json or ron format
    #[arg(short, long)]
    settings: Option<String>,

    /// Seed of the random number generator. Overrides the value of the settings.
    #[arg(long)]
    seed: Option<u64>,

    /// Enable the pulsatile flow
    #[arg(long, default_value_t = false)]
    pulsatile: bool,

    /// Heart rate in beats per minute
    #[arg(long)]
    bpm: Option<f64>,

    /// Use the quadratic scan instead of the uniform grid
    #[arg(long, default_value_t = false)]
    quadratic_scan: bool,

    /// Disables output
    #[arg(long, default_value_t = false)]
    no_output: bool,

    #[command(subcommand)]
    commands: SubCommand,
}

impl CLIArgs {
    fn load_settings(&self) -> Result<Settings, SimulationError> {
        let mut settings = match &self.settings {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        if let Some(seed) = self.seed {
            settings.rng_seed = seed;
        }
        settings.parameters = self.tick_parameters(&settings.parameters);
        Ok(settings)
    }

    fn tick_parameters(&self, initial: &TickParameters) -> TickParameters {
        TickParameters {
            pulsatile: self.pulsatile || initial.pulsatile,
            bpm: self.bpm.unwrap_or(initial.bpm),
            use_spatial_hash: initial.use_spatial_hash && !self.quadratic_scan,
            ..initial.clone()
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct StrategyTiming {
    n_cells: usize,
    quadratic_scan_nanos: u128,
    uniform_grid_nanos: u128,
}

fn run(
    args: &CLIArgs,
    n_steps: usize,
    snapshot_interval: usize,
    output: Option<&String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let settings = args.load_settings()?;
    let mut simulation = Simulation::new(settings)?;
    let frame_seconds = simulation.parameters().frame_seconds;
    let mut time_stepper =
        FixedStepsize::from_snapshot_interval(0.0, frame_seconds, n_steps, snapshot_interval)?;
    let frames = simulation.run(&mut time_stepper, !args.no_output)?;

    if !args.no_output {
        let lost = frames.iter().filter(|frame| frame.lost_notice.is_some()).count();
        println!(
            "Simulated {} ticks, {} snapshots, {} while lost",
            simulation.tick(),
            frames.len(),
            lost
        );
        for (kind, count) in simulation.population_counts() {
            println!("{:>5} {count}", kind.symbol());
        }
    }
    if let Some(output) = output {
        let buffer = std::fs::File::create(output)?;
        serde_json::to_writer(buffer, &frames)?;
    }
    Ok(())
}

fn time_steps(
    args: &CLIArgs,
    n_cells: usize,
    n_steps: usize,
    use_spatial_hash: bool,
) -> Result<u128, SimulationError> {
    let mut settings = args.load_settings()?;
    settings.targets = PopulationTargets::empty()
        .with(CellKind::Erythrocyte, n_cells * 4 / 5)
        .with(CellKind::Platelet, n_cells / 5);
    settings.parameters.use_spatial_hash = use_spatial_hash;
    let mut simulation = Simulation::new(settings)?;
    let now = std::time::Instant::now();
    for _ in 0..n_steps {
        std::hint::black_box(simulation.step()?);
    }
    Ok(now.elapsed().as_nanos() / n_steps.max(1) as u128)
}

fn compare(
    args: &CLIArgs,
    n_cells: &[usize],
    n_steps: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut progress_bar = match args.no_output {
        true => None,
        false => Some(kdam::tqdm!(total = 2 * n_cells.len(), position = 0)),
    };
    let mut timings = Vec::new();
    for &n in n_cells {
        let mut measure = |use_spatial_hash: bool| -> Result<u128, SimulationError> {
            let time = time_steps(args, n, n_steps, use_spatial_hash)?;
            if let Some(bar) = progress_bar.as_mut() {
                bar.set_description(format!("Cells: {n}"));
                bar.update(1)?;
            }
            Ok(time)
        };
        let quadratic_scan_nanos = measure(false)?;
        let uniform_grid_nanos = measure(true)?;
        timings.push(StrategyTiming {
            n_cells: n,
            quadratic_scan_nanos,
            uniform_grid_nanos,
        });
    }
    println!("{}", serde_json::to_string_pretty(&timings)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CLIArgs::parse();

    #[cfg(feature = "tracing")]
    vessel_flow::core::init_tracing(vessel_flow::core::tracing::Level::INFO)?;

    match &args.commands {
        SubCommand::Run {
            n_steps,
            snapshot_interval,
            output,
        } => run(&args, *n_steps, *snapshot_interval, output.as_ref()),
        SubCommand::Compare { n_cells, n_steps } => compare(&args, n_cells, *n_steps),
    }
}
