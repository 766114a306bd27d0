// intersection_main.rs
use adaptive_intersection::monitoring::report::{export_history, export_summary};
use adaptive_intersection::{SimEvent, Simulation, SimulationConfig};
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{sleep, Duration};

#[derive(Parser, Debug)]
#[command(name = "intersection_main")]
#[command(about = "Adaptive four-way intersection controller")]
struct Cli {
    /// How long to run the controller, in seconds
    #[arg(long, default_value = "60")]
    seconds: u64,

    /// Seed for the arrival generator
    #[arg(long)]
    seed: Option<u64>,

    /// Initial weather: clear, rain, fog or storm
    #[arg(long, default_value = "clear")]
    weather: String,

    /// JSON file overriding timings and capacities
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append the performance history to this CSV file on exit
    #[arg(long)]
    history_csv: Option<PathBuf>,

    /// Append a one-line run summary to this CSV file on exit
    #[arg(long)]
    summary_csv: Option<PathBuf>,

    /// Read console commands from stdin while running
    #[arg(long)]
    interactive: bool,

    /// Print the final snapshot as JSON instead of the log feed
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };
    if cli.seed.is_some() {
        config.rng_seed = cli.seed;
    }

    let sim = Simulation::new(config);
    sim.set_weather_named(&cli.weather)?;

    let mut events = sim.subscribe();
    let quiet = cli.json;
    let feed = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SimEvent::LogLine { message, category }) => {
                    if !quiet {
                        println!("{} {}", category.tag(), message);
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(missed)) => log::warn!("log feed lagged, {} events dropped", missed),
                Err(RecvError::Closed) => break,
            }
        }
    });

    sim.initialize();
    sim.start();

    let deadline = sleep(Duration::from_secs(cli.seconds));
    tokio::pin!(deadline);
    if cli.interactive {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                _ = &mut deadline => break,
                line = lines.next_line() => match line? {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => match line.trim() {
                        "quit" | "exit" => break,
                        "start" => sim.start(),
                        "pause" => sim.pause(),
                        text => println!("> {}", sim.run_command(text)),
                    },
                    None => break,
                },
            }
        }
    } else {
        deadline.await;
    }

    sim.pause();
    feed.abort();

    let snapshot = sim.snapshot();
    if let Some(path) = &cli.history_csv {
        export_history(path, &sim.history())?;
    }
    if let Some(path) = &cli.summary_csv {
        export_summary(path, &snapshot)?;
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!();
        println!("Status:      {}", snapshot.status);
        println!("Vehicles:    {}", snapshot.metrics.total_vehicles);
        println!("Processed:   {}", snapshot.metrics.processed_cars);
        println!("Avg wait:    {:.1}s", snapshot.metrics.average_wait_secs);
        println!("Efficiency:  {:.0}%", snapshot.metrics.efficiency);
        println!("Throughput:  {}/min", snapshot.metrics.throughput);
        println!("Weather:     {}", snapshot.weather_impact);
        println!("Congestion:  {}", snapshot.congestion);
    }
    Ok(())
}
