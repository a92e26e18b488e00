use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::process::ExitCode;
use taxicab::{Strategy, Sum, TaxicabBuilder, WindowConfig, DEFAULT_CAPACITY_BITS};

#[derive(Parser, Debug)]
#[command(name = "taxicab")]
#[command(about = "Count the taxicab numbers up to a bound", long_about = None)]
#[command(version)]
struct Args {
    /// Largest sum of two cubes to consider
    #[arg(allow_negative_numbers = true)]
    bound: Sum,

    /// Duplicate detection strategy (hashed or sort-merge)
    #[arg(long, default_value_t = Strategy::Hashed)]
    strategy: Strategy,

    /// Candidate table size of the hashed strategy, as a power of two
    #[arg(long, default_value_t = DEFAULT_CAPACITY_BITS)]
    capacity_bits: u32,

    /// Target fraction of candidate slots filled per window
    #[arg(long)]
    density: Option<f64>,

    /// Width of the first window
    #[arg(long)]
    initial_width: Option<Sum>,

    /// Largest ratio between consecutive window widths
    #[arg(long)]
    growth_limit: Option<f64>,

    /// Size windows from the model alone, without occupancy feedback
    #[arg(long)]
    no_adaptive: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log window planning and table usage to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Translate the window flags into a library configuration
    fn window_config(&self) -> WindowConfig {
        let mut config = WindowConfig::new();
        config
            .capacity_bits(self.capacity_bits)
            .adaptive(!self.no_adaptive);
        if let Some(density) = self.density {
            config.density(density);
        }
        if let Some(width) = self.initial_width {
            config.initial_width(width);
        }
        if let Some(limit) = self.growth_limit {
            config.growth_limit(limit);
        }
        config
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Help and version requests also arrive here, on stdout
            if let Err(io_err) = err.print() {
                eprintln!("Error: can't write usage: {io_err}");
            }
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.target(env_logger::Target::Stderr).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    debug!("{args:?}");
    let report = TaxicabBuilder::new()
        .strategy(args.strategy)
        .window(args.window_config())
        .count(args.bound)
        .with_context(|| format!("counting taxicab numbers up to {}", args.bound))?;
    info!(
        "{} strategy used {} window(s)",
        report.strategy, report.stats.windows
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
