// lambdacalc: Church numeral demos over pluggable memory backends

use std::io;

use clap::Parser;

use lambdacalc::config::{defaults, BackendKind, Config};
use lambdacalc::demo::{self, report::Reporter, DemoOptions, Workload};
use lambdacalc::interpreter::engine::Evaluator;
use lambdacalc::memory::{Arena, Backend, Pooled, Refcounted};

#[derive(Parser, Debug)]
#[command(
    name = "lambdacalc",
    version,
    about = "Fold Church numerals built from closures",
    long_about = "Fold Church numerals built from closures.

Without a workload, folds the numerals N0.. and prints a few powers, sums and products.
With the workload 'n9', times N9^N9 (any 'nK' times NK^NK)."
)]
struct Cli {
    /// Pass 'n9' to time N9^N9 (or 'nK' for NK^NK) instead of running the folding demo
    workload: Option<String>,

    /// Memory backend: arena, refcounted or pooled
    #[arg(short, long, env = "LAMBDACALC_BACKEND", default_value_t = BackendKind::Arena)]
    backend: BackendKind,

    /// Numerals in the folding table
    #[arg(short, long, default_value_t = defaults::NUMERAL_COUNT)]
    count: usize,

    /// Bytes per arena block
    #[arg(long, value_name = "BYTES", default_value_t = defaults::BLOCK_CAPACITY)]
    block_capacity: usize,

    /// Timed repetitions of the n9 workload
    #[arg(short, long, default_value_t = defaults::REPEAT)]
    repeat: usize,

    /// Print allocation counts per closure kind after the run
    #[arg(short, long)]
    stats: bool,

    /// Disable styled output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            backend: self.backend,
            block_capacity: self.block_capacity,
            numeral_count: self.count,
            repeat: self.repeat,
        }
    }

    fn workload(&self) -> Result<Workload, String> {
        let Some(name) = self.workload.as_deref() else {
            return Ok(Workload::Fold);
        };
        name.strip_prefix('n')
            .and_then(|k| k.parse::<usize>().ok())
            .map(Workload::SelfPower)
            .ok_or_else(|| format!("Unknown workload '{}' (expected e.g. 'n9')", name))
    }
}

fn run_with<B: Backend>(backend: B, options: &DemoOptions, color: bool) -> io::Result<()> {
    let eval = Evaluator::new(backend);
    let mut reporter = Reporter::new(io::stdout().lock(), color);
    demo::run(&eval, options, &mut reporter)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();

    let config = cli.config();
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let workload = match cli.workload() {
        Ok(workload) => workload,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let options = DemoOptions {
        workload,
        numeral_count: config.numeral_count,
        repeat: config.repeat,
        stats: cli.stats,
    };
    let color = !cli.no_color;

    log::info!("Running {:?} on the {} backend", workload, config.backend);

    match config.backend {
        BackendKind::Arena => run_with(Arena::new(config.block_capacity), &options, color)?,
        BackendKind::Refcounted => run_with(Refcounted::new(), &options, color)?,
        BackendKind::Pooled => run_with(Pooled::new(), &options, color)?,
    }

    Ok(())
}
