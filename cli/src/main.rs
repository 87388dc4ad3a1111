mod command;
mod interactive;
mod session;

use std::{
    fs::File,
    io::{stdout, BufWriter, Read},
    path::PathBuf,
};

use anyhow::{Context, Result};
use cache_sim::{
    config::{CacheConfig, Precedence},
    sim::Simulator,
    trace::{EmptyTrace, JsonTrace, Trace},
};
use clap::{Args, Parser, Subcommand};
use session::{Flow, Session};

#[cfg(feature = "stat")]
use terminal_size::terminal_size;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// execute a stimulus script
    Run(RunArgs),
    /// read commands from stdin
    Interactive(CommonArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// File path to cache config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of cache lines (overrides config)
    #[arg(long)]
    lines: Option<usize>,
    /// Which enable is served when both are asserted (write-wins or read-wins)
    #[arg(long)]
    precedence: Option<Precedence>,
    /// File path to JSON-lines trace of every clock edge
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Keep the low 22 bits of wide addresses instead of rejecting them
    #[arg(long)]
    mask_address: bool,
    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    delegate: CommonArgs,
    /// File path to stimulus script
    #[arg(short, long)]
    script: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    match args.command {
        Command::Run(RunArgs { delegate, script }) => {
            let src = {
                let mut buf = String::new();
                let mut file = File::open(&script)
                    .with_context(|| format!("failed to open {}", script.display()))?;
                file.read_to_string(&mut buf)?;
                buf
            };
            let mut session = build_session(delegate)?;
            let mut out = stdout();
            for (i, line) in src.lines().enumerate() {
                let lineno = i + 1;
                let parsed = command::parse_command(line).map_err(|e| {
                    anyhow::anyhow!("{}:{lineno}: expected {}", script.display(), e.expected)
                })?;
                let flow = session
                    .apply(parsed, &mut out)
                    .with_context(|| format!("{}:{lineno}", script.display()))?;
                if let Flow::Exit = flow {
                    break;
                }
            }
            finish(session)
        }
        Command::Interactive(delegate) => {
            let mut session = build_session(delegate)?;
            interactive::execute_interactive(&mut session)?;
            finish(session)
        }
    }
}

fn build_session(args: CommonArgs) -> Result<Session<Box<dyn Trace>>> {
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::init();
    }
    let config = read_config(&args)?;
    let trace: Box<dyn Trace> = match &args.trace {
        Some(p) => {
            let file = File::create(p)
                .with_context(|| format!("failed to create {}", p.display()))?;
            log::info!("tracing clock edges to {}", p.display());
            Box::new(JsonTrace::new(BufWriter::new(file)))
        }
        None => Box::new(EmptyTrace::new()),
    };
    let sim = Simulator::new(&config, trace)?;
    Ok(Session::new(sim, args.mask_address, stat_width()))
}

fn read_config(args: &CommonArgs) -> Result<CacheConfig> {
    let mut config = match &args.config {
        Some(p) => {
            let file = File::open(p).with_context(|| format!("failed to open {}", p.display()))?;
            CacheConfig::from_reader(file)?
        }
        None => Default::default(),
    };
    if let Some(lines) = args.lines {
        config.lines = lines;
    }
    if let Some(precedence) = args.precedence {
        config.precedence = precedence;
    }
    config.validate()?;
    Ok(config)
}

fn finish(session: Session<Box<dyn Trace>>) -> Result<()> {
    let sim = session.finish()?;
    log::info!("finished execution at cycle #{}.", sim.cycle());
    output_stat(&sim);
    Ok(())
}

#[cfg(not(feature = "stat"))]
fn output_stat<T>(_: &Simulator<T>) {}

#[cfg(feature = "stat")]
fn output_stat<T>(sim: &Simulator<T>) {
    log::info!("statistics:\n{}", sim.collect_stat().view(stat_width()));
}

#[cfg(feature = "stat")]
fn stat_width() -> usize {
    terminal_size()
        .map(|(w, _)| w.0.saturating_sub(20))
        .unwrap_or(120) as usize
}

#[cfg(not(feature = "stat"))]
fn stat_width() -> usize {
    120
}
