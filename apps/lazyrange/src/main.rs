use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lazyrange_config::{REFERENCE_LEN, ScenarioConfig, load_config};
use lazyrange_logging::{LogFormat, LogLevel};
use lazyrange_tree::{LazyRangeTree, RangeOp};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lazyrange")]
#[command(about = "Run range add / range sum scenarios against a lazy segment tree.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Log level (error, warn, info, debug, trace). Overrides the scenario file.
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Log format (plain, compact, json). Overrides the scenario file.
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the reference scenario over an array of zeros.
    Demo {
        /// Array length.
        #[arg(long, default_value_t = REFERENCE_LEN)]
        len: usize,
    },

    /// Run a scenario file (YAML or JSON).
    Run {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut scenario = match cli.cmd {
        Command::Demo { len } => {
            let scenario = ScenarioConfig::reference_with_len(len);
            scenario.validate()?;
            scenario
        }
        Command::Run { config } => load_config(&config)?,
    };

    if let Some(level) = cli.log_level {
        scenario.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        scenario.logging.format = format;
    }
    lazyrange_logging::init(&scenario.logging)?;

    let lines = run_scenario(&scenario)?;

    let mut stdout = std::io::stdout().lock();
    for line in &lines {
        writeln!(stdout, "{line}").context("failed to write report")?;
    }
    Ok(())
}

/// Build the scenario's tree, execute every op and render one line per query.
fn run_scenario(scenario: &ScenarioConfig) -> Result<Vec<String>> {
    let mut tree = LazyRangeTree::build(&scenario.initial_values())
        .context("failed to build tree from scenario")?;
    tracing::info!(len = tree.len(), ops = scenario.ops.len(), "running scenario");

    let mut lines = Vec::new();
    for op in &scenario.ops {
        match *op {
            RangeOp::Update { start, end, delta } => {
                tree.update_range(start, end, delta);
                tracing::debug!(start, end, delta, "applied update");
            }
            RangeOp::Query { start, end } => {
                let sum = tree.query_sum(start, end);
                lines.push(format!("sum [{start}..={end}] = {sum}"));
            }
        }
    }
    Ok(lines)
}
