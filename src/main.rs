use clap::{Parser, ValueEnum};
use rfcascade::analysis;
use rfcascade::ir::CascadeJob;
use rfcascade::output;
use rfcascade::parser;
use rfcascade::stats::Stats;
use std::io;
use std::path::Path;
use std::time::Instant;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

/// Frequency-swept RF cascade analysis (gain, noise figure, P1dB)
#[derive(Parser)]
#[command(name = "rfcascade", version)]
struct Cli {
    /// Stackup netlist, or a JSON job file (.json)
    input: String,

    /// Output format
    #[arg(long, value_enum, default_value = "csv")]
    format: Format,

    /// Print performance stats to stderr
    #[arg(long)]
    stats: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut stats = if cli.stats { Some(Stats::new()) } else { None };

    let t = Instant::now();
    let input = std::fs::read_to_string(&cli.input).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {}", cli.input, e);
        std::process::exit(1);
    });

    let is_json = Path::new(&cli.input)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let job = if is_json {
        CascadeJob::from_json(&input)
    } else {
        parser::parse(&input)
    }
    .unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });
    if let Some(ref mut s) = stats {
        s.add_phase("Parse", t.elapsed());
    }

    let t = Instant::now();
    let result = analysis::analyze(&job.stackup, &job.params, stats.as_mut()).unwrap_or_else(|e| {
        eprintln!("Cascade analysis error: {}", e);
        std::process::exit(1);
    });
    if let Some(ref mut s) = stats {
        s.add_phase("Analysis", t.elapsed());
    }

    let t = Instant::now();
    let mut stdout = io::stdout().lock();
    let written = match cli.format {
        Format::Csv => output::write_csv(&result, &mut stdout),
        Format::Json => output::write_json(&result, &mut stdout),
    };
    written.unwrap_or_else(|e| {
        eprintln!("Output error: {}", e);
        std::process::exit(1);
    });
    if let Some(ref mut s) = stats {
        s.add_phase("Output", t.elapsed());
    }

    if let Some(ref stats) = stats {
        stats.display();
    }
}
