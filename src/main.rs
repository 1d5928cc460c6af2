use anyhow::Context;
use clap::Parser;
use conto_termico::output::{format_eur, result_to_json, FileOutput, RESULT_LOCATION_KEY};
use conto_termico::{run_request, IncentiveResult};
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser, Default, Debug)]
#[clap(author, version, about, long_about = None)]
struct ContoTermicoArgs {
    #[arg(help = "Path to a calculation request in .json format")]
    input_file: String,
    #[arg(
        long,
        short,
        help = "Directory to write the result to (defaults to the directory of the input file)"
    )]
    output_dir: Option<PathBuf>,
    #[arg(long, short, default_value_t = false, help = "Log at debug level")]
    verbose: bool,
    #[clap(long, default_value_t = false, help = "Whether to log out spans")]
    log_spans: bool,
    #[arg(
        long,
        short,
        default_value_t = false,
        help = "Echo the JSON export of the result to stdout"
    )]
    print: bool,
}

fn main() -> anyhow::Result<()> {
    let args = ContoTermicoArgs::parse();

    // set up basic tracing
    let tracing_subscriber = {
        let level = if args.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        };
        let mut builder = tracing_subscriber::fmt::fmt().with_max_level(level);

        if args.log_spans {
            builder = builder.with_span_events(FmtSpan::CLOSE);
        }

        builder.finish()
    };
    tracing::subscriber::set_global_default(tracing_subscriber)
        .context("setting tracing subscriber failed")?;

    let input_path = Path::new(&args.input_file);
    let input_file_stem = input_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("Could not derive a file stem from {}", args.input_file))?;
    let output_path = match args.output_dir {
        Some(dir) => dir,
        None => input_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };
    fs::create_dir_all(&output_path)?;

    let file_output = FileOutput::new(output_path, input_file_stem.to_string());
    debug!(
        path = %file_output.path_for_location_key(RESULT_LOCATION_KEY).display(),
        "writing result"
    );

    let input = BufReader::new(
        File::open(input_path)
            .with_context(|| format!("Could not open request file {}", args.input_file))?,
    );
    let result = run_request(input, &file_output)?;
    info!(
        intervention = %result.intervention(),
        total = result.total_incentive_eur(),
        "incentive calculated"
    );

    print_summary(&result);
    if args.print {
        println!("{}", result_to_json(&result)?);
    }

    Ok(())
}

fn print_summary(result: &IncentiveResult) {
    println!("{}", result.intervention());
    println!(
        "  Total incentive: {}",
        format_eur(result.total_incentive_eur())
    );
    println!(
        "  Installments: {} x {}",
        result.installments(),
        format_eur(result.installment_eur())
    );
    for note in result.notes() {
        println!("  Note: {note}");
    }
}
