//! m2m CLI - Convert CSV rows into UNTL metadata records
//!
//! ```bash
//! m2m mapping.json books.csv            # Print each record's XML
//! m2m mapping.json books.csv -w         # Write <base>/<folder>/metadata.xml
//! m2m mapping.json books.csv -j         # Write <base>/<folder>/metadata.json
//! m2m mapping.json books.csv -n 3 -w    # Only the third data row
//! m2m --example-mapping                 # Show an example mapping file
//! m2m --operations                      # Show available value operations
//! ```

use clap::{CommandFactory, Parser};
use m2m::config::{parse_delimiter, Settings};
use m2m::error::{ConfigError, PipelineResult};
use m2m::logs;
use m2m::{example_mapping, operations_description, ConvertOptions};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "m2m", version)]
#[command(about = "Convert CSV rows into UNTL metadata records", long_about = None)]
struct Cli {
    /// Mapping file to use for this CSV
    #[arg(required_unless_present_any = ["example_mapping", "operations"])]
    mapping: Option<PathBuf>,

    /// CSV file to process
    #[arg(required_unless_present_any = ["example_mapping", "operations"])]
    file: Option<PathBuf>,

    /// Process only this row (1-indexed)
    #[arg(short = 'n', long)]
    row: Option<usize>,

    /// Write records to metadata.xml files
    #[arg(short, long)]
    write: bool,

    /// Write the raw row to metadata.json files
    #[arg(short, long)]
    json: bool,

    /// CSV delimiter (default: M2M_DELIMITER or ',')
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Base directory replacing the one set by the mapping
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,

    /// Print an example mapping file and exit
    #[arg(long)]
    example_mapping: bool,

    /// Print the value operation reference and exit
    #[arg(long)]
    operations: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            if let Err(io) = e.print() {
                eprintln!("❌ Error: {}", io);
            }
            std::process::exit(code);
        }
    };

    if let Err(e) = execute(cli) {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> PipelineResult<()> {
    if cli.example_mapping {
        println!("{}", example_mapping().to_json()?);
        return Ok(());
    }
    if cli.operations {
        println!("{}", operations_description());
        return Ok(());
    }

    let settings = Settings::from_env()?;
    let level = if cli.quiet { "error" } else { settings.log_level };
    logs::init_logging(level, settings.log_format)?;

    let delimiter = match cli.delimiter {
        Some(c) => parse_delimiter(&c.to_string()).ok_or(ConfigError::InvalidValue {
            key: "--delimiter",
            value: c.to_string(),
        })?,
        None => settings.delimiter,
    };

    let options = ConvertOptions {
        row: cli.row,
        write_xml: cli.write,
        write_json: cli.json,
        output_dir: cli.output_dir.or(settings.output_dir),
        delimiter,
    };

    let (Some(mapping), Some(file)) = (cli.mapping, cli.file) else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    m2m::run(&mapping, &file, &options, &mut out)?;
    out.flush()?;
    Ok(())
}
