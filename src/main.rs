//! Tabgrid - edit HTML fragment tables like a lightweight spreadsheet

mod config;
mod render;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tabgrid_core::{Session, SessionOptions};

fn print_usage() {
    eprintln!("Usage: tabgrid [OPTIONS] <FILE>");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <FILE>                 HTML fragment to load");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output <FILE>    Write the result to a file instead of stdout");
    eprintln!("  --tables               Render the tables as markdown instead of cleaned markup");
    eprintln!("  --config <FILE>        Load session options from a TOML file");
    eprintln!("  -h, --help             Print help");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut file_path: Option<PathBuf> = None;
    let mut output_file: Option<PathBuf> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut tables = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires a file path");
                    std::process::exit(1);
                }
                output_file = Some(PathBuf::from(&args[i]));
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                config_file = Some(PathBuf::from(&args[i]));
            }
            "--tables" => tables = true,
            arg if arg.starts_with('-') => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if file_path.is_none() {
                    file_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    let Some(file_path) = file_path else {
        eprintln!("Error: No input file given");
        print_usage();
        std::process::exit(1);
    };

    let (options, warnings) = config::load_options(config_file.as_ref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    if let Err(e) = run(&file_path, output_file.as_deref(), tables, options) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(
    input: &Path,
    output: Option<&Path>,
    tables: bool,
    options: SessionOptions,
) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;

    let mut session = Session::with_options(options);
    session
        .load(&source)
        .with_context(|| format!("loading {}", input.display()))?;

    if tables {
        match output {
            Some(path) => {
                let mut file = std::fs::File::create(path)
                    .with_context(|| format!("creating {}", path.display()))?;
                render::write_markdown(&mut file, &session)?;
                println!("Exported to {}", path.display());
            }
            None => {
                let stdout = std::io::stdout();
                render::write_markdown(&mut stdout.lock(), &session)?;
            }
        }
        return Ok(());
    }

    let clean = session.clean_html();
    match output {
        Some(path) => {
            std::fs::write(path, &clean)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Exported to {}", path.display());
        }
        None => println!("{}", clean),
    }
    Ok(())
}
