use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use docxide_review::FormatRules;

#[derive(Parser)]
#[command(name = "docxide-review")]
#[command(version)]
#[command(about = "Check a DOCX dissertation against formatting rules and add page numbers and a table of contents", long_about = None)]
struct Cli {
    /// Input DOCX file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output DOCX file (default: <input>_formatted.docx)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// JSON file overriding the default formatting rules
    #[arg(long, value_name = "FILE")]
    rules: Option<PathBuf>,
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".into());
    input.with_file_name(format!("{stem}_formatted.docx"))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let rules = match &cli.rules {
        Some(path) => match FormatRules::from_path(path) {
            Ok(rules) => rules,
            Err(e) => {
                eprintln!("Error: {}: {e}", path.display());
                process::exit(2);
            }
        },
        None => FormatRules::default(),
    };
    let output = cli.output.unwrap_or_else(|| default_output(&cli.input));

    match docxide_review::review_docx(&cli.input, &output, &rules) {
        Ok(report) => {
            if cli.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("Error: {e}");
                        process::exit(1);
                    }
                }
            } else {
                print!("{report}");
                eprintln!(
                    "Formatted document written to {} ({} issue(s))",
                    output.display(),
                    report.total()
                );
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
