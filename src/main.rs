use clap::Parser;
use mba_brochure::{BrochureConfig, create_brochure, inspect_pdf_path};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mba-brochure")]
#[command(version)]
#[command(about = "Generate the MBA in Digital Transformation & AI Leadership brochure PDF", long_about = None)]
struct Cli {
    /// Output PDF file
    #[arg(short, long, value_name = "FILE", default_value = mba_brochure::DEFAULT_OUTPUT_FILENAME)]
    output: PathBuf,

    /// Logo image; skipped when the file does not exist
    #[arg(long, value_name = "FILE", default_value = mba_brochure::DEFAULT_LOGO_PATH)]
    logo: PathBuf,

    /// Write JSONL layout events to this file
    #[arg(long, value_name = "FILE")]
    debug_log: Option<PathBuf>,

    /// Re-read the written PDF and print a page summary
    #[arg(long)]
    verify: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let config = BrochureConfig {
        output_path: cli.output,
        logo_path: cli.logo,
        debug_log: cli.debug_log,
        ..BrochureConfig::default()
    };

    let path = match create_brochure(&config) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    println!("✅ MBA brochure created successfully: {}", path.display());

    if cli.verify {
        match inspect_pdf_path(&path) {
            Ok(report) => {
                println!(
                    "PDF {}: {} page(s), {} image(s), {} bytes",
                    report.pdf_version,
                    report.page_count,
                    report.image_draws(),
                    report.file_size_bytes
                );
            }
            Err(err) => {
                eprintln!("error: verification failed: {err}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
