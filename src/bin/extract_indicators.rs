//! Extract lab indicators from a span dump or OCR transcript
//!
//! Reads the layout reader's JSON span dump and/or an OCR transcript and
//! prints the extraction result as JSON.
//!
//! Usage:
//!   cargo run --release --bin extract_indicators -- --spans pages.json
//!   cargo run --release --bin extract_indicators -- --spans pages.json --ocr pages.txt
//!   cargo run --release --bin extract_indicators -- --text scan.txt
//!   cargo run --release --bin extract_indicators -- --text scan.txt --config extraction.json --max-pages 3
//!
//! OCR transcripts hold one page per form-feed separated section.
//! Set `RUST_LOG=lab_oxide=debug` to see per-page decisions.

use lab_oxide::config::ExtractionConfig;
use lab_oxide::layout::spans::parse_pages_json;
use lab_oxide::pipeline::{DocumentKind, IndicatorExtractor};
use lab_oxide::Result;
use std::fs;
use std::path::PathBuf;
use std::process;

const PAGE_SEPARATOR: char = '\u{000C}';

struct CliConfig {
    spans: Option<PathBuf>,
    ocr: Option<PathBuf>,
    text: Option<PathBuf>,
    config: Option<PathBuf>,
    max_pages: Option<usize>,
}

impl CliConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut cli = Self {
            spans: None,
            ocr: None,
            text: None,
            config: None,
            max_pages: None,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--spans" => {
                    i += 1;
                    if i < args.len() {
                        cli.spans = Some(PathBuf::from(&args[i]));
                    }
                },
                "--ocr" => {
                    i += 1;
                    if i < args.len() {
                        cli.ocr = Some(PathBuf::from(&args[i]));
                    }
                },
                "--text" => {
                    i += 1;
                    if i < args.len() {
                        cli.text = Some(PathBuf::from(&args[i]));
                    }
                },
                "--config" => {
                    i += 1;
                    if i < args.len() {
                        cli.config = Some(PathBuf::from(&args[i]));
                    }
                },
                "--max-pages" => {
                    i += 1;
                    if i < args.len() {
                        match args[i].parse() {
                            Ok(n) => cli.max_pages = Some(n),
                            Err(_) => eprintln!("Ignoring invalid --max-pages value: {}", args[i]),
                        }
                    }
                },
                "--help" | "-h" => {
                    print_usage();
                    process::exit(0);
                },
                other => {
                    eprintln!("Unknown argument: {}", other);
                },
            }
            i += 1;
        }

        cli
    }
}

fn print_usage() {
    eprintln!("Usage: extract_indicators [--spans FILE] [--ocr FILE] [--text FILE]");
    eprintln!("                          [--config FILE] [--max-pages N]");
}

fn read_pages(path: &PathBuf) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path)?;
    Ok(raw.split(PAGE_SEPARATOR).map(str::to_string).collect())
}

fn run(cli: &CliConfig) -> Result<String> {
    let mut config = match &cli.config {
        Some(path) => ExtractionConfig::from_json_str(&fs::read_to_string(path)?)?,
        None => ExtractionConfig::default(),
    };
    if let Some(max_pages) = cli.max_pages {
        config = config.with_max_pages(max_pages);
        config.validate()?;
    }
    let extractor = IndicatorExtractor::with_config(config);

    let result = match (&cli.spans, &cli.text) {
        (Some(spans), _) => {
            let pages = parse_pages_json(&fs::read_to_string(spans)?)?;
            let ocr = cli.ocr.as_ref().map(read_pages).transpose()?;
            log::info!("{}: {} page(s) of spans", spans.display(), pages.len());
            extractor.extract(DocumentKind::Pdf, &pages, ocr.as_deref())
        },
        (None, Some(text)) => {
            let pages = read_pages(text)?;
            extractor.extract(DocumentKind::Image, &[], Some(&pages[..]))
        },
        (None, None) => {
            let pages = cli.ocr.as_ref().map(read_pages).transpose()?;
            extractor.extract(DocumentKind::Pdf, &[], pages.as_deref())
        },
    };

    log::info!(
        "{} indicator(s), {} outside reference range",
        result.indicators.len(),
        result.flagged().count()
    );

    Ok(serde_json::to_string_pretty(&result)?)
}

fn main() {
    env_logger::init();

    let cli = CliConfig::from_args();
    if cli.spans.is_none() && cli.text.is_none() && cli.ocr.is_none() {
        print_usage();
        process::exit(2);
    }

    match run(&cli) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        },
    }
}
