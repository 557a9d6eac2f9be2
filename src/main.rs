//! qtionary - render a Wiktionary page into per-language blocks

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use qtionary::api::decode_parse_response;
use qtionary::{Glossary, UserSettings, decode_text, parse_glossary, transform_page};

#[derive(Parser)]
#[command(name = "qtionary")]
#[command(version, about = "Render a Wiktionary page into per-language blocks", long_about = None)]
#[command(after_help = "EXAMPLES:
    qtionary hablar.html                          Render with default settings
    qtionary hablar.json --glossary glossary.json Page and glossary as API responses
    qtionary apple.html --settings me.json -p     Pretty-print with saved settings")]
struct Cli {
    /// Page HTML, or an action=parse API response (JSON)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Glossary appendix (HTML or API response) or a saved term map (JSON)
    #[arg(short, long, value_name = "FILE")]
    glossary: Option<String>,

    /// User settings (JSON)
    #[arg(short, long, value_name = "FILE")]
    settings: Option<String>,

    /// Pretty-print the output JSON
    #[arg(short, long)]
    pretty: bool,

    /// Log pipeline progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .try_init();
}

fn run(cli: &Cli) -> qtionary::Result<()> {
    let html = read_page(&cli.input)?;

    let glossary = match &cli.glossary {
        Some(path) => read_glossary(path)?,
        None => Glossary::new(),
    };
    let settings = match &cli.settings {
        Some(path) => UserSettings::load(path)?,
        None => UserSettings::default(),
    };
    tracing::debug!(terms = glossary.len(), languages = ?settings.display_languages, "loaded inputs");

    let output = transform_page(&html, &glossary, &settings);
    println!("{}", output.to_json(cli.pretty)?);
    Ok(())
}

fn read_text(path: impl AsRef<Path>) -> qtionary::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(decode_text(&bytes, None).into_owned())
}

fn is_json(text: &str) -> bool {
    text.trim_start().starts_with('{')
}

/// Page HTML from a raw page or an API response.
fn read_page(path: &str) -> qtionary::Result<String> {
    let text = read_text(path)?;
    if is_json(&text) {
        let page = decode_parse_response(&text)?;
        tracing::debug!(title = %page.title, "decoded API response");
        return Ok(page.text);
    }
    Ok(text)
}

fn read_glossary(path: &str) -> qtionary::Result<Glossary> {
    let text = read_text(path)?;
    if !is_json(&text) {
        return Ok(parse_glossary(&text));
    }
    // A saved term map is a flat object of strings; anything else is an API response.
    match Glossary::from_json(&text) {
        Ok(glossary) => Ok(glossary),
        Err(_) => Ok(parse_glossary(&decode_parse_response(&text)?.text)),
    }
}
