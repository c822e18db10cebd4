//! Extract command - read one transcript and print the extracted transaction.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use struk_core::{format_idr, ExtractionResult, ReceiptExtractor, TextRecognizer, TranscriptRecognizer};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// OCR transcript, one line per text line (`-` reads stdin)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show extraction confidence
    #[arg(long)]
    show_confidence: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let transcript = read_input(&args.input)?;
    info!("Processing transcript: {}", args.input.display());

    let extractor = ReceiptExtractor::new(&config.extraction);
    let result = extract_transcript(&extractor, &transcript)?;

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_confidence {
        println!();
        println!(
            "{} Extraction confidence: {:.1}%",
            style("ℹ").blue(),
            result.confidence * 100.0
        );
        if result.requires_confirmation {
            println!("{} Needs confirmation", style("!").yellow());
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Run a raw transcript through recognition and extraction.
pub fn extract_transcript(extractor: &ReceiptExtractor, transcript: &[u8]) -> anyhow::Result<ExtractionResult> {
    let lines = TranscriptRecognizer.recognize(transcript)?;
    Ok(extractor.extract(&lines))
}

fn read_input(input: &Path) -> anyhow::Result<Vec<u8>> {
    if input == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        return Ok(buf);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    Ok(fs::read(input)?)
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "document_type",
        "merchant",
        "date",
        "amount",
        "amount_source",
        "category",
        "confidence",
        "requires_confirmation",
    ])?;

    wtr.write_record([
        format!("{:?}", result.document_type),
        result.merchant.value.clone().unwrap_or_default(),
        result.date.value.map(|d| d.to_string()).unwrap_or_default(),
        result.amount.value.map(|a| a.to_string()).unwrap_or_default(),
        format!("{:?}", result.amount.provenance),
        result.category.value.clone().unwrap_or_default(),
        format!("{:.2}", result.confidence),
        result.requires_confirmation.to_string(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Type: {:?}\n", result.document_type));
    output.push_str(&format!(
        "Merchant: {}\n",
        result.merchant.value.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Date: {}\n",
        result.date.value.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
    ));
    output.push_str(&format!(
        "Total: {} ({:?})\n",
        result.amount.value.map(format_idr).unwrap_or_else(|| "-".to_string()),
        result.amount.provenance
    ));
    output.push_str(&format!(
        "Category: {}\n",
        result.category.value.as_deref().unwrap_or("-")
    ));
    output.push('\n');
    output.push_str(&result.reply_text);
    output.push('\n');

    output
}
