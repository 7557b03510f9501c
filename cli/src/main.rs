//! structpdf CLI - section-aware PDF to JSON conversion

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::builder::RangedU64ValueParser;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use structpdf::render::{primitives_to_json, to_json};
use structpdf::{DocumentPrimitives, JsonFormat, LayoutConfig, PdfParser, StructPdf};

#[derive(Parser)]
#[command(name = "structpdf")]
#[command(version)]
#[command(about = "Convert PDF documents into section-aware JSON", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output JSON file (default: <FILE stem>.json)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    options: ConvertArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF to structured JSON
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (default: <FILE stem>.json)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: ConvertArgs,
    },

    /// Run the layout engine on a primitives dump
    Assemble {
        /// Primitives JSON, as written by `dump` or an external extractor
        #[arg(value_name = "PRIMITIVES")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        options: ConvertArgs,
    },

    /// Write the extracted primitives of a PDF as JSON
    Dump {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Abort on the first extractor failure
        #[arg(long)]
        strict: bool,
    },

    /// Show page and content counts
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// Flags shared by every command that runs the layout engine.
#[derive(Args, Clone, Default)]
struct ConvertArgs {
    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    /// Analyze pages on the current thread only
    #[arg(long)]
    sequential: bool,

    /// Worker threads for page analysis
    #[arg(long, value_name = "N", env = "STRUCTPDF_WORKERS",
          value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    workers: Option<usize>,

    /// Layout config as JSON (unset fields keep their defaults)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Abort on the first extractor failure instead of skipping it
    #[arg(long)]
    strict: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl ConvertArgs {
    fn format(&self) -> JsonFormat {
        if self.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        }
    }

    fn builder(&self) -> Result<StructPdf, Box<dyn std::error::Error>> {
        let mut builder = StructPdf::new();
        if !self.strict {
            builder = builder.lenient();
        }
        if self.sequential {
            builder = builder.sequential();
        }
        if let Some(workers) = self.workers {
            builder = builder.with_worker_threads(workers);
        }
        if let Some(path) = &self.config {
            builder = builder.with_layout(load_config(path)?);
        }
        Ok(builder)
    }
}

fn main() {
    let cli = Cli::parse();

    let debug = match &cli.command {
        Some(Commands::Convert { options, .. }) | Some(Commands::Assemble { options, .. }) => {
            options.debug
        }
        _ => cli.options.debug,
    };
    init_logging(debug);

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            options,
        }) => cmd_convert(&input, output.as_deref(), &options),
        Some(Commands::Assemble {
            input,
            output,
            options,
        }) => cmd_assemble(&input, output.as_deref(), &options),
        Some(Commands::Dump {
            input,
            output,
            compact,
            strict,
        }) => cmd_dump(&input, output.as_deref(), compact, strict),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), &cli.options)
            } else {
                println!("{}", "Usage: structpdf <FILE> [OUTPUT]".yellow());
                println!("       structpdf --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(path: &Path) -> Result<LayoutConfig, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)?;
    Ok(LayoutConfig::from_json(&json)?)
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("json")
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    pb
}

fn write_output(output: Option<&Path>, json: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output(input));
    let builder = options.builder()?;

    let pb = spinner("Converting PDF...");
    let conversion = builder.convert_file(input);
    pb.finish_and_clear();
    let doc = conversion?.into_document();

    let json = to_json(&doc, options.format())?;
    fs::write(&output, &json)?;

    let (headings, paragraphs, tables, charts) = doc.item_counts();
    println!(
        "{} {} pages, {} headings, {} paragraphs, {} tables, {} charts",
        "Converted".green().bold(),
        doc.page_count(),
        headings,
        paragraphs,
        tables,
        charts
    );
    println!("{} {}", "Saved to".green(), output.display());

    Ok(())
}

fn cmd_assemble(
    input: &Path,
    output: Option<&Path>,
    options: &ConvertArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let primitives = DocumentPrimitives::from_json(&fs::read_to_string(input)?)?;
    let doc = options
        .builder()?
        .convert_primitives(&primitives)?
        .into_document();

    write_output(output, &to_json(&doc, options.format())?)
}

fn cmd_dump(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    strict: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let builder = if strict {
        StructPdf::new()
    } else {
        StructPdf::new().lenient()
    };

    let pb = spinner("Extracting primitives...");
    let primitives = builder.extract_file(input);
    pb.finish_and_clear();

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    write_output(output, &primitives_to_json(&primitives?, format)?)
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let parser = PdfParser::open(input)?;
    let version = parser.version();
    let encrypted = parser.is_encrypted();

    // Lenient, so counts still show when one page fails
    let doc = StructPdf::new().lenient().convert_file(input)?.into_document();
    let (headings, paragraphs, tables, charts) = doc.item_counts();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), version);
    println!("{}: {}", "Pages".bold(), parser.page_count());
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if encrypted { "Yes" } else { "No" }
    );

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Headings".bold(), headings);
    println!("{}: {}", "Paragraphs".bold(), paragraphs);
    println!("{}: {}", "Tables".bold(), tables);
    println!("{}: {}", "Charts".bold(), charts);

    let empty = doc.pages.iter().filter(|p| p.is_empty()).count();
    if empty > 0 {
        println!("{}: {}", "Empty pages".bold(), empty);
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "structpdf".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Section-aware PDF to JSON conversion");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_replaces_extension() {
        assert_eq!(
            default_output(Path::new("docs/report.pdf")),
            PathBuf::from("docs/report.json")
        );
        assert_eq!(default_output(Path::new("scan")), PathBuf::from("scan.json"));
    }

    #[test]
    fn test_load_config_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        fs::write(&path, r#"{"max_heading_level": 2}"#).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.max_heading_level, 2);
        assert_eq!(config.heading_size_ratio, LayoutConfig::default().heading_size_ratio);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        fs::write(&path, r#"{"max_heading_level": 0}"#).unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_assemble_writes_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("primitives.json");
        let output = dir.path().join("out.json");
        fs::write(&input, r#"{"pages": [{"page_number": 1}]}"#).unwrap();

        let options = ConvertArgs {
            compact: true,
            ..Default::default()
        };
        cmd_assemble(&input, Some(&output), &options).unwrap();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            r#"{"pages":[{"page_number":1,"content":[]}]}"#
        );
    }

    #[test]
    fn test_cli_parses_convert_flags() {
        let cli = Cli::try_parse_from([
            "structpdf", "convert", "in.pdf", "-o", "out.json", "--compact", "--workers", "2",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Convert { options, output, .. }) => {
                assert!(options.compact);
                assert_eq!(options.workers, Some(2));
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_cli_rejects_zero_workers() {
        assert!(Cli::try_parse_from(["structpdf", "convert", "in.pdf", "--workers", "0"]).is_err());
    }
}
