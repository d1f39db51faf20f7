//! emx-extract CLI
//!
//! Pull the files out of a pasted transcript: list, print, write or bundle them.

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use emx_extract::{Bundle, Encoder, ExtractedUnit, Extractor, SizePolicy};
use std::fs;
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const NOTHING_FOUND: &str = "No extractable code blocks found. Please check the input format.";

#[derive(Parser, Debug)]
#[command(name = "emx-extract")]
#[command(author = "nzinfo <li.monan@gmail.com>")]
#[command(version)]
#[command(about = "Extract files embedded in pasted text")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// How file sizes are measured
    #[arg(long, value_enum, default_value_t = SizeArg::Utf8, global = true)]
    size_policy: SizeArg,

    /// Log more (repeat for more detail)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SizeArg {
    /// UTF-8 bytes
    Utf8,
    /// UTF-16 code units
    Utf16,
}

impl From<SizeArg> for SizePolicy {
    fn from(arg: SizeArg) -> Self {
        match arg {
            SizeArg::Utf8 => SizePolicy::Utf8Bytes,
            SizeArg::Utf16 => SizePolicy::Utf16Units,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List extracted files
    #[command(name = "t")]
    List {
        /// Text to parse (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Show extension, size, line count and first line
        #[arg(short = 'l', long)]
        long: bool,
    },

    /// Write extracted files to a directory
    #[command(name = "x")]
    Extract {
        /// Text to parse (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Directory to write to (default: current directory)
        #[arg(short = 'C', long, default_value = ".")]
        directory: PathBuf,
    },

    /// Print the content of one extracted file
    Cat {
        /// Name of the file to print
        name: String,

        /// Text to parse (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Print extracted files as JSON
    Json {
        /// Text to parse (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,
    },

    /// Pack extracted files into a txtar archive
    Bundle {
        /// Text to parse (default: stdin)
        #[arg(short = 'i', long)]
        input: Option<PathBuf>,

        /// Output archive file (default: stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let extractor = Extractor::new().with_size_policy(cli.size_policy.into());

    match cli.command {
        Commands::List { input, long } => {
            let units = extract_from(&extractor, input.as_deref())?;
            list_units(&units, long);
        }
        Commands::Extract { input, directory } => {
            let units = require_units(extract_from(&extractor, input.as_deref())?)?;
            write_units(&units, &directory)?;
        }
        Commands::Cat { name, input } => {
            let units = require_units(extract_from(&extractor, input.as_deref())?)?;
            let unit = units
                .iter()
                .find(|u| u.name == name)
                .ok_or_else(|| anyhow::anyhow!("No extracted file named '{}'", name))?;
            println!("{}", unit.content);
        }
        Commands::Json { input } => {
            let units = extract_from(&extractor, input.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&units)?);
        }
        Commands::Bundle { input, output } => {
            let units = require_units(extract_from(&extractor, input.as_deref())?)?;
            bundle_units(&units, output.as_deref())?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("emx_extract={}", level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn read_input(input: Option<&Path>) -> Result<String> {
    if let Some(input_path) = input {
        fs::read_to_string(input_path).with_context(|| format!("Failed to read: {}", input_path.display()))
    } else {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer).context("Failed to read stdin")?;
        Ok(buffer)
    }
}

fn extract_from(extractor: &Extractor, input: Option<&Path>) -> Result<Vec<ExtractedUnit>> {
    let text = read_input(input)?;
    let units = extractor.extract(&text);

    if units.is_empty() {
        eprintln!("{}", NOTHING_FOUND);
    } else {
        info!(count = units.len(), "extracted files");
    }

    Ok(units)
}

fn require_units(units: Vec<ExtractedUnit>) -> Result<Vec<ExtractedUnit>> {
    if units.is_empty() {
        bail!("no files extracted");
    }
    Ok(units)
}

fn list_units(units: &[ExtractedUnit], long: bool) {
    for unit in units {
        if long {
            println!(
                "{}  {}  {} KB  {} lines  {}  {}",
                unit.name,
                unit.extension.to_uppercase(),
                unit.size_kb(),
                unit.lines,
                unit.language(),
                unit.first_line_preview()
            );
        } else {
            println!("{}", unit.name);
        }
    }
}

/// Relative path for `name` if it names a file inside the output directory.
///
/// Rejects absolute paths, `..`, and names like `.` with no file component.
fn contained_path(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    let mut has_file = false;

    for component in path.components() {
        match component {
            Component::Normal(_) => has_file = true,
            Component::CurDir => {}
            _ => return None,
        }
    }

    has_file.then(|| path.to_path_buf())
}

fn write_units(units: &[ExtractedUnit], directory: &Path) -> Result<()> {
    for unit in units {
        let Some(relative) = contained_path(&unit.name) else {
            warn!(name = %unit.name, "skipping name that is not a file inside the output directory");
            continue;
        };

        let output_path = directory.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("Failed to create: {}", parent.display()))?;
        }

        fs::write(&output_path, &unit.content)
            .with_context(|| format!("Failed to write: {}", output_path.display()))?;

        info!(name = %unit.name, bytes = unit.content.len(), "extracted");
    }

    Ok(())
}

fn bundle_units(units: &[ExtractedUnit], output: Option<&Path>) -> Result<()> {
    let bundle = Bundle::from_units(units);
    let encoder = Encoder::new();

    if let Some(output_path) = output {
        encoder.encode_to_file(&bundle, output_path)?;
        info!(path = %output_path.display(), files = bundle.len(), "created bundle");
    } else {
        encoder.encode_to_writer(&bundle, io::stdout().lock())?;
    }

    Ok(())
}
