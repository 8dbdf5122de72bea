use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{error, info};

use docgen::plan::TestPlan;
use docgen::template::{ManualContent, Template};
use docgen::{Config, ScanOptions};

#[derive(Parser)]
#[command(name = "docgen")]
#[command(about = "Generate Word manuals, test plans and HTML manuals")]
struct Cli {
    /// Print debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert Markdown files to DOCX, PDF or Typst
    Convert(ConvertArgs),

    /// Render a TOML test plan to DOCX
    Plan {
        /// Test plan file
        plan: PathBuf,

        /// Output DOCX file (defaults to the plan name with .docx extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file
        #[arg(long, default_value = "docgen.toml")]
        config: PathBuf,
    },

    /// Fill an HTML manual template from a TOML slot file
    Manual {
        /// HTML template with {{slot}} placeholders
        template: PathBuf,

        /// TOML file with a [slots] table
        content: PathBuf,

        /// Output HTML file (defaults to the content name with .html extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ConvertArgs {
    /// Input Markdown files
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file, for a single input (defaults to the input name with the
    /// format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Docx)]
    format: Format,

    /// Directory images are resolved against (defaults to each input's directory)
    #[arg(long)]
    images: Option<PathBuf>,

    /// Config file
    #[arg(long, default_value = "docgen.toml")]
    config: PathBuf,

    /// Cover page title
    #[arg(long)]
    title: Option<String>,

    /// Cover page subtitle
    #[arg(long)]
    subtitle: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Docx,
    Pdf,
    Typst,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Pdf => "pdf",
            Self::Typst => "typ",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Command::Convert(args) => convert(args),
        Command::Plan {
            plan,
            output,
            config,
        } => {
            let config = load_config(&config)?;
            let test_plan = TestPlan::load(&plan)?;
            let output = output.unwrap_or_else(|| plan.with_extension("docx"));
            let bytes = docgen::plan_to_docx(&test_plan, &config)?;
            write_output(&output, bytes)
        }
        Command::Manual {
            template,
            content,
            output,
        } => {
            let html = Template::load(&template)?.render(&ManualContent::load(&content)?)?;
            let output = output.unwrap_or_else(|| content.with_extension("html"));
            write_output(&output, html.into_bytes())
        }
    }
}

fn load_config(path: &Path) -> Result<Config> {
    Config::load(path).with_context(|| format!("Error loading config {}", path.display()))
}

fn write_output(output: &Path, bytes: Vec<u8>) -> Result<()> {
    fs::write(output, bytes).with_context(|| format!("Error writing {}", output.display()))?;
    println!("Created {}", output.display());
    Ok(())
}

/// Convert each input on its own; a failing input does not stop the rest.
fn convert(args: ConvertArgs) -> Result<()> {
    if args.output.is_some() && args.inputs.len() > 1 {
        bail!("--output can only be used with a single input");
    }

    let mut config = load_config(&args.config)?;
    if let Some(title) = &args.title {
        config.cover.title = title.clone();
    }
    if let Some(subtitle) = &args.subtitle {
        config.cover.subtitle = subtitle.clone();
    }

    let mut failed = 0;
    for input in &args.inputs {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| input.with_extension(args.format.extension()));

        if let Err(e) = convert_one(input, &output, &args, &config) {
            error!("{}: {e:#}", input.display());
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} inputs failed", args.inputs.len());
    }
    Ok(())
}

fn convert_one(input: &Path, output: &Path, args: &ConvertArgs, config: &Config) -> Result<()> {
    let markdown = fs::read_to_string(input)
        .with_context(|| format!("Error reading {}", input.display()))?;

    let image_base = args.images.clone().unwrap_or_else(|| match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    });
    info!("reading {} (images from {})", input.display(), image_base.display());
    let options = ScanOptions::with_image_base(image_base);

    let bytes = match args.format {
        Format::Docx => docgen::markdown_to_docx(&markdown, &options, config)?,
        Format::Pdf => docgen::markdown_to_pdf(&markdown, &options, config)?,
        Format::Typst => docgen::markdown_to_typst(&markdown, &options, config).into_bytes(),
    };

    write_output(output, bytes)
}
