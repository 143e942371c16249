use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "welcard", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a welcome card as a PNG.
    Render(RenderArgs),
    /// Check an options file without rendering.
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Card options JSON.
    #[arg(long)]
    options: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Regular font file; system sans-serif fonts are used when omitted.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Bold font file for the welcome line (requires `--font`).
    #[arg(long, requires = "font")]
    bold_font: Option<PathBuf>,

    /// Per-image fetch timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Card options JSON.
    #[arg(long)]
    options: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Validate(args) => cmd_validate(args),
    }
}

fn read_options_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let f = File::open(path).with_context(|| format!("open options '{}'", path.display()))?;
    let r = BufReader::new(f);
    let value: serde_json::Value =
        serde_json::from_reader(r).with_context(|| "parse options JSON")?;
    Ok(value)
}

fn load_fonts(args: &RenderArgs) -> anyhow::Result<welcard::CardFonts> {
    let fonts = match &args.font {
        Some(regular) => welcard::CardFonts::from_files(regular, args.bold_font.as_deref())?,
        None => welcard::CardFonts::from_system().with_context(|| "discover system fonts")?,
    };
    Ok(fonts)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let options = read_options_json(&args.options)?;
    welcard::validate_options(&options)?;

    let fonts = load_fonts(&args)?;
    let images = welcard::HttpImageSource::new(welcard::HttpImageSourceOpts {
        timeout: Some(Duration::from_secs(args.timeout_secs)),
        ..welcard::HttpImageSourceOpts::default()
    })?;

    let card = welcard::WelcomeCard::new(images, fonts);
    let png = card.render(&options)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    tracing::info!(bytes = png.len(), out = %args.out.display(), "wrote card");
    Ok(())
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let options = read_options_json(&args.options)?;
    welcard::validate_options(&options)?;
    println!("ok");
    Ok(())
}
