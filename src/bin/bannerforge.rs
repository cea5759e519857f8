use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bannerforge", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every row of a TSV/CSV file and zip the results.
    Batch(BatchArgs),
    /// Render one record against two explicit templates.
    Single(SingleArgs),
}

#[derive(Parser, Debug)]
struct SharedArgs {
    /// JSON config file; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// TTF/OTF font used for every text field.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Output directory.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Tabular input with a header row.
    #[arg(long)]
    input: PathBuf,

    #[command(flatten)]
    shared: SharedArgs,

    /// Template directory or URL prefix.
    #[arg(long)]
    templates: Option<String>,

    #[arg(long, value_enum)]
    delimiter: Option<DelimiterChoice>,

    /// Records per chunk.
    #[arg(long)]
    batch_size: Option<usize>,

    /// Worker threads (defaults to the batch size).
    #[arg(long)]
    threads: Option<usize>,

    /// Archive path (defaults to `<out>/banners.zip`).
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Public URL prefix used in the completion event.
    #[arg(long)]
    base_url: Option<String>,

    /// Group assigned to rows without one.
    #[arg(long)]
    fallback_group: Option<String>,

    /// Keep the input file instead of deleting it after reading.
    #[arg(long)]
    keep_input: bool,
}

#[derive(Parser, Debug)]
struct SingleArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    day: String,
    #[arg(long)]
    time: String,
    #[arg(long)]
    neighborhood: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    leaders: String,
    #[arg(long)]
    phone: String,

    /// Feed template path or URL.
    #[arg(long)]
    feed_template: String,

    /// Story template path or URL.
    #[arg(long)]
    story_template: String,

    #[command(flatten)]
    shared: SharedArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DelimiterChoice {
    Tab,
    Comma,
}

impl From<DelimiterChoice> for bannerforge::Delimiter {
    fn from(choice: DelimiterChoice) -> Self {
        match choice {
            DelimiterChoice::Tab => bannerforge::Delimiter::Tab,
            DelimiterChoice::Comma => bannerforge::Delimiter::Comma,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Batch(args) => cmd_batch(args),
        Command::Single(args) => cmd_single(args),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("BANNERFORGE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(shared: &SharedArgs) -> anyhow::Result<bannerforge::BannerConfig> {
    let mut config = match &shared.config {
        Some(path) => bannerforge::BannerConfig::from_path(path)?,
        None => bannerforge::BannerConfig::default(),
    };
    if let Some(font) = &shared.font {
        config.font = Some(font.clone());
    }
    if let Some(out) = &shared.out {
        config.output_root = out.clone();
    }
    Ok(config)
}

fn load_typeface(
    config: &bannerforge::BannerConfig,
) -> anyhow::Result<Arc<bannerforge::FontFace>> {
    let path = config
        .font
        .as_deref()
        .context("no font configured: pass --font or set \"font\" in the config")?;
    Ok(Arc::new(bannerforge::FontFace::from_path(path)?))
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let mut config = load_config(&args.shared)?;
    if let Some(root) = args.templates {
        config.template_root = root;
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter.into();
    }
    if let Some(n) = args.batch_size {
        config.batch.batch_size = n;
    }
    if args.threads.is_some() {
        config.batch.threads = args.threads;
    }
    if args.archive.is_some() {
        config.archive_path = args.archive;
    }
    if args.base_url.is_some() {
        config.public_base_url = args.base_url;
    }
    if args.fallback_group.is_some() {
        config.fallback_group = args.fallback_group;
    }
    if args.keep_input {
        config.consume_input = false;
    }

    let typeface = load_typeface(&config)?;
    let pipeline = bannerforge::BannerPipeline::new(config, typeface)?;

    let events = pipeline.subscribe();
    let printer = std::thread::spawn(move || {
        for event in events {
            println!("{}", event.to_json());
        }
    });

    let outcome = pipeline.generate_from_file(&args.input);
    // Dropping the pipeline closes the channel and lets the printer drain and exit.
    drop(pipeline);
    if printer.join().is_err() {
        tracing::warn!("progress printer panicked");
    }

    let outcome = outcome.with_context(|| format!("batch '{}'", args.input.display()))?;
    eprintln!(
        "generated {} record(s), skipped {}, wrote {}",
        outcome.report.generated,
        outcome.report.skipped,
        outcome.archive.path.display()
    );
    Ok(())
}

fn cmd_single(args: SingleArgs) -> anyhow::Result<()> {
    let config = load_config(&args.shared)?;
    let typeface = load_typeface(&config)?;
    let pipeline = bannerforge::BannerPipeline::new(config, typeface)?;

    let record = bannerforge::RecordFields {
        name: args.name,
        day: args.day,
        time: args.time,
        neighborhood: args.neighborhood,
        address: args.address,
        leaders: args.leaders,
        phone: args.phone,
        group: String::new(),
    };
    let artifacts = pipeline.generate_single(record, &args.feed_template, &args.story_template)?;

    for artifact in &artifacts {
        println!(
            "{}",
            serde_json::json!({
                "variant": artifact.variant,
                "path": artifact.path().display().to_string(),
                "bytes": artifact.bytes,
            })
        );
    }
    Ok(())
}
