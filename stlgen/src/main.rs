use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use stldata::PropertyKind;
use stlgen_core::{Generator, GeneratorConfig};

mod loader;

#[derive(Parser, Debug)]
#[command(author, version, about = "Random empire generator", long_about = None)]
struct Args {
    /// Game script files, read in order (later definitions win)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Generator configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Number of empires to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Fresh search attempts per empire
    #[arg(long)]
    attempts: Option<u32>,

    /// Identifiers that may not be chosen
    #[arg(long = "disable", value_name = "ID")]
    disabled: Vec<String>,

    /// Property cache file, reused while the script files are unchanged
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Print the extracted properties as JSON and exit
    #[arg(long)]
    dump_json: bool,

    /// Print the extracted identifiers by kind and exit
    #[arg(long)]
    list: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_config(args: &Args) -> Result<GeneratorConfig> {
    let mut config: GeneratorConfig = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => GeneratorConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(attempts) = args.attempts {
        config.max_attempts = attempts;
    }
    Ok(config)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let config = load_config(&args)?;
    let sources = loader::read_sources(&args.files)?;
    let mut properties = loader::load(&sources, &config.quotas, args.cache.as_deref())?;
    log::info!("Loaded {} properties from {} files", properties.len(), args.files.len());

    for id in &args.disabled {
        if !properties.set_allowed(id, false) {
            log::warn!("--disable {}: no such property", id);
        }
    }

    if args.dump_json {
        println!("{}", properties.to_json()?);
        return Ok(());
    }

    if args.list {
        for kind in PropertyKind::ALL {
            println!("{}:", kind.script_key());
            for property in properties.of_kind(kind) {
                let marker = if property.allowed { "" } else { " (disabled)" };
                println!("  {}{}", property.identifier, marker);
            }
        }
        return Ok(());
    }

    let mut generator = Generator::new(&properties, config)?;
    for index in 1..=args.count {
        let bundle = match generator.generate() {
            Ok(bundle) => bundle,
            Err(e) => bail!("Empire {} of {}: {}", index, args.count, e),
        };
        if args.count > 1 {
            println!("# Empire {}", index);
        }
        print!("{}", bundle);
    }

    Ok(())
}
