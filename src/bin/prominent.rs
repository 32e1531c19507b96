use anyhow::{Context, Result};
use clap::Parser;
use prominent_colors::{
    CentroidAggregation, ColorSample, Cropping, Metric, ProminentConfig, SeedingStrategy,
    prominent_colors_bytes,
};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Print the most prominent colors of images.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Load options from a JSON config file (flags below override it)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of colors to extract
    #[arg(short = 'k', long)]
    k: Option<usize>,

    /// Pick initial centroids at random instead of k-means++
    #[arg(long)]
    random_seed: bool,

    /// Use the mean instead of the median for cluster colors
    #[arg(long)]
    mean: bool,

    /// Analyze the whole image instead of its center
    #[arg(long)]
    no_crop: bool,

    /// Measure distances in Lab instead of RGB
    #[arg(long)]
    lab: bool,

    /// Width images are scaled down to
    #[arg(short, long)]
    size: Option<u32>,

    /// Seed for reproducible results
    #[arg(long)]
    seed: Option<u64>,

    /// Write the masked image (background in magenta) into this directory
    #[arg(short = 'd', long)]
    debug_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    input: PathBuf,
    colors: Vec<ColorSample>,
}

fn build_config(args: &Args) -> Result<ProminentConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ProminentConfig::default(),
    };

    if let Some(k) = args.k {
        config = config.with_k(k);
    }
    if args.random_seed {
        config = config.with_seeding(SeedingStrategy::Random);
    }
    if args.mean {
        config = config.with_aggregation(CentroidAggregation::Mean);
    }
    if args.no_crop {
        config = config.with_cropping(Cropping::NoCrop);
    }
    if args.lab {
        config = config.with_metric(Metric::Perceptual);
    }
    if let Some(size) = args.size {
        config = config.with_resize_width(size);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if args.debug_dir.is_some() {
        config = config.with_debug_snapshot(true);
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    let config = build_config(&args)?;

    let mut reports = Vec::new();
    for input in &args.inputs {
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;
        let analysis = prominent_colors_bytes(&bytes, &config)
            .with_context(|| format!("analyzing {}", input.display()))?;

        if let (Some(dir), Some(debug)) = (&args.debug_dir, &analysis.debug_image) {
            fs::create_dir_all(dir)?;
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            let out_path = dir.join(format!("{stem}_mask.png"));
            debug
                .save(&out_path)
                .with_context(|| format!("writing {}", out_path.display()))?;
            eprintln!("Saved mask → {}", out_path.display());
        }

        if args.json {
            reports.push(Report {
                input: input.clone(),
                colors: analysis.colors,
            });
        } else {
            let colors: Vec<String> = analysis
                .colors
                .iter()
                .map(|c| format!("#{} {}", c.color, c.count))
                .collect();
            println!("{} [{}]: {}", input.display(), config, colors.join(", "));
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}
