use clap::Parser;
use colorseg::io::{labels_to_gray, load_rgb_image, save_gray_image};
use colorseg::{
    extract_lines, gaussian_blur_rgb, Convergence, LineExtractConfig, Rgb, SegmentConfig,
    Segmenter,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "k-means color segmentation and line extraction (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Log pipeline stages and k-means iterations.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct BlurConfigJson {
    kernel_length: usize,
    sigma: f32,
}

impl Default for BlurConfigJson {
    fn default() -> Self {
        Self {
            kernel_length: 15,
            sigma: 0.0,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FixedCentroidJson {
    label: usize,
    color: Rgb,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SegmentConfigJson {
    k: usize,
    fixed_centroids: Vec<FixedCentroidJson>,
    convergence_threshold: u32,
    max_iterations: Option<usize>,
    seed: Option<u64>,
    parallel: bool,
}

impl Default for SegmentConfigJson {
    fn default() -> Self {
        let cfg = SegmentConfig::default();
        Self {
            k: cfg.k,
            fixed_centroids: Vec::new(),
            convergence_threshold: cfg.convergence_threshold,
            max_iterations: cfg.max_iterations,
            seed: cfg.seed,
            parallel: cfg.parallel,
        }
    }
}

impl From<SegmentConfigJson> for SegmentConfig {
    fn from(value: SegmentConfigJson) -> Self {
        let fixed_centroids: BTreeMap<usize, Rgb> = value
            .fixed_centroids
            .into_iter()
            .map(|fixed| (fixed.label, fixed.color))
            .collect();
        Self {
            k: value.k,
            fixed_centroids,
            convergence_threshold: value.convergence_threshold,
            max_iterations: value.max_iterations,
            seed: value.seed,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct LinesConfigJson {
    line_label: u8,
    opening_size: usize,
    closing_size: usize,
}

impl Default for LinesConfigJson {
    fn default() -> Self {
        let cfg = LineExtractConfig::default();
        Self {
            line_label: 0,
            opening_size: cfg.opening_size,
            closing_size: cfg.closing_size,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    labels_path: Option<String>,
    mask_path: Option<String>,
    report_path: Option<String>,
    label_scale: u8,
    blur: BlurConfigJson,
    segment: SegmentConfigJson,
    lines: LinesConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            labels_path: None,
            mask_path: None,
            report_path: None,
            label_scale: 50,
            blur: BlurConfigJson::default(),
            segment: SegmentConfigJson::default(),
            lines: LinesConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CentroidRecord {
    label: usize,
    color: Rgb,
    fixed: bool,
    pixels: usize,
}

#[derive(Debug, Serialize)]
struct IterationRecord {
    iteration: usize,
    gap: u32,
    reinitialized: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct Report {
    width: usize,
    height: usize,
    converged: bool,
    final_gap: Option<u32>,
    iterations: Vec<IterationRecord>,
    centroids: Vec<CentroidRecord>,
    line_pixels: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive("colorseg=info".parse()?)
                    .add_directive("colorseg_cli=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }

    let image = load_rgb_image(&config.image_path)?;
    info!(
        width = image.width(),
        height = image.height(),
        "loaded {}",
        config.image_path
    );

    let blurred = gaussian_blur_rgb(image.view(), config.blur.kernel_length, config.blur.sigma)?;
    info!(kernel_length = config.blur.kernel_length, "blurred");

    let segmenter = Segmenter::new(config.segment.into())?;
    let k = segmenter.config().k;
    let segmentation = segmenter.segment(blurred.view())?;
    for stats in &segmentation.iterations {
        info!("iteration {} finished, gap {}", stats.iteration, stats.gap);
    }
    if let Convergence::DidNotConverge { gap } = segmentation.convergence {
        tracing::warn!(
            iterations = segmentation.iteration_count(),
            gap,
            "k-means stopped at the iteration cap"
        );
    }

    if let Some(path) = &config.labels_path {
        let gray = labels_to_gray(&segmentation.labels, config.label_scale)?;
        save_gray_image(path, gray.view())?;
    }

    let extraction = extract_lines(
        &segmentation.labels,
        config.lines.line_label,
        LineExtractConfig {
            opening_size: config.lines.opening_size,
            closing_size: config.lines.closing_size,
        },
    )?;
    if let Some(path) = &config.mask_path {
        save_gray_image(path, extraction.lines.view())?;
    }

    let counts = segmentation.labels.counts(k);
    let report = Report {
        width: segmentation.labels.width(),
        height: segmentation.labels.height(),
        converged: segmentation.converged(),
        final_gap: segmentation.final_gap(),
        iterations: segmentation
            .iterations
            .iter()
            .map(|stats| IterationRecord {
                iteration: stats.iteration,
                gap: stats.gap,
                reinitialized: stats.reinitialized.clone(),
            })
            .collect(),
        centroids: segmentation
            .centroids
            .iter()
            .enumerate()
            .map(|(label, centroid)| CentroidRecord {
                label,
                color: centroid.color,
                fixed: centroid.fixed,
                pixels: counts[label],
            })
            .collect(),
        line_pixels: extraction.lines.data().iter().filter(|&&v| v != 0).count(),
    };
    let json = serde_json::to_string_pretty(&report)?;

    match config.report_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Config, EXAMPLE_JSON};
    use colorseg::{SegmentConfig, Segmenter};

    #[test]
    fn cluster_count_alone_is_a_valid_config() {
        let config: Config =
            serde_json::from_str(r#"{"image_path":"p.png","segment":{"k":2}}"#).unwrap();
        let cfg: SegmentConfig = config.segment.into();
        assert_eq!(cfg.k, 2);
        assert!(cfg.fixed_centroids.is_empty());
        assert!(Segmenter::new(cfg).is_ok());
    }

    #[test]
    fn example_config_pins_table_colors() {
        let config: Config = serde_json::from_str(EXAMPLE_JSON).unwrap();
        let cfg: SegmentConfig = config.segment.into();
        assert_eq!(cfg.fixed_centroids.get(&0), Some(&[192, 188, 158]));
        assert_eq!(cfg.fixed_centroids.len(), 3);
        assert!(Segmenter::new(cfg).is_ok());
        assert_eq!(config.lines.closing_size, 101);
    }
}
