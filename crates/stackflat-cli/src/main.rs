//! stackflat CLI: flatten a surface embedded in a directory of image slices.

use clap::{Args, Parser, Subcommand, ValueEnum};
use image::{DynamicImage, GrayImage};
use stackflat::{FlattenConfig, Flattener, Gray16Image, InterpolationMethod, SampleDepth, Stack};
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

const SLICE_EXTENSIONS: &[&str] = &["png", "tif", "tiff", "jpg", "jpeg"];

#[derive(Parser)]
#[command(name = "stackflat")]
#[command(about = "Flatten a curved bright surface in a 3-D image stack onto its mid-depth slice")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a stack and write the resampled slices.
    Flatten(CliFlattenArgs),

    /// Estimate and smooth the surface height map only.
    Height(CliHeightArgs),

    /// Print the default configuration as JSON.
    PrintConfig,
}

#[derive(Debug, Clone, Args)]
struct CliFlattenArgs {
    /// Directory of slice images, ordered by file name.
    #[arg(long)]
    slices: PathBuf,

    /// Output directory for the flattened slices.
    #[arg(long)]
    out: PathBuf,

    /// Optional JSON config; command-line flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Interpolation between integer-shifted slices.
    #[arg(long, value_enum)]
    method: Option<MethodArg>,

    /// Path to write the smoothed height map (JSON).
    #[arg(long)]
    height_map: Option<PathBuf>,

    /// Path to write the run summary (JSON).
    #[arg(long)]
    summary: Option<PathBuf>,

    #[command(flatten)]
    height: CliHeightParams,
}

#[derive(Debug, Clone, Args)]
struct CliHeightArgs {
    /// Directory of slice images, ordered by file name.
    #[arg(long)]
    slices: PathBuf,

    /// Path to write the height map (JSON).
    #[arg(long)]
    out: PathBuf,

    /// Optional JSON config; command-line flags override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    height: CliHeightParams,
}

#[derive(Debug, Clone, Args)]
struct CliHeightParams {
    /// Lower intensity threshold (default: 0).
    #[arg(long)]
    min: Option<f64>,

    /// Upper intensity threshold (default: full scale of the input depth).
    #[arg(long)]
    max: Option<f64>,

    /// Gaussian sigma for height-map smoothing, in pixels (0 disables).
    #[arg(long)]
    sigma: Option<f64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    Linear,
    MonotoneCubic,
}

impl MethodArg {
    fn to_core(self) -> InterpolationMethod {
        match self {
            Self::Linear => InterpolationMethod::Linear,
            Self::MonotoneCubic => InterpolationMethod::MonotoneCubic,
        }
    }
}

impl CliHeightParams {
    fn apply(&self, config: &mut FlattenConfig) {
        if let Some(min) = self.min {
            config.threshold.min = min;
        }
        if let Some(max) = self.max {
            config.threshold.max = max;
        }
        if let Some(sigma) = self.sigma {
            config.smoothing_sigma = sigma;
        }
    }
}

/// Config file (or depth-aware defaults) with command-line overrides on top,
/// validated once the overrides are applied.
fn build_config(
    config_path: Option<&Path>,
    params: &CliHeightParams,
    depth: SampleDepth,
) -> CliResult<FlattenConfig> {
    let mut config = match config_path {
        Some(path) => FlattenConfig::read_json_file(path).map_err(|e| -> CliError {
            format!("Failed to load config {}: {}", path.display(), e).into()
        })?,
        None => FlattenConfig::for_depth(depth),
    };
    params.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Flatten(args) => run_flatten(&args),
        Commands::Height(args) => run_height(&args),
        Commands::PrintConfig => run_print_config(),
    }
}

// ── slice I/O ──────────────────────────────────────────────────────────

fn list_slice_files(dir: &Path) -> CliResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| -> CliError {
        format!("Failed to read slice directory {}: {}", dir.display(), e).into()
    })? {
        let path = entry?.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| SLICE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if path.is_file() && is_image {
            files.push(path);
        }
    }
    files.sort();
    if files.is_empty() {
        return Err(format!("No slice images found in {}", dir.display()).into());
    }
    Ok(files)
}

fn is_sixteen_bit(img: &DynamicImage) -> bool {
    matches!(
        img,
        DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_)
            | DynamicImage::ImageRgb16(_)
            | DynamicImage::ImageRgba16(_)
    )
}

/// Load every slice of `dir`. The first slice decides the sample depth.
fn load_stack(dir: &Path) -> CliResult<Stack> {
    let files = list_slice_files(dir)?;
    tracing::info!("Loading {} slices from {}", files.len(), dir.display());

    let mut images = Vec::with_capacity(files.len());
    for path in &files {
        let img = image::open(path).map_err(|e| -> CliError {
            format!("Failed to open slice {}: {}", path.display(), e).into()
        })?;
        images.push(img);
    }

    let stack = if is_sixteen_bit(&images[0]) {
        let slices: Vec<Gray16Image> = images.iter().map(DynamicImage::to_luma16).collect();
        Stack::from_gray16(&slices)?
    } else {
        let slices: Vec<GrayImage> = images.iter().map(DynamicImage::to_luma8).collect();
        Stack::from_gray8(&slices)?
    };
    let [w, h, n] = stack.dims();
    tracing::info!("Stack size: {}x{}x{} ({:?})", w, h, n, stack.depth());
    Ok(stack)
}

fn quantize(value: f32, full_scale: f64) -> f64 {
    (value as f64).round().clamp(0.0, full_scale)
}

fn slice_to_gray8(values: &[f32], w: u32, h: u32) -> Option<GrayImage> {
    let raw = values
        .iter()
        .map(|&v| quantize(v, SampleDepth::U8.full_scale()) as u8)
        .collect();
    GrayImage::from_raw(w, h, raw)
}

fn slice_to_gray16(values: &[f32], w: u32, h: u32) -> Option<Gray16Image> {
    let raw = values
        .iter()
        .map(|&v| quantize(v, SampleDepth::U16.full_scale()) as u16)
        .collect();
    Gray16Image::from_raw(w, h, raw)
}

/// Float stacks are stored as 16-bit PNGs scaled from `[0, 1]`.
fn slice_to_image(stack: &Stack, s: usize) -> CliResult<DynamicImage> {
    let (w, h) = (stack.width() as u32, stack.height() as u32);
    let values = stack.slice(s);
    let img = match stack.depth() {
        SampleDepth::U8 => slice_to_gray8(values, w, h).map(DynamicImage::ImageLuma8),
        SampleDepth::U16 => slice_to_gray16(values, w, h).map(DynamicImage::ImageLuma16),
        SampleDepth::F32 => {
            let scale = SampleDepth::U16.full_scale() as f32;
            let scaled: Vec<f32> = values.iter().map(|&v| v * scale).collect();
            slice_to_gray16(&scaled, w, h).map(DynamicImage::ImageLuma16)
        }
    };
    img.ok_or_else(|| format!("Slice {} does not match {}x{}", s, w, h).into())
}

fn write_stack(stack: &Stack, dir: &Path) -> CliResult<()> {
    std::fs::create_dir_all(dir)?;
    for s in 1..=stack.n_slices() {
        let path = dir.join(format!("slice_{:04}.png", s));
        slice_to_image(stack, s)?
            .save(&path)
            .map_err(|e| -> CliError {
                format!("Failed to write slice {}: {}", path.display(), e).into()
            })?;
    }
    tracing::info!("Wrote {} slices to {}", stack.n_slices(), dir.display());
    Ok(())
}

fn write_json<T: serde::Serialize>(value: &T, path: &Path) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, &json)?;
    Ok(())
}

// ── flatten ────────────────────────────────────────────────────────────

fn run_flatten(args: &CliFlattenArgs) -> CliResult<()> {
    let stack = load_stack(&args.slices)?;

    let mut config = build_config(args.config.as_deref(), &args.height, stack.depth())?;
    if let Some(method) = args.method {
        config.interpolation = method.to_core();
    }
    if args.height_map.is_some() {
        config.emit_height_map = true;
    }

    let out = Flattener::with_config(config).flatten(&stack)?;
    let summary = &out.summary;
    tracing::info!(
        "Surface moved to slice {} ({} -> {} slices, {} voxels dropped)",
        summary.target_height,
        stack.n_slices(),
        summary.output_slices,
        summary.resample.dropped,
    );

    write_stack(&out.stack, &args.out)?;

    if let (Some(path), Some(map)) = (args.height_map.as_deref(), out.height_map.as_ref()) {
        write_json(map, path)?;
        tracing::info!("Height map written to {}", path.display());
    }

    if let Some(path) = args.summary.as_deref() {
        write_json(summary, path)?;
        tracing::info!("Summary written to {}", path.display());
    }

    Ok(())
}

// ── height ─────────────────────────────────────────────────────────────

fn run_height(args: &CliHeightArgs) -> CliResult<()> {
    let stack = load_stack(&args.slices)?;
    let config = build_config(args.config.as_deref(), &args.height, stack.depth())?;

    let map = Flattener::with_config(config).height_map(&stack)?;
    if let Some((lo, hi)) = map.range() {
        tracing::info!("Surface depth range: {:.3} .. {:.3}", lo, hi);
    }
    if map.n_empty() > 0 {
        tracing::info!("{} pixels without signal", map.n_empty());
    }

    write_json(&map, &args.out)?;
    tracing::info!("Height map written to {}", args.out.display());
    Ok(())
}

// ── print-config ───────────────────────────────────────────────────────

fn run_print_config() -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(&FlattenConfig::default())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stackflat::ThresholdWindow;

    #[test]
    fn quantize_rounds_and_clamps() {
        assert_eq!(quantize(12.4, 255.0), 12.0);
        assert_eq!(quantize(12.5, 255.0), 13.0);
        assert_eq!(quantize(-3.0, 255.0), 0.0);
        assert_eq!(quantize(300.0, 255.0), 255.0);
        assert_eq!(quantize(70000.0, 65535.0), 65535.0);
    }

    #[test]
    fn eight_bit_slice_keeps_layout() {
        let img = slice_to_gray8(&[0.4, 1.6, 254.7, 900.0], 2, 2).unwrap();
        assert_eq!(img.as_raw(), &vec![0u8, 2, 255, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [2]);
        assert!(slice_to_gray8(&[0.0; 3], 2, 2).is_none());
    }

    #[test]
    fn float_stack_is_written_as_sixteen_bit() {
        let stack = Stack::new(2, 1, 1, vec![0.0, 1.0]).unwrap();
        let img = slice_to_image(&stack, 1).unwrap();
        assert_eq!(img.as_luma16().unwrap().as_raw(), &vec![0u16, 65535]);
    }

    #[test]
    fn overrides_apply_on_top_of_depth_defaults() {
        let params = CliHeightParams {
            min: Some(100.0),
            max: None,
            sigma: Some(0.0),
        };
        let config = build_config(None, &params, SampleDepth::U16).unwrap();
        assert_eq!(config.threshold, ThresholdWindow::new(100.0, 65535.0));
        assert_eq!(config.smoothing_sigma, 0.0);
    }

    #[test]
    fn flags_repair_an_invalid_config_file() {
        let path = std::env::temp_dir().join(format!("stackflat-cli-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"minThreshold": 50.0, "maxThreshold": 10.0}"#).unwrap();
        let params = CliHeightParams {
            min: None,
            max: Some(80.0),
            sigma: None,
        };
        let fixed = build_config(Some(path.as_path()), &params, SampleDepth::U8);
        let unfixed = build_config(
            Some(path.as_path()),
            &CliHeightParams {
                min: None,
                max: None,
                sigma: None,
            },
            SampleDepth::U8,
        );
        std::fs::remove_file(&path).unwrap();

        assert_eq!(fixed.unwrap().threshold, ThresholdWindow::new(50.0, 80.0));
        assert!(unfixed.is_err());
    }

    #[test]
    fn inverted_override_is_rejected() {
        let params = CliHeightParams {
            min: Some(200.0),
            max: Some(100.0),
            sigma: None,
        };
        assert!(build_config(None, &params, SampleDepth::U8).is_err());
    }

    #[test]
    fn method_arg_maps_to_core() {
        assert_eq!(MethodArg::Linear.to_core(), InterpolationMethod::Linear);
        assert_eq!(
            MethodArg::MonotoneCubic.to_core(),
            InterpolationMethod::MonotoneCubic
        );
    }
}
