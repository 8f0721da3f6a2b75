use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::{ImageReader, RgbaImage};
use photo_sheet_core::config::{RawLayoutConfig, Scalar, parse_hex_color};
use photo_sheet_core::prelude::*;
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "photo-sheet",
    about = "Lay out photos onto printable pages",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show progress bars (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lay out photos and write one PNG per page (plus JSON layout)
    Render(LayoutArgs),
    /// Layout-only export (no PNGs): compute placements and write JSON
    Layout(LayoutArgs),
    /// List the built-in page presets
    Presets,
    /// Simple timing bench (lays out once per strategy, prints time + pages)
    Bench(BenchArgs),
}

#[derive(Parser, Debug, Clone)]
struct LayoutArgs {
    // Input/Output
    /// Input file or directory
    #[arg(help_heading = "Input/Output")]
    input: PathBuf,
    /// Output directory
    #[arg(short, long, default_value = "out", help_heading = "Input/Output")]
    out_dir: PathBuf,
    /// Base name (files will be <name>-page-<n>.png / <name>.json)
    #[arg(short, long, default_value = "combined", help_heading = "Input/Output")]
    name: String,
    /// YAML config file path (flags given on the command line take precedence)
    #[arg(long, help_heading = "Input/Output")]
    config: Option<PathBuf>,
    /// Include patterns (glob). If set, only files matching any pattern are considered
    #[arg(long, help_heading = "Input/Output")]
    include: Vec<String>,
    /// Exclude patterns (glob). Files matching any pattern will be ignored
    #[arg(long, help_heading = "Input/Output")]
    exclude: Vec<String>,

    // Page
    /// Page preset: a4 | letter | 4x6 | 5x7 | custom [default: a4]
    #[arg(long, value_parser = ["a4", "letter", "4x6", "5x7", "custom"], help_heading = "Page")]
    preset: Option<String>,
    /// Orientation: portrait | landscape [default: portrait]
    #[arg(long, value_parser = ["portrait", "landscape"], help_heading = "Page")]
    orientation: Option<String>,
    /// Custom page width in pixels (implies --preset custom unless a preset is given)
    #[arg(long, help_heading = "Page")]
    width: Option<u32>,
    /// Custom page height in pixels (implies --preset custom unless a preset is given)
    #[arg(long, help_heading = "Page")]
    height: Option<u32>,
    /// Page background color (#rgb, #rrggbb or #rrggbbaa) [default: #ffffff]
    #[arg(long, help_heading = "Page")]
    background: Option<String>,

    // Layout
    /// Strategy: grid | shelf [default: grid]
    #[arg(long, value_parser = ["grid", "shelf"], help_heading = "Layout")]
    strategy: Option<String>,
    /// Gap between images in pixels [default: 20]
    #[arg(long, help_heading = "Layout")]
    spacing: Option<u32>,
    /// Margin around the page edges in pixels [default: 40]
    #[arg(long, help_heading = "Layout")]
    padding: Option<u32>,
    /// Images per row in grid mode [default: 2]
    #[arg(long, help_heading = "Layout")]
    images_per_row: Option<u32>,

    // Export
    /// Metadata format: json | json-by-id
    #[arg(long, default_value = "json", value_parser = ["json", "json-by-id"], help_heading = "Export")]
    metadata: String,
    /// Export layout stats (JSON) to this file
    #[arg(long, help_heading = "Export")]
    export_stats: Option<PathBuf>,
    /// Print the merged configuration (after YAML/flags) and exit
    #[arg(long, default_value_t = false, help_heading = "Export")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Export")]
    print_config_format: String,
    /// Dry run: compute layout and stats but do not write files
    #[arg(long, default_value_t = false, help_heading = "Export")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct BenchArgs {
    /// Input file or directory
    input: PathBuf,
    /// Page preset: a4 | letter | 4x6 | 5x7
    #[arg(long, value_parser = ["a4", "letter", "4x6", "5x7"], default_value = "a4")]
    preset: String,
    /// Images per row for the grid run
    #[arg(long, default_value_t = 2)]
    images_per_row: u32,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    let progress = cli.progress && !cli.quiet;
    match &cli.command {
        Commands::Render(args) => run_layout(args, progress, true),
        Commands::Layout(args) => run_layout(args, progress, false),
        Commands::Presets => {
            print_presets();
            Ok(())
        }
        Commands::Bench(b) => run_bench(b),
    }
}

fn run_layout(args: &LayoutArgs, show_progress: bool, render: bool) -> anyhow::Result<()> {
    let cfg = build_config(args)?;

    if args.print_config {
        match args.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }
    if let Err(e) = cfg.validate() {
        warn!(error = %e, "configuration will be corrected during layout");
    }

    if !args.dry_run {
        fs::create_dir_all(&args.out_dir)
            .with_context(|| format!("create out_dir {}", args.out_dir.display()))?;
    }

    let paths = gather_paths(&args.input, &args.include, &args.exclude)?;
    // `layout` only needs sizes, so pixels are decoded only when rendering
    let sources = load_images_with_progress(&paths, show_progress, render)?;
    info!(found = paths.len(), loaded = sources.len(), "loaded input images");
    if sources.is_empty() {
        warn!("no usable images found; nothing to do");
        return Ok(());
    }

    let descriptors = describe(&sources);
    let result = layout(&descriptors, &cfg);
    let stats = result.stats();
    info!(
        pages = stats.num_pages,
        photos = stats.num_placements,
        occupancy = format!("{:.2}%", stats.occupancy * 100.0),
        "layout"
    );

    if render {
        let by_key: HashMap<&str, &RgbaImage> = sources
            .iter()
            .filter_map(|s| s.rgba.as_ref().map(|rgba| (s.key.as_str(), rgba)))
            .collect();
        let pages = photo_sheet_core::compositing::render_pages(&result, |k: &String| {
            by_key.get(k.as_str()).copied()
        })?;
        if !args.dry_run {
            for p in &pages {
                let png_path = args.out_dir.join(format!("{}-{}.png", args.name, p.name));
                p.rgba
                    .save(&png_path)
                    .with_context(|| format!("write {}", png_path.display()))?;
                info!(?png_path, index = p.index, "wrote page");
            }
        }
    }

    if !args.dry_run {
        let json_value = match args.metadata.as_str() {
            "json" => photo_sheet_core::to_json(&result),
            "json-by-id" => photo_sheet_core::to_json_by_id(&result),
            other => anyhow::bail!("unknown metadata format: {}", other),
        };
        let json_path = args.out_dir.join(format!("{}.json", args.name));
        fs::write(&json_path, serde_json::to_string_pretty(&json_value)?)
            .with_context(|| format!("write {}", json_path.display()))?;
        info!(?json_path, pages = result.pages.len(), "layout written");
    }

    if let Some(stats_path) = &args.export_stats {
        if !args.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!("{}", stats.summary());
        }
    }
    Ok(())
}

/// Defaults, then the YAML file (if any), then flags given on the command line.
fn build_config(args: &LayoutArgs) -> anyhow::Result<LayoutConfig> {
    let mut cfg = LayoutConfig::default();
    if let Some(path) = &args.config {
        let file =
            fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        let raw: RawLayoutConfig = serde_yaml::from_str(&file)
            .with_context(|| format!("parse config {}", path.display()))?;
        cfg = raw.apply(cfg);
    }

    let custom_dims = args.width.is_some() || args.height.is_some();
    let preset = match (&args.preset, custom_dims) {
        (Some(p), _) => Some(p.clone()),
        (None, true) => Some("custom".to_string()),
        (None, false) => None,
    };
    let flags = RawLayoutConfig {
        preset,
        orientation: args.orientation.clone(),
        width: args.width.map(|v| Scalar::Int(v.into())),
        height: args.height.map(|v| Scalar::Int(v.into())),
        spacing: args.spacing.map(|v| Scalar::Int(v.into())),
        padding: args.padding.map(|v| Scalar::Int(v.into())),
        images_per_row: args.images_per_row.map(|v| Scalar::Int(v.into())),
        strategy: args.strategy.clone(),
        background: None,
    };
    cfg = flags.apply(cfg);

    if let Some(bg) = &args.background {
        cfg.background = parse_hex_color(bg)?;
    }
    Ok(cfg)
}

fn run_bench(b: &BenchArgs) -> anyhow::Result<()> {
    let paths = gather_paths(&b.input, &[], &[])?;
    let sources = load_images_with_progress(&paths, false, false)?;
    let descriptors = describe(&sources);
    let preset: PagePreset = b
        .preset
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown preset: {}", b.preset))?;
    for strategy in [Strategy::Grid, Strategy::Shelf] {
        let cfg = LayoutConfig::builder()
            .preset(preset)
            .strategy(strategy)
            .images_per_row(b.images_per_row)
            .build();
        let start = Instant::now();
        let result = layout(&descriptors, &cfg);
        let dur = start.elapsed();
        let stats = result.stats();
        println!(
            "strategy={:?} photos={} pages={} occupancy={:.2}% time={}",
            strategy,
            stats.num_placements,
            stats.num_pages,
            stats.occupancy * 100.0,
            fmt_dur(dur)
        );
    }
    Ok(())
}

fn fmt_dur(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms >= 1.0 {
        format!("{:.1}ms", ms)
    } else {
        format!("{}us", d.as_micros())
    }
}

fn print_presets() {
    println!("{:<8} {:>12} {:>12}", "preset", "portrait", "landscape");
    for preset in PagePreset::FIXED {
        let p = resolve_page_dimensions(preset, None, None, Orientation::Portrait);
        let l = p.transposed();
        println!(
            "{:<8} {:>12} {:>12}",
            preset.name(),
            format!("{}x{}", p.width, p.height),
            format!("{}x{}", l.width, l.height)
        );
    }
    println!("(pixel sizes at {} DPI)", photo_sheet_core::PRESET_DPI);
}

fn gather_paths(
    path: &Path,
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    if path.is_file() {
        if !should_skip(path, inc_set.as_ref(), exc_set.as_ref()) && is_image(path) {
            list.push(path.to_path_buf());
        }
    } else {
        // sorted so page order is stable across runs and platforms
        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let p = entry.path();
            if p.is_file() && !should_skip(p, inc_set.as_ref(), exc_set.as_ref()) && is_image(p) {
                list.push(p.to_path_buf());
            }
        }
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn extension(p: &Path) -> Option<String> {
    p.extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_ascii_lowercase())
}

fn is_image(p: &Path) -> bool {
    matches!(
        extension(p),
        Some(ext) if matches!(
            ext.as_str(),
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "heic" | "heif"
        )
    )
}

fn is_heif(p: &Path) -> bool {
    matches!(extension(p).as_deref(), Some("heic" | "heif"))
}

/// An input photo. `rgba` is only present when pixels were decoded.
struct SourceImage {
    key: String,
    width: u32,
    height: u32,
    rgba: Option<RgbaImage>,
}

fn load_images_with_progress(
    paths: &[PathBuf],
    progress: bool,
    decode: bool,
) -> anyhow::Result<Vec<SourceImage>> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new(paths.len() as u64);
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} reading {pos}/{len} [{elapsed_precise}] {wide_msg}",
        )?);
        Some(b)
    } else {
        None
    };
    let mut list = Vec::with_capacity(paths.len());
    for p in paths {
        let msg = p.file_name().and_then(|s| s.to_str()).unwrap_or("");
        if let Some(b) = &bar {
            b.set_message(msg.to_string());
        }
        let loaded = if decode {
            load_image(p).map(|rgba| (rgba.width(), rgba.height(), Some(rgba)))
        } else {
            read_dimensions(p).map(|(w, h)| (w, h, None))
        };
        match loaded {
            Ok((width, height, rgba)) => {
                let key = p.to_string_lossy().replace('\\', "/");
                list.push(SourceImage {
                    key,
                    width,
                    height,
                    rgba,
                });
            }
            Err(e) if is_heif(p) => {
                error!(
                    ?p,
                    error = %e,
                    "skip image: HEIC/HEIF is not supported by this build; convert it to JPEG first"
                );
            }
            Err(e) => {
                error!(?p, error = %e, "skip image: corrupted or unsupported");
            }
        }
        if let Some(b) = &bar {
            b.inc(1);
        }
    }
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(list)
}

fn load_image(p: &Path) -> anyhow::Result<RgbaImage> {
    let img = ImageReader::open(p)?.with_guessed_format()?.decode()?;
    Ok(img.to_rgba8())
}

/// Reads only the header; no pixel data is decoded.
fn read_dimensions(p: &Path) -> anyhow::Result<(u32, u32)> {
    Ok(ImageReader::open(p)?.with_guessed_format()?.into_dimensions()?)
}

/// Dimensions only; degenerate decodes are dropped here so they never reach layout.
fn describe(sources: &[SourceImage]) -> Vec<ImageDescriptor> {
    sources
        .iter()
        .filter_map(|s| {
            ImageDescriptor::try_new(s.key.clone(), s.width, s.height)
                .map_err(|e| error!(error = %e, "skip image"))
                .ok()
        })
        .collect()
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(name: &str, w: u32, h: u32) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("photo-sheet-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        RgbaImage::new(w, h).save(&path).unwrap();
        path
    }

    #[test]
    fn layout_only_loading_reads_sizes_without_pixels() {
        let path = write_png("dims.png", 3, 5);
        let sized = load_images_with_progress(std::slice::from_ref(&path), false, false).unwrap();
        assert_eq!(sized.len(), 1);
        assert_eq!((sized[0].width, sized[0].height), (3, 5));
        assert!(sized[0].rgba.is_none());

        let decoded = load_images_with_progress(&[path], false, true).unwrap();
        assert_eq!((decoded[0].width, decoded[0].height), (3, 5));
        assert_eq!(decoded[0].rgba.as_ref().map(|i| i.dimensions()), Some((3, 5)));
        assert_eq!(describe(&sized), describe(&decoded));
    }

    #[test]
    fn unreadable_files_are_skipped() {
        let dir = std::env::temp_dir().join(format!("photo-sheet-cli-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let bogus = dir.join("broken.heic");
        fs::write(&bogus, b"not an image").unwrap();
        for decode in [false, true] {
            let list = load_images_with_progress(std::slice::from_ref(&bogus), false, decode).unwrap();
            assert!(list.is_empty());
        }
    }
}
