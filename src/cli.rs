// ============================================================================
// FilterFE CLI — headless filter application
// ============================================================================
//
// Usage examples:
//   filterfe --input photo.png --filter sepia --output result.jpg
//   filterfe -i "shots/*.jpg" -f black-white -f max-contrast --output-dir done/
//   filterfe -i photo.jpg -m "0.5,0,0,16; 0,0.5,0,16; 0,0,0.5,16" -o dim.png
//
// No window is opened. Filters run in the order given on the command line;
// --matrix entries are appended after the named filters.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::editor::Editor;
use crate::filters::{ColorMatrix, Filter, MatrixError};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// FilterFE headless photo filter.
///
/// Apply color filters to image files and convert between PNG and JPEG
/// without opening the GUI.
#[derive(Parser, Debug)]
#[command(
    name = "filterfe",
    about = "FilterFE headless photo filter",
    long_about = "Apply color filters to PNG/JPEG files without opening the GUI.\n\n\
                  Example:\n  \
                  filterfe --input photo.png --filter sepia --output result.jpg\n  \
                  filterfe -i \"shots/*.jpg\" -f max-contrast --output-dir done/"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Filter to apply; repeatable, applied in order. Names: black-white,
    /// only-red, only-green, only-blue, sepia, max-hue, max-saturation,
    /// max-contrast.
    #[arg(short, long = "filter", value_name = "NAME")]
    pub filters: Vec<String>,

    /// Custom 3x4 matrix filter: rows separated by ';', cells by ','.
    /// Repeatable; applied after the named filters.
    #[arg(short, long = "matrix", value_name = "R0;R1;R2")]
    pub matrices: Vec<String>,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing (original file names kept).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Returns `true` when any CLI-mode flag is present in the real process
    /// arguments. Used by `main()` to route before creating a window.
    pub fn is_cli_mode() -> bool {
        std::env::args().any(|a| a == "--input" || a == "-i")
    }
}

/// Map a CLI name onto a built-in filter.
pub fn filter_by_name(name: &str) -> Option<Filter> {
    match name.to_lowercase().as_str() {
        "black-white" | "bw" => Some(Filter::BlackWhite),
        "only-red" => Some(Filter::OnlyRed),
        "only-green" => Some(Filter::OnlyGreen),
        "only-blue" => Some(Filter::OnlyBlue),
        "sepia" => Some(Filter::Sepia),
        "max-hue" => Some(Filter::MaxHue),
        "max-saturation" => Some(Filter::MaxSaturation),
        "max-contrast" => Some(Filter::MaxContrast),
        _ => None,
    }
}

/// Parse the --matrix argument format: "a,b,c,d; e,f,g,h; i,j,k,l".
pub fn parse_matrix_arg(arg: &str) -> Result<Filter, MatrixError> {
    let cells: Vec<Vec<String>> = arg
        .split(';')
        .map(|row| row.split(',').map(|c| c.trim().to_string()).collect())
        .collect();
    ColorMatrix::parse(&cells).map(Filter::Custom)
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = bad arguments or one or more failures.
pub fn run(args: CliArgs) -> ExitCode {
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    // Build the filter chain up front so a bad name or matrix fails fast,
    // before any file is touched.
    let mut chain: Vec<Filter> = Vec::new();
    for name in &args.filters {
        match filter_by_name(name) {
            Some(f) => chain.push(f),
            None => {
                eprintln!("error: unknown filter '{}'.", name);
                return ExitCode::FAILURE;
            }
        }
    }
    for arg in &args.matrices {
        match parse_matrix_arg(arg) {
            Ok(f) => chain.push(f),
            Err(e) => {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(dir) = &args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!("error: cannot create output directory {}: {}", dir.display(), e);
            return ExitCode::FAILURE;
        }
    }

    let mut failures = 0usize;
    for input in &inputs {
        let started = Instant::now();
        match process_file(input, &chain, &args) {
            Ok(out_path) => {
                if args.verbose {
                    println!(
                        "{} -> {} ({} filters, {:.0?})",
                        input.display(),
                        out_path.display(),
                        chain.len(),
                        started.elapsed()
                    );
                }
            }
            Err(msg) => {
                eprintln!("error: {}: {}", input.display(), msg);
                failures += 1;
            }
        }
    }

    if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn process_file(input: &Path, chain: &[Filter], args: &CliArgs) -> Result<PathBuf, String> {
    let mut editor = Editor::new();
    editor.load(input).map_err(|e| e.to_string())?;
    for filter in chain {
        editor.apply_filter(filter.clone());
    }
    let out_path = output_path_for(input, args)?;
    editor.save(&out_path).map_err(|e| e.to_string())?;
    Ok(out_path)
}

fn output_path_for(input: &Path, args: &CliArgs) -> Result<PathBuf, String> {
    if let Some(out) = &args.output {
        return Ok(out.clone());
    }
    if let Some(dir) = &args.output_dir {
        let name = input
            .file_name()
            .ok_or_else(|| "input has no file name".to_string())?;
        return Ok(dir.join(name));
    }
    Err("no --output or --output-dir given".to_string())
}

/// Expand glob patterns / literal paths into concrete PathBufs.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for pattern in patterns {
        let mut matched = false;
        if let Ok(paths) = glob::glob(pattern) {
            for path in paths.flatten() {
                matched = true;
                out.push(path);
            }
        }
        // A literal path the glob didn't match: keep it and let the loader
        // report the real error.
        if !matched {
            out.push(PathBuf::from(pattern));
        }
    }
    out
}
