use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

use clap::Parser;
use pixelano::{BatchReport, ColorRangeMap, Converter, DEFAULT_MARKER, FailedImage, PixelanoError};
use thiserror::Error;
use tracing::{error, info};

const COLOR_MAP_HELP: &str = "\
The class color map file holds one class per line:
    <CLASS_NAME><TAB><LOWER RGB VALUE><TAB><UPPER RGB VALUE>
e.g. 'MyClass\t220;0;0\t255;0;0'

A mask image is named after its source image plus the marker,
e.g. 'street_a.png' annotates 'street.jpg'.";

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Class to color map file path was not specified.")]
    MissingColorMap,
    #[error("Output path was not specified.")]
    MissingOutput,
    #[error("Mask marker must not be empty.")]
    EmptyMarker,
    #[error(transparent)]
    Pixelano(#[from] PixelanoError),
}

/// Pixelano - a simple image annotation tool
#[derive(Parser, Debug)]
#[command(name = "pixelano", version, about, long_about = None, after_help = COLOR_MAP_HELP)]
pub struct Cli {
    /// Class to color map file path (also accepted as -clm)
    #[arg(long = "clm", value_name = "PATH")]
    pub class_color_map: Option<PathBuf>,
    /// Path to a single image file, may be repeated
    #[arg(short = 'f', value_name = "PATH")]
    pub files: Vec<PathBuf>,
    /// Path to a directory with images, may be repeated
    #[arg(short = 'd', value_name = "PATH")]
    pub directories: Vec<PathBuf>,
    /// Dataset output path
    #[arg(short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
    /// Stem suffix marking mask images
    #[arg(long, value_name = "TEXT", default_value = DEFAULT_MARKER)]
    pub marker: String,
}

/// Validated inputs of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub color_map: PathBuf,
    pub files: Vec<PathBuf>,
    pub directories: Vec<PathBuf>,
    pub output: PathBuf,
    pub marker: String,
}

impl Cli {
    /// `Ok(None)` means there is nothing to process.
    pub fn into_plan(self) -> Result<Option<RunPlan>, CliError> {
        let color_map = self.class_color_map.ok_or(CliError::MissingColorMap)?;
        if self.files.is_empty() && self.directories.is_empty() {
            return Ok(None);
        }
        let output = self.output.ok_or(CliError::MissingOutput)?;
        if self.marker.is_empty() {
            return Err(CliError::EmptyMarker);
        }

        Ok(Some(RunPlan {
            color_map,
            files: self.files,
            directories: self.directories,
            output,
            marker: self.marker,
        }))
    }
}

/// Rewrite the single-dash `-clm` flag into the `--clm` form clap parses.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| if arg == "-clm" { OsString::from("--clm") } else { arg })
        .collect()
}

/// Convert every input of the plan. Only an unreadable color map or an
/// uncreatable output root abort the run.
pub fn run(plan: &RunPlan) -> Result<BatchReport, CliError> {
    fs::create_dir_all(&plan.output).map_err(PixelanoError::from)?;

    let color_map = ColorRangeMap::from_file(&plan.color_map)?;
    let converter = Converter::builder(color_map)
        .with_marker(plan.marker.clone())
        .build();
    info!("{}", converter.info());

    let mut report = converter.process_files(&plan.files, &plan.output);

    for directory in &plan.directories {
        match converter.process_directory(directory, &plan.output) {
            Ok(directory_report) => report.merge(directory_report),
            Err(err) => {
                error!("Skipping directory {}: {}", directory.display(), err);
                report.failed.push(FailedImage { path: directory.clone(), error: err });
            }
        }
    }

    Ok(report)
}
