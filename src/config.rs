//! Command-line tokens and run configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::error::{Error, Result};
use crate::tracker::{FeatureMode, TrackerConfig};

/// Every recognized token at most once.
pub const MAX_TOKENS: usize = 9;

pub const USAGE: &str = "\
[Usage] seqtrack data=<path> [option ...]
- option:
 -- default: hog=true, fixed_window=false, multiscale=true, show=false, lab=false
 -- hog: use the gradient-orientation feature.
 -- fixed_window: fix the template window size, otherwise use the ROI size.
 -- singlescale: disable the multiscale search.
 -- show: write every frame with its region drawn to the overlay directory.
 -- lab: use Lab color on top of the gradient feature (implies hog).
 -- gray: use raw intensity as the feature.
 -- output=<file>: result log (default output.txt).
 -- overlay=<dir>: overlay directory for `show` (default show).";

/// Runs a single-object tracker over `<data>/img/`, seeded from the first
/// line of `<data>/groundtruth_rect.txt`.
#[derive(Parser, Debug)]
#[command(name = "seqtrack", version, about, after_help = USAGE)]
pub struct Cli {
    /// Order-independent run tokens, e.g. `data=/seq/Basketball show gray`
    #[arg(required = true, num_args = 1..=MAX_TOKENS, value_name = "TOKEN")]
    pub tokens: Vec<String>,
}

/// Everything one run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    pub output_path: PathBuf,
    pub overlay_dir: PathBuf,
    pub show: bool,
    pub tracker: TrackerConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::new(),
            output_path: PathBuf::from("output.txt"),
            overlay_dir: PathBuf::from("show"),
            show: false,
            tracker: TrackerConfig::default(),
        }
    }
}

impl RunConfig {
    /// Build a configuration from run tokens.
    ///
    /// Tokens may come in any order. For conflicting feature flags the last
    /// one wins: `lab gray` runs on intensity, `gray lab` on Lab color.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self> {
        let mut config = Self::default();
        let mut data_dir = None;
        let mut hog = true;
        let mut lab = false;

        let mut tokens = tokens.iter().map(<S as AsRef<str>>::as_ref);
        while let Some(token) = tokens.next() {
            if let Some((key, value)) = token.split_once('=') {
                let value = non_empty(key, value)?;
                match key {
                    "data" => data_dir = Some(PathBuf::from(value)),
                    "output" => config.output_path = PathBuf::from(value),
                    "overlay" => config.overlay_dir = PathBuf::from(value),
                    _ => return Err(Error::usage(format!("unknown option '{token}'"))),
                }
                continue;
            }

            match token {
                "data" => {
                    let value = tokens
                        .next()
                        .ok_or_else(|| Error::usage("'data' requires a path"))?;
                    data_dir = Some(PathBuf::from(non_empty("data", value)?));
                }
                "hog" => hog = true,
                "fixed_window" => config.tracker.fixed_window = true,
                "singlescale" => config.tracker.multiscale = false,
                "show" => config.show = true,
                "lab" => {
                    lab = true;
                    hog = true;
                }
                "gray" => hog = false,
                _ => return Err(Error::usage(format!("unknown option '{token}'"))),
            }
        }

        config.data_dir =
            data_dir.ok_or_else(|| Error::usage("missing data=<path>"))?;
        config.tracker.features = match (hog, lab) {
            (false, _) => FeatureMode::Gray,
            (true, true) => FeatureMode::Lab,
            (true, false) => FeatureMode::Hog,
        };
        Ok(config)
    }

    /// Directory holding one image per frame.
    pub fn image_dir(&self) -> PathBuf {
        self.data_dir.join("img")
    }

    /// Annotation file whose first line seeds the tracker.
    pub fn ground_truth_path(&self) -> PathBuf {
        self.data_dir.join("groundtruth_rect.txt")
    }
}

fn non_empty<'a>(key: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        Err(Error::usage(format!("'{key}' requires a value")))
    } else {
        Ok(value)
    }
}
