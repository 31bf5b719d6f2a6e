//! Runs the complete table generation.
//!
//! Validates the configuration, builds all tables, writes the header and
//! finally renders the debug plots. Every step aborts the run on error; the
//! header is only replaced once all tables are complete.

use super::{HeaderWriter, LutConfig, LutError, Plotter, TableBuilder};

use log::{info, warn};

use std::fs;
use std::path::PathBuf;

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub header: PathBuf,    // Path of the written header
    pub num_tables: usize,  // Number of tables in the header
    pub resolution: usize,  // Samples per table
    pub plots: Vec<PathBuf>, // Rendered plot files, empty if plotting is disabled
}

pub struct LutGenerator {
    config: LutConfig,
    plotter: Plotter,
}

impl LutGenerator {
    /// Create a generator for the given settings.
    ///
    /// ```
    /// use lutgen::{LutConfig, LutGenerator};
    ///
    /// let generator = LutGenerator::new(LutConfig::default());
    /// assert_eq!(generator.config().resolution, 1024);
    /// ```
    pub fn new(config: LutConfig) -> LutGenerator {
        LutGenerator { config, plotter: Plotter::default() }
    }

    /// Use a different plotter for the debug images.
    pub fn with_plotter(mut self, plotter: Plotter) -> LutGenerator {
        self.plotter = plotter;
        self
    }

    pub fn config(&self) -> &LutConfig {
        &self.config
    }

    /// Generate the header, and the plots if enabled.
    ///
    /// ``` no_run
    /// use lutgen::{LutConfig, LutGenerator};
    ///
    /// # fn main() -> Result<(), lutgen::LutError> {
    /// let summary = LutGenerator::new(LutConfig::default()).run()?;
    /// println!("Wrote {} tables to {}", summary.num_tables, summary.header.display());
    /// # Ok(())
    /// # }
    /// ```
    pub fn run(&self) -> Result<RunSummary, LutError> {
        let config = &self.config;
        config.validate()?;
        info!("Generating {} tables with {} samples", config.waveforms.len(), config.resolution);

        let wt = TableBuilder::from_config(config)?.build_all(config)?;

        let dest_dir = &config.dest_dir;
        if !dest_dir.as_os_str().is_empty() {
            fs::create_dir_all(dest_dir).map_err(|e| LutError::io(dest_dir, e))?;
        }
        let header = config.dest_path();
        HeaderWriter::from_config(config).write_file(&wt, &header)?;

        let plots = match &config.plot_dir {
            Some(dir) => {
                info!("Generating plots in [{}]", dir.display());
                self.plotter.plot_all(&wt, dir)?
            }
            None => {
                warn!("Plotting disabled");
                Vec::new()
            }
        };

        info!("All done");
        Ok(RunSummary {
            header,
            num_tables: wt.num_tables(),
            resolution: wt.resolution,
            plots,
        })
    }
}

// ----------------------------------------------
//                  Unit tests
// ----------------------------------------------

#[cfg(test)]
use super::Waveform;

#[cfg(test)]
fn test_config(name: &str) -> (PathBuf, LutConfig) {
    let root = std::env::temp_dir().join(format!("lutgen-gen-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&root);
    let mut config = LutConfig::default();
    config.dest_dir = root.join("generated");
    config.plot_dir = None;
    (root, config)
}

#[test]
fn run_creates_directory_and_header() {
    let (root, config) = test_config("basic");
    let summary = LutGenerator::new(config.clone()).run().unwrap();
    assert_eq!(summary.header, root.join("generated").join("luts.hpp"));
    assert_eq!(summary.num_tables, 8);
    assert_eq!(summary.resolution, 1024);
    assert!(summary.plots.is_empty());

    let header = fs::read_to_string(&summary.header).unwrap();
    assert!(header.starts_with("#pragma once\n#include \"esp_attr.h\"\n\n#define LUTGEN_RESOLUTION 1024\n"));
    for wave in Waveform::ALL.iter() {
        assert!(header.contains(&format!("IRAM_ATTR float lutgen_{}[1024] = {{", wave.name())));
    }
}

#[test]
fn existing_directory_and_files_are_kept() {
    let (root, config) = test_config("existing");
    let dir = root.join("generated");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("other.h"), "// unrelated").unwrap();
    LutGenerator::new(config).run().unwrap();
    assert_eq!(fs::read_to_string(dir.join("other.h")).unwrap(), "// unrelated");
    assert!(dir.join("luts.hpp").exists());
}

#[test]
fn invalid_config_fails_before_any_output() {
    let (root, mut config) = test_config("invalid");
    config.resolution = 0;
    let result = LutGenerator::new(config).run();
    assert!(matches!(result, Err(LutError::InvalidResolution(0))));
    assert!(!root.exists());
}

#[test]
fn plots_are_rendered_when_enabled() {
    let (root, mut config) = test_config("plots");
    config.resolution = 64;
    config.waveforms = vec![Waveform::Tri, Waveform::Sin];
    config.plot_dir = Some(root.join("figures"));
    let summary = LutGenerator::new(config)
        .with_plotter(Plotter::new(100, 80))
        .run()
        .unwrap();
    assert_eq!(summary.plots, vec![root.join("figures").join("sin.png"),
                                   root.join("figures").join("tri.png")]);
    for plot in summary.plots.iter() {
        assert!(plot.exists());
    }
}

#[test]
fn parallel_run_writes_same_header() {
    let (_, config) = test_config("sequential");
    let (_, mut parallel) = test_config("parallel");
    parallel.num_threads = 3;
    let first = LutGenerator::new(config).run().unwrap();
    let second = LutGenerator::new(parallel).run().unwrap();
    assert!(fs::read(first.header).unwrap() == fs::read(second.header).unwrap());
}
