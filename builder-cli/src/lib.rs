//! # Page Builder CLI
//!
//! Command-line host for the page builder engine.
//!
//! ## Usage
//!
//! ```bash
//! # Canonical export of any supported layout document
//! cargo run -p builder-cli -- normalize page.json --fit-to-canvas
//!
//! # Render boxes for a tablet viewport
//! cargo run -p builder-cli -- layout page.json --viewport tablet
//!
//! # Overlapping elements on the desktop canvas
//! cargo run -p builder-cli -- collisions page.json
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Plain configuration derived from the arguments
//! - [`run`] - Loads the document into a `BuilderStore` and produces the report

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::{Path, PathBuf};

use anyhow::Context;
use builder_core::import::DEFAULT_FIT_CANVAS;
use builder_core::{overlapping_pairs, BuilderStore, ConfigPatch, ElementId, ImportOptions, Viewport};
use clap::{Parser, Subcommand};
use serde::Serialize;

/// Command-line arguments for builder-cli.
#[derive(Debug, Clone, Parser)]
#[command(name = "builder-cli")]
#[command(about = "Inspect and normalize page builder layout documents")]
#[command(version)]
pub struct CliArgs {
    /// What to do with the document.
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Print the canonical export of a layout document
    Normalize {
        /// Layout document (any supported shape)
        file: PathBuf,

        /// Scale oversized content down to the default canvas
        #[arg(long)]
        fit_to_canvas: bool,

        /// Embed the canvas configuration in the output
        #[arg(long)]
        with_config: bool,
    },

    /// Print the render boxes for a viewport
    Layout {
        /// Layout document (any supported shape)
        file: PathBuf,

        /// Viewport to lay out (desktop, tablet or mobile)
        #[arg(long, env = "BUILDER_VIEWPORT", default_value = "desktop")]
        viewport: Viewport,

        /// Host window width; defaults to the viewport's container width
        #[arg(long)]
        window_width: Option<f64>,
    },

    /// List overlapping element pairs
    Collisions {
        /// Layout document (any supported shape)
        file: PathBuf,

        /// Container width used to resolve percentages
        #[arg(long, env = "BUILDER_CONTAINER_WIDTH")]
        container_width: Option<f64>,
    },
}

/// What a run should produce.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Canonical export.
    Normalize {
        /// Apply fit-to-canvas scaling on import.
        fit_to_canvas: bool,
        /// Embed the canvas configuration.
        with_config: bool,
    },
    /// Render boxes.
    Layout {
        /// Viewport to lay out.
        viewport: Viewport,
        /// Host window width.
        window_width: f64,
    },
    /// Overlapping pairs.
    Collisions {
        /// Container width for percentage resolution.
        container_width: f64,
    },
}

/// CLI configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CliConfig {
    /// Input document.
    pub file: PathBuf,
    /// Requested work.
    pub task: Task,
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        match args.command {
            CliCommand::Normalize {
                file,
                fit_to_canvas,
                with_config,
            } => Self {
                file,
                task: Task::Normalize {
                    fit_to_canvas,
                    with_config,
                },
            },
            CliCommand::Layout {
                file,
                viewport,
                window_width,
            } => Self {
                file,
                task: Task::Layout {
                    viewport,
                    window_width: window_width.unwrap_or_else(|| viewport.container_width()),
                },
            },
            CliCommand::Collisions {
                file,
                container_width,
            } => Self {
                file,
                task: Task::Collisions {
                    container_width: container_width
                        .unwrap_or_else(|| Viewport::Desktop.container_width()),
                },
            },
        }
    }
}

/// Output of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Text for stdout.
    pub output: String,
    /// Records dropped or repaired during import.
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
struct Overlap<'a> {
    first: &'a ElementId,
    second: &'a ElementId,
}

/// Load the document and carry out the configured task.
///
/// # Errors
///
/// Fails if the file cannot be read, the document is unusable, or the
/// output cannot be serialized.
pub fn run(config: &CliConfig) -> anyhow::Result<Report> {
    let fit_to_canvas = matches!(
        config.task,
        Task::Normalize {
            fit_to_canvas: true,
            ..
        }
    );
    let (mut store, warnings) = load(&config.file, fit_to_canvas)?;

    let output = match &config.task {
        Task::Normalize { with_config, .. } => {
            if *with_config {
                store.export_json_with_config()?
            } else {
                store.export_json()?
            }
        }
        Task::Layout {
            viewport,
            window_width,
        } => {
            store.set_config(&ConfigPatch::view_mode(*viewport));
            let boxes = store.render_boxes(*window_width);
            tracing::debug!(viewport = %viewport, window_width, boxes = boxes.len(), "Resolved layout");
            serde_json::to_string_pretty(&boxes)?
        }
        Task::Collisions { container_width } => {
            let pairs = overlapping_pairs(store.elements(), *container_width);
            tracing::debug!(container_width, pairs = pairs.len(), "Checked collisions");
            let overlaps: Vec<Overlap<'_>> = pairs
                .iter()
                .map(|(first, second)| Overlap { first, second })
                .collect();
            serde_json::to_string_pretty(&overlaps)?
        }
    };

    Ok(Report { output, warnings })
}

fn load(path: &Path, fit_to_canvas: bool) -> anyhow::Result<(BuilderStore, Vec<String>)> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let options = if fit_to_canvas {
        ImportOptions {
            fit_to: Some(DEFAULT_FIT_CANVAS),
        }
    } else {
        ImportOptions::default()
    };

    let mut store = BuilderStore::new();
    let report = store
        .import_json(&json, &options)
        .with_context(|| format!("Failed to import {}", path.display()))?;
    tracing::info!(
        file = %path.display(),
        schema = report.schema,
        imported = report.imported,
        dropped = report.warnings.len(),
        "Loaded layout document"
    );
    Ok((store, report.warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_doc(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    fn config(file: &Path, task: Task) -> CliConfig {
        CliConfig {
            file: file.to_path_buf(),
            task,
        }
    }

    #[test]
    fn test_args_convert_to_config() {
        let args = CliArgs::parse_from(["builder-cli", "layout", "page.json", "--viewport", "tablet"]);
        let config = CliConfig::from(args);
        assert_eq!(config.file, PathBuf::from("page.json"));
        assert_eq!(
            config.task,
            Task::Layout {
                viewport: Viewport::Tablet,
                window_width: 768.0,
            }
        );
    }

    #[test]
    fn test_collisions_default_to_desktop_width() {
        let args = CliArgs::parse_from(["builder-cli", "collisions", "page.json"]);
        assert_eq!(
            CliConfig::from(args).task,
            Task::Collisions {
                container_width: 1200.0
            }
        );
    }

    #[test]
    fn test_normalize_prints_canonical_export() {
        let file = write_doc(r#"{"components":[{"component":"navbar","x":0,"y":0}, 7]}"#);
        let report = run(&config(
            file.path(),
            Task::Normalize {
                fit_to_canvas: false,
                with_config: false,
            },
        ))
        .expect("run");

        let value: serde_json::Value = serde_json::from_str(&report.output).expect("json");
        let elements = value["elements"].as_array().expect("elements");
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0]["type"], "header");
        assert_eq!(report.warnings.len(), 1);
        assert!(value.get("canvas").is_none());
    }

    #[test]
    fn test_normalize_with_config_embeds_canvas() {
        let file = write_doc(r#"[{"type":"text","text":"hi"}]"#);
        let report = run(&config(
            file.path(),
            Task::Normalize {
                fit_to_canvas: false,
                with_config: true,
            },
        ))
        .expect("run");
        let value: serde_json::Value = serde_json::from_str(&report.output).expect("json");
        assert_eq!(value["canvas"]["viewMode"], "desktop");
    }

    #[test]
    fn test_layout_stacks_on_phone_width() {
        let file = write_doc(
            r#"[{"id":"a","type":"card","x":600,"y":400},{"id":"b","type":"card","x":0,"y":0}]"#,
        );
        let report = run(&config(
            file.path(),
            Task::Layout {
                viewport: Viewport::Mobile,
                window_width: 375.0,
            },
        ))
        .expect("run");

        let boxes: serde_json::Value = serde_json::from_str(&report.output).expect("json");
        let boxes = boxes.as_array().expect("boxes");
        assert_eq!(boxes.len(), 2);
        let top_of = |id: &str| {
            boxes
                .iter()
                .find(|b| b["id"] == id)
                .and_then(|b| b["top"].as_f64())
                .expect("top")
        };
        assert!(top_of("b") < top_of("a"));
    }

    #[test]
    fn test_collisions_lists_pairs() {
        let file = write_doc(
            r#"{"elements":[
                {"id":"a","type":"card","position":{"x":0,"y":0},"size":{"width":300,"height":300}},
                {"id":"b","type":"card","position":{"x":100,"y":100},"size":{"width":300,"height":300}},
                {"id":"c","type":"card","position":{"x":800,"y":0},"size":{"width":300,"height":300}}
            ]}"#,
        );
        let report = run(&config(
            file.path(),
            Task::Collisions {
                container_width: 1200.0,
            },
        ))
        .expect("run");

        let pairs: serde_json::Value = serde_json::from_str(&report.output).expect("json");
        assert_eq!(pairs, serde_json::json!([{"first": "a", "second": "b"}]));
    }

    #[test]
    fn test_unusable_document_is_an_error() {
        let file = write_doc(r#"{"foo": 1}"#);
        let err = run(&config(
            file.path(),
            Task::Collisions {
                container_width: 1200.0,
            },
        ))
        .expect_err("unrecognized shape");
        assert!(format!("{err:#}").contains("Unrecognized document shape"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.json");
        let err = run(&config(
            &missing,
            Task::Normalize {
                fit_to_canvas: false,
                with_config: false,
            },
        ))
        .expect_err("missing file");
        assert!(err.to_string().starts_with("Failed to read"));
    }
}
