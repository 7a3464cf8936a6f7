//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use scene_repair::DefectClass;

/// Scene Repair - detect and fix defects in scene-configuration files
#[derive(Parser, Debug)]
#[command(name = "scene-repair")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Scan a scene file and list detected defects
    Scan {
        /// Path to the scene YAML file
        path: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Repair a scene file in place, with backup and verification
    ///
    /// A timestamped backup is written next to the original before any
    /// mutation; if the rewritten file fails to reload, the backup is
    /// restored automatically.
    Fix {
        /// Path to the scene YAML file
        path: PathBuf,

        /// Defect class to repair
        #[arg(long, value_enum)]
        defect: Defect,
    },
}

/// Defect class selector
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Defect {
    /// Rename later holders of a duplicated scene id
    DuplicateIds,
    /// Remove null/empty attribute values from scene entities
    EmptyAttributes,
}

impl From<Defect> for DefectClass {
    fn from(defect: Defect) -> Self {
        match defect {
            Defect::DuplicateIds => DefectClass::DuplicateIds,
            Defect::EmptyAttributes => DefectClass::EmptyAttributes,
        }
    }
}
