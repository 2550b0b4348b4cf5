extern crate log;
pub mod phpclass;
pub mod record;
use crate::phpclass::builder::write_class_file;
use crate::phpclass::comment::DEFAULT_COMMENT_WIDTH;
use crate::phpclass::definition::ClassDefinition;
use crate::phpclass::parser::read_class_file;
use crate::record::feature::Feature;
use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use indicatif::{ParallelProgressIterator, ProgressBar};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::{fs::read_to_string, path::Path};

/// Generates PHP classes with CRUD methods from incomplete PHP data classes.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Paths to the incomplete PHP classes.
    #[arg(short = 'l', long, num_args = 1..)]
    input_filepaths: Vec<PathBuf>,

    /// Built-in records to generate classes for.
    #[arg(short, long, value_enum)]
    record: Vec<BuiltinRecord>,

    /// Path to an optional YAML config file.
    #[arg(short, long)]
    config_filepath: Option<PathBuf>,

    /// Overrides the output directory of the config file.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BuiltinRecord {
    Feature,
}

impl BuiltinRecord {
    fn definition(&self) -> ClassDefinition {
        match self {
            BuiltinRecord::Feature => ClassDefinition::for_record::<Feature>(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_comment_width() -> usize {
    DEFAULT_COMMENT_WIDTH
}

#[derive(Deserialize, Debug, PartialEq)]
struct Config {
    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,
    #[serde(default = "default_comment_width")]
    comment_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            comment_width: default_comment_width(),
        }
    }
}

fn read_config(config_filepath: Option<&Path>) -> anyhow::Result<Config> {
    let config = match config_filepath {
        Some(config_filepath) => {
            if !config_filepath.exists() {
                return Err(anyhow!("Config file {:?} not found", config_filepath));
            }
            let config_contents = read_to_string(config_filepath)?;
            serde_yaml::from_str(&config_contents)?
        }
        None => Config::default(),
    };
    if config.comment_width == 0 {
        return Err(anyhow!("comment_width must be greater than 0"));
    }
    Ok(config)
}

/// Checks the command line and resolves the config it points to.
fn resolve_config(args: &Args) -> anyhow::Result<Config> {
    if args.input_filepaths.is_empty() && args.record.is_empty() {
        return Err(anyhow!(
            "The -l parameter with an input file name or a --record is required"
        ));
    }
    let mut config = read_config(args.config_filepath.as_deref())?;
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.clone();
    }
    Ok(config)
}

/// Fails when two definitions would be written to the same file.
fn ensure_unique_output_files(definitions: &[ClassDefinition]) -> anyhow::Result<()> {
    let mut seen = HashSet::new();
    for definition in definitions {
        // Some file systems are case-insensitive.
        let file_name = definition.output_file_name();
        if !seen.insert(file_name.to_lowercase()) {
            return Err(anyhow!(
                "More than one input declares class {}, both would be written to {}",
                definition.class_name,
                file_name
            ));
        }
    }
    Ok(())
}

fn collect_definitions(
    input_filepaths: &[PathBuf],
    records: &[BuiltinRecord],
) -> anyhow::Result<Vec<ClassDefinition>> {
    let mut definitions = input_filepaths
        .par_iter()
        .map(|input_filepath| {
            log::info!("Parsing {:?}", input_filepath);
            read_class_file(input_filepath)
        })
        .collect::<anyhow::Result<Vec<ClassDefinition>>>()?;
    for record in records {
        log::info!("Using built-in record {:?}", record);
        definitions.push(record.definition());
    }
    ensure_unique_output_files(&definitions)?;
    Ok(definitions)
}

fn generate_classes(
    input_filepaths: &[PathBuf],
    records: &[BuiltinRecord],
    config: &Config,
) -> anyhow::Result<Vec<PathBuf>> {
    let definitions = collect_definitions(input_filepaths, records)?;
    let bar = ProgressBar::new(definitions.len() as u64);
    definitions
        .par_iter()
        .progress_with(bar)
        .map(|definition| {
            write_class_file(definition, &config.output_dir, config.comment_width)
        })
        .collect()
}

fn try_main() -> anyhow::Result<()> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    env_logger::init();

    let args = Args::try_parse()?;
    let config = resolve_config(&args)?;
    let created = generate_classes(&args.input_filepaths, &args.record, &config)?;
    log::info!("Created {} class file(s)", created.len());
    Ok(())
}

fn main() {
    if let Err(e) = try_main() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1)
    }
}
