//! bnd-clib — API description → flat C library boundary.
//!
//! Reads a JSON description of a C++ API (functions, structs, enums,
//! typedefs with their modifiers) and generates a C-callable library: a
//! header with flattened types and mangled exported symbols, the C++
//! implementation adapting between the two representations, and a CMake
//! build script. Optionally also writes the grouped documentation JSON.
//!
//! # Quick start
//!
//! Generate the files from a config (suitable for `build.rs`):
//!
//! ```no_run
//! use std::path::Path;
//!
//! // Reads bnd-clib.toml and the description it names, writes the artifacts.
//! bnd_clib::run(Path::new("bnd-clib.toml"), None).unwrap();
//! ```
//!
//! Or get the generated text without writing to disk:
//!
//! ```no_run
//! use std::path::Path;
//!
//! let artifacts = bnd_clib::generate(Path::new("bnd-clib.toml")).unwrap();
//! print!("{}", artifacts["sk_clib.h"]);
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

pub mod adapter;
pub mod array;
pub mod classify;
pub mod config;
pub mod decl;
pub mod docs;
pub mod emit;
pub mod error;
pub mod mangle;
pub mod mapper;
pub mod model;

pub use emit::Artifacts;
pub use error::TranslateError;
pub use mapper::Translator;

/// Run the full pipeline: load config and description, generate every
/// artifact and write them to the output directory.
///
/// `config_path` is the path to a `bnd-clib.toml` configuration file.
/// `output_dir` optionally overrides the output directory from the config.
///
/// Returns the paths of the written files.
pub fn run(config_path: &Path, output_dir: Option<&Path>) -> Result<Vec<PathBuf>> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    let artifacts = generate_from_config(&cfg, base_dir)?;

    let dir = match output_dir {
        Some(p) => p.to_path_buf(),
        None => base_dir.join(&cfg.output.dir),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    write_artifacts(&dir, &artifacts)
}

/// Write every artifact next to its destination as `<name>.partial`, then
/// rename them into place. A failed write removes the staged files and
/// leaves existing outputs untouched.
fn write_artifacts(dir: &Path, artifacts: &Artifacts) -> Result<Vec<PathBuf>> {
    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(artifacts.len());
    for (name, text) in artifacts {
        let path = dir.join(name);
        let partial = dir.join(format!("{name}.partial"));
        if let Err(e) = std::fs::write(&partial, text) {
            for (staged_partial, _) in &staged {
                let _ = std::fs::remove_file(staged_partial);
            }
            return Err(e).with_context(|| format!("writing output to {}", partial.display()));
        }
        staged.push((partial, path));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (partial, path) in staged {
        std::fs::rename(&partial, &path)
            .with_context(|| format!("moving output into place at {}", path.display()))?;
        info!(path = %path.display(), "wrote artifact");
        written.push(path);
    }

    Ok(written)
}

/// Parse a `bnd-clib.toml` config file, load the description it names and
/// return the generated artifacts without writing to disk.
pub fn generate(config_path: &Path) -> Result<Artifacts> {
    let cfg = config::load_config(config_path)
        .with_context(|| format!("loading config from {}", config_path.display()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    generate_from_config(&cfg, base_dir)
}

/// Generate artifacts from an already-loaded [`config::Config`].
///
/// `base_dir` is the directory relative to which the description path in
/// the config is resolved (typically the parent directory of the TOML file).
pub fn generate_from_config(cfg: &config::Config, base_dir: &Path) -> Result<Artifacts> {
    let api_path = base_dir.join(&cfg.input.api);
    let desc = model::load_description(&api_path)
        .with_context(|| format!("loading description from {}", api_path.display()))?;

    info!(
        library = %cfg.output.name,
        headers = desc.headers.len(),
        functions = desc.functions().count(),
        structs = desc.structs().count(),
        "loaded description"
    );

    generate_from_description(cfg, &desc)
}

/// Generate artifacts for an in-memory description.
///
/// Generation is all-or-nothing: the first type that cannot be translated
/// aborts the pass.
pub fn generate_from_description(
    cfg: &config::Config,
    desc: &model::ApiDescription,
) -> Result<Artifacts> {
    let registry = model::TypeRegistry::from_description(desc, &cfg.function_pointers);
    let tr = Translator::new(&cfg.naming, &registry);

    let mut artifacts = emit::emit_library(desc, &tr, &cfg.output)?;

    if let Some(docs_cfg) = &cfg.docs {
        let json = docs::render(desc, &tr, &docs_cfg.targets)?;
        artifacts.insert(docs_cfg.file.clone(), json);
    }

    info!(artifacts = artifacts.len(), "generated library");

    Ok(artifacts)
}
