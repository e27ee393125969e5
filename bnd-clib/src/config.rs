//! Configuration types for `bnd-clib.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::docs::Target;

/// Root configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    #[serde(default)]
    pub naming: Naming,
    #[serde(default)]
    pub output: OutputConfig,
    /// Typedef names to treat as function pointers in addition to the ones
    /// the description flags with `is_function_pointer`.
    #[serde(default)]
    pub function_pointers: Vec<String>,
    /// Emit the grouped documentation JSON when present.
    #[serde(default)]
    pub docs: Option<DocsConfig>,
}

/// Where the API description lives.
#[derive(Debug, Deserialize)]
pub struct InputConfig {
    /// JSON API description, relative to the config file.
    pub api: PathBuf,
}

/// Output file settings.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Base name of the generated header/implementation and CMake target.
    #[serde(default = "default_output_name")]
    pub name: String,
    /// Directory the artifacts are written to.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    /// Headers declaring the native API, `#include`d by the implementation.
    #[serde(default)]
    pub native_headers: Vec<String>,
    /// Libraries the generated shared library links against.
    #[serde(default)]
    pub link_libraries: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            name: default_output_name(),
            dir: default_output_dir(),
            native_headers: Vec::new(),
            link_libraries: Vec::new(),
        }
    }
}

fn default_output_name() -> String {
    "sk_clib".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Documentation output settings.
#[derive(Debug, Deserialize)]
pub struct DocsConfig {
    #[serde(default = "default_docs_file")]
    pub file: String,
    /// Signature targets attached to each function, in order.
    #[serde(default = "default_docs_targets")]
    pub targets: Vec<Target>,
}

fn default_docs_file() -> String {
    "api.json".to_string()
}

fn default_docs_targets() -> Vec<Target> {
    vec![Target::Cpp, Target::Clib]
}

/// Name prefixes of the flat library boundary.
///
/// `abi_prefix` namespaces every ABI type and exported symbol;
/// `adapter_prefix` namespaces the conversion functions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Naming {
    pub abi_prefix: String,
    pub adapter_prefix: String,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            abi_prefix: "__sklib".to_string(),
            adapter_prefix: "__skadapter".to_string(),
        }
    }
}

impl Naming {
    /// `circle` → `__sklib_circle`.
    pub fn abi_type(&self, name: &str) -> String {
        format!("{}_{name}", self.abi_prefix)
    }

    /// A generic container instance, `vector` of `int` → `__sklib_vector_int`.
    pub fn container_type(&self, container: &str, element: &str) -> String {
        self.abi_type(&format!("{container}_{element}"))
    }

    /// The opaque pointer token, `__sklib_ptr`.
    pub fn opaque_ptr(&self) -> String {
        self.abi_type("ptr")
    }

    /// Root of an exported symbol name, `__sklib__move_circle`.
    pub fn symbol_root(&self, function: &str) -> String {
        format!("{}__{function}", self.abi_prefix)
    }

    /// `circle` → `__skadapter__to_circle`.
    pub fn adapter(&self, token: &str) -> String {
        format!("{}__to_{token}", self.adapter_prefix)
    }

    /// The opaque pointer token without its leading underscores, `sklib_ptr`.
    pub fn opaque_ptr_token(&self) -> String {
        strip_leading_underscores(&self.opaque_ptr()).to_string()
    }
}

/// Drop a leading `__` if present.
pub(crate) fn strip_leading_underscores(token: &str) -> &str {
    token.strip_prefix("__").unwrap_or(token)
}

/// Load and parse a `bnd-clib.toml` configuration file.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {}", path.display(), e))?;
    Ok(config)
}
