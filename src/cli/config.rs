// FILE: src/cli/config.rs

use crate::error::{LightPathError, Result};
use crate::types::{BuildOptions, PackageLayout, DEFAULT_COMPILER};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub descriptor: Option<String>,
    pub source_dir: Option<String>,
    pub output_name: Option<String>,
    pub compiler: Option<String>,
    pub shell: Option<String>,
}

pub fn load(config_path: &str) -> Result<ConfigFile> {
    let config_content = fs::read_to_string(config_path).map_err(|e| {
        LightPathError::InvalidFormat {
            message: format!("Config file {}: {}", config_path, e),
        }
    })?;
    log::info!("Loaded configuration from {}", config_path);

    if config_path.ends_with(".json") {
        serde_json::from_str(&config_content).map_err(|e| LightPathError::InvalidFormat {
            message: format!("Invalid JSON config: {}", e),
        })
    } else if config_path.ends_with(".toml") {
        toml::from_str(&config_content).map_err(|e| LightPathError::InvalidFormat {
            message: format!("Invalid TOML config: {}", e),
        })
    } else {
        Err(LightPathError::InvalidFormat {
            message: "Config file must be .json or .toml format".to_string(),
        })
    }
}

impl ConfigFile {
    /// Resolve settings rooted at `work_dir`. `cc_env` is the value of `CC`,
    /// used when the config names no compiler.
    pub fn build_options(&self, work_dir: &Path, cc_env: Option<String>) -> BuildOptions {
        let mut layout = PackageLayout::new(work_dir);
        if let Some(source_dir) = &self.source_dir {
            layout = layout.with_source_dir(source_dir);
        }
        if let Some(output_name) = &self.output_name {
            layout = layout.with_output_name(output_name.as_str());
        }

        let compiler = self
            .compiler
            .clone()
            .or(cc_env.filter(|cc| !cc.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_COMPILER.to_string());

        let mut options = BuildOptions {
            layout,
            compiler,
            shell: self.shell.clone(),
            ..Default::default()
        };
        if let Some(descriptor) = &self.descriptor {
            options.descriptor = PathBuf::from(descriptor);
        }
        options
    }
}
