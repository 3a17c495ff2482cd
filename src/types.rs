//! Core constants and build settings for LightPath

use std::path::{Path, PathBuf};

// Descriptor compatibility version. A build file may not require more than this.
pub const TOOL_VERSION: u32 = 1;

// Model limits
pub const MAX_COMMANDS: usize = 100;
pub const MAX_CUSTOM_FUNCTIONS: usize = 10;
pub const MAX_TOKEN_LENGTH: usize = 256;

// Reserved block names
pub const BUILD_FUNCTION: &str = "build";
pub const MAIN_FUNCTION: &str = "main";
pub const RESERVED_FUNCTIONS: &[&str] = &[BUILD_FUNCTION, MAIN_FUNCTION];

// Statement keywords
pub const KEYWORD_COMMAND: &str = "command";
pub const KEYWORD_BUILD_VERSION: &str = "build_version";
pub const KEYWORD_PATH_MODE: &str = "path_mode";
pub const KEYWORD_BUILD_MARKER: &str = "build";

pub const PATH_MODE_APPLICATION: &str = "application";
pub const PATH_MODE_CURRENT: &str = "current";

// Default file names
pub const DEFAULT_DESCRIPTOR: &str = "build.path";
pub const DEFAULT_SOURCE_DIR: &str = "source";
pub const DEFAULT_OUTPUT_NAME: &str = "lightpath_app";
pub const DEFAULT_COMPILER: &str = "cc";
pub const PAYLOAD_FILE: &str = "source_packed.zip";
pub const RUNTIME_SOURCE_FILE: &str = "lightpath_runtime.c";
pub const DATA_SOURCE_FILE: &str = "source_data.c";

// Symbols shared between the runtime stub and the embedded data
pub const DATA_SYMBOL: &str = "source_data";
pub const DATA_LEN_SYMBOL: &str = "source_data_len";

pub fn is_reserved_function(name: &str) -> bool {
    RESERVED_FUNCTIONS.contains(&name)
}

/// Where every file the build reads or writes lives.
///
/// All paths hang off `work_dir`, so a build can run against any directory
/// without changing the process working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    pub work_dir: PathBuf,
    pub source_dir: PathBuf,
    pub output_name: String,
}

impl PackageLayout {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        Self {
            source_dir: work_dir.join(DEFAULT_SOURCE_DIR),
            work_dir,
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
        }
    }

    pub fn with_source_dir(mut self, source_dir: impl AsRef<Path>) -> Self {
        self.source_dir = self.work_dir.join(source_dir);
        self
    }

    pub fn with_output_name(mut self, output_name: impl Into<String>) -> Self {
        self.output_name = output_name.into();
        self
    }

    /// The archive lands one level above the source directory.
    pub fn payload_path(&self) -> PathBuf {
        match self.source_dir.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.join(PAYLOAD_FILE),
            _ => PathBuf::from(PAYLOAD_FILE),
        }
    }

    pub fn runtime_source_path(&self) -> PathBuf {
        self.work_dir.join(RUNTIME_SOURCE_FILE)
    }

    pub fn data_source_path(&self) -> PathBuf {
        self.work_dir.join(DATA_SOURCE_FILE)
    }

    pub fn artifact_path(&self) -> PathBuf {
        self.work_dir.join(&self.output_name)
    }

    pub fn intermediates(&self) -> [PathBuf; 3] {
        [
            self.payload_path(),
            self.runtime_source_path(),
            self.data_source_path(),
        ]
    }
}

impl Default for PackageLayout {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub layout: PackageLayout,

    /// Descriptor file, relative to the working directory
    pub descriptor: PathBuf,

    /// C compiler used to link the runtime stub
    pub compiler: String,

    /// Shell override for running commands (defaults to `/bin/sh`)
    pub shell: Option<String>,
}

impl BuildOptions {
    pub fn descriptor_path(&self) -> PathBuf {
        self.layout.work_dir.join(&self.descriptor)
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            layout: PackageLayout::default(),
            descriptor: PathBuf::from(DEFAULT_DESCRIPTOR),
            compiler: DEFAULT_COMPILER.to_string(),
            shell: None,
        }
    }
}
