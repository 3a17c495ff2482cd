//! Packaging pipeline: archive, generate, embed, compile
//!
//! The steps run strictly in order and the first failure aborts the rest.
//! Intermediate files are removed on every exit path once the pipeline has
//! started, whether or not a binary came out of it.

use crate::ast::Project;
use crate::codegen::{render_embedded_data, rename_xxd_symbols, RuntimeGenerator};
use crate::error::{LightPathError, Result};
use crate::types::{PackageLayout, DEFAULT_COMPILER};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub struct Packager<'a> {
    project: &'a Project,
    layout: &'a PackageLayout,
    compiler: String,
}

impl<'a> Packager<'a> {
    pub fn new(project: &'a Project, layout: &'a PackageLayout) -> Self {
        Self {
            project,
            layout,
            compiler: DEFAULT_COMPILER.to_string(),
        }
    }

    /// Compiler command line, e.g. `cc` or `gcc -O2`.
    pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
        self.compiler = compiler.into();
        self
    }

    /// Run the whole pipeline and return the path of the packaged binary.
    pub fn package(&self) -> Result<PathBuf> {
        let source_dir = &self.layout.source_dir;
        if !source_dir.is_dir() {
            return Err(LightPathError::MissingSourceDirectory {
                path: source_dir.display().to_string(),
            });
        }

        let _intermediates = Intermediates::new(self.layout.intermediates());

        log::info!("Step 1: archiving {}", source_dir.display());
        let entries = self.archive()?;
        log::debug!("Archived {} entries into {}", entries, self.layout.payload_path().display());

        log::info!("Step 2: generating runtime stub");
        self.generate_runtime()?;

        log::info!("Step 3: embedding payload");
        self.embed_payload()?;

        log::info!("Step 4: compiling with {}", self.compiler);
        self.compile()?;

        let artifact = self.layout.artifact_path();
        log::info!("Packaged {}", artifact.display());
        Ok(artifact)
    }

    fn archive(&self) -> Result<usize> {
        let payload = self.layout.payload_path();
        write_archive(&self.layout.source_dir, &payload).map_err(|e| {
            LightPathError::archive(format!("could not pack {}: {}", self.layout.source_dir.display(), e))
        })
    }

    fn generate_runtime(&self) -> Result<()> {
        let path = self.layout.runtime_source_path();
        let code = RuntimeGenerator::new(&self.project.main).generate();
        fs::write(&path, code).map_err(|e| {
            LightPathError::codegen(format!("cannot create {}: {}", path.display(), e))
        })
    }

    fn embed_payload(&self) -> Result<()> {
        let payload = self.layout.payload_path();
        let data_source = self.layout.data_source_path();

        let data = match run_xxd(&payload) {
            Some(data) => data,
            None => {
                let bytes = fs::read(&payload).map_err(|e| {
                    LightPathError::codegen(format!("cannot read {}: {}", payload.display(), e))
                })?;
                render_embedded_data(&bytes)
            }
        };

        fs::write(&data_source, data).map_err(|e| {
            LightPathError::codegen(format!("cannot create {}: {}", data_source.display(), e))
        })
    }

    fn compile(&self) -> Result<()> {
        let mut parts = self.compiler.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| LightPathError::compile("no C compiler configured"))?;

        let artifact = self.layout.artifact_path();
        let output = process::Command::new(program)
            .args(parts)
            .arg("-o")
            .arg(&artifact)
            .arg(self.layout.runtime_source_path())
            .arg(self.layout.data_source_path())
            .output()
            .map_err(|e| LightPathError::compile(format!("could not run {}: {}", program, e)))?;

        if !output.status.success() {
            if artifact.exists() {
                let _ = fs::remove_file(&artifact);
            }
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LightPathError::compile(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// Zip the contents of `source_dir` into `payload`, paths relative to `source_dir`.
fn write_archive(source_dir: &Path, payload: &Path) -> zip::result::ZipResult<usize> {
    let file = File::create(payload)?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let mut entries = 0;

    for entry in WalkDir::new(source_dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        let mut name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let options = match unix_mode(&entry) {
            Some(mode) => options.unix_permissions(mode),
            None => options,
        };

        if entry.file_type().is_dir() {
            name.push('/');
            writer.add_directory(name, options)?;
        } else {
            writer.start_file(name, options)?;
            let mut input = File::open(entry.path())?;
            io::copy(&mut input, &mut writer)?;
        }
        entries += 1;
    }

    writer.finish()?.flush()?;
    Ok(entries)
}

#[cfg(unix)]
fn unix_mode(entry: &walkdir::DirEntry) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    entry.metadata().ok().map(|m| m.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn unix_mode(_entry: &walkdir::DirEntry) -> Option<u32> {
    None
}

/// Data unit from `xxd -i`, or `None` when xxd is missing or fails.
fn run_xxd(payload: &Path) -> Option<String> {
    let file_name = payload.file_name()?.to_string_lossy().into_owned();
    let dir = match payload.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    match process::Command::new("xxd").arg("-i").arg(&file_name).current_dir(dir).output() {
        Ok(output) if output.status.success() => {
            log::debug!("Embedding payload with xxd");
            let text = String::from_utf8_lossy(&output.stdout);
            Some(rename_xxd_symbols(&text, &file_name))
        }
        Ok(output) => {
            log::debug!("xxd exited with {}, emitting data unit directly", output.status);
            None
        }
        Err(e) => {
            log::debug!("xxd unavailable ({}), emitting data unit directly", e);
            None
        }
    }
}

/// Removes the pipeline's transient files when dropped.
struct Intermediates {
    paths: Vec<PathBuf>,
}

impl Intermediates {
    fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }
}

impl Drop for Intermediates {
    fn drop(&mut self) {
        for path in &self.paths {
            match fs::remove_file(path) {
                Ok(()) => log::debug!("Removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("Could not remove {}: {}", path.display(), e),
            }
        }
    }
}
