//! Build orchestration: run the `build` block, then package if asked to

use crate::ast::Project;
use crate::error::Result;
use crate::packager::Packager;
use crate::shell::Shell;
use crate::types::BuildOptions;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The build block ran; the descriptor did not ask for a binary
    CommandsOnly,
    /// A packaged binary was written to this path
    Packaged(PathBuf),
}

/// Run every `build` command in order, then package the source tree when
/// the block carries the bare `build` marker.
///
/// Failing build commands are logged and do not stop the build. Packaging
/// failures are fatal.
pub fn build_project(project: &Project, options: &BuildOptions) -> Result<BuildOutcome> {
    let shell = Shell::new(options.shell.as_deref());
    let layout = &options.layout;

    log::info!("Running {} build command(s)", project.build.len());
    let summary = shell.run_all(project.build.commands(), &layout.work_dir);
    if !summary.all_succeeded() {
        log::warn!(
            "{} of {} build command(s) failed",
            summary.failed,
            summary.executed
        );
    }

    if !project.build.has_build_marker {
        log::info!("No build marker in the build block, skipping packaging");
        return Ok(BuildOutcome::CommandsOnly);
    }

    let artifact = Packager::new(project, layout)
        .with_compiler(options.compiler.as_str())
        .package()?;

    Ok(BuildOutcome::Packaged(artifact))
}
