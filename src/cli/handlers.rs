// FILE: src/cli/handlers.rs
use super::Invocation;
use crate::{build_project, load_project, run_custom_function, BuildOptions, BuildOutcome, Result};

pub fn dispatch(invocation: Invocation, options: &BuildOptions) -> Result<()> {
    // The descriptor is read before anything else, usage included
    let project = load_project(&options.descriptor_path())?;

    match invocation {
        Invocation::Build => handle_build(&project, options),
        Invocation::Function(name) => handle_function(&project, &name, options),
        Invocation::Usage => {
            print_usage();
            Ok(())
        }
    }
}

fn handle_build(project: &crate::Project, options: &BuildOptions) -> Result<()> {
    match build_project(project, options)? {
        BuildOutcome::CommandsOnly => {}
        BuildOutcome::Packaged(artifact) => {
            println!("Built {}", artifact.display());
        }
    }
    Ok(())
}

fn handle_function(project: &crate::Project, name: &str, options: &BuildOptions) -> Result<()> {
    run_custom_function(project, name, options)?;
    Ok(())
}

fn print_usage() {
    println!("Usage: {} [-c FILE] [-v...] [FUNCTION]", crate::NAME);
    println!("  (no FUNCTION)  run the build block and package the project");
    println!("  FUNCTION       run a custom function from the build file");
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::types::PackageLayout;
    use crate::LightPathError;
    use std::fs;
    use tempfile::TempDir;

    fn options_in(dir: &TempDir) -> BuildOptions {
        BuildOptions {
            layout: PackageLayout::new(dir.path()),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_descriptor_fails_every_invocation() {
        let dir = TempDir::new().unwrap();
        for invocation in [
            Invocation::Build,
            Invocation::Function("x".to_string()),
            Invocation::Usage,
        ] {
            let result = dispatch(invocation, &options_in(&dir));
            assert!(matches!(result, Err(LightPathError::MissingDescriptorFile { .. })));
        }
    }

    #[test]
    fn test_reserved_and_missing_functions_are_distinct() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("build.path"), "main { }").unwrap();

        let reserved = dispatch(Invocation::Function("build".to_string()), &options_in(&dir));
        let missing = dispatch(Invocation::Function("nope".to_string()), &options_in(&dir));

        assert!(matches!(reserved, Err(LightPathError::ReservedFunctionName { .. })));
        assert!(matches!(missing, Err(LightPathError::FunctionNotFound { .. })));
    }

    #[test]
    fn test_usage_runs_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("build.path"), "build { command \"touch ran\" }").unwrap();

        dispatch(Invocation::Usage, &options_in(&dir)).unwrap();

        assert!(!dir.path().join("ran").exists());
    }

    #[test]
    fn test_version_gate_runs_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("build.path"),
            "build { command \"touch ran\" build_version = \"2\" }",
        )
        .unwrap();

        let result = dispatch(Invocation::Build, &options_in(&dir));

        assert!(matches!(result, Err(LightPathError::VersionIncompatibility { .. })));
        assert!(!dir.path().join("ran").exists());
    }
}
