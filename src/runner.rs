//! Running custom functions by name

use crate::ast::Project;
use crate::error::{LightPathError, Result};
use crate::shell::{RunSummary, Shell};
use crate::types::{is_reserved_function, BuildOptions, PATH_MODE_CURRENT};

/// Run the first custom block called `name` in the invoking directory.
///
/// `build` and `main` are refused outright. Commands run to completion in
/// declaration order whatever their exit status.
pub fn run_custom_function(project: &Project, name: &str, options: &BuildOptions) -> Result<RunSummary> {
    if is_reserved_function(name) {
        return Err(LightPathError::ReservedFunctionName {
            name: name.to_string(),
        });
    }

    let block = project
        .find_custom(name)
        .ok_or_else(|| LightPathError::FunctionNotFound {
            name: name.to_string(),
        })?;

    let shell = Shell::new(options.shell.as_deref());
    let cwd = &options.layout.work_dir;
    let mut summary = RunSummary::default();

    log::info!("Running function '{}' ({} command(s))", name, block.len());
    for command in block.commands() {
        // Unlike the packaged runtime, no path mode changes directory here.
        if command.path_mode().as_str() == PATH_MODE_CURRENT {
            log::debug!("`{}`: current path mode, running in {}", command.text(), cwd.display());
        } else {
            log::debug!(
                "`{}`: path mode '{}' runs like application, in {}",
                command.text(),
                command.path_mode(),
                cwd.display()
            );
        }

        let step = shell.run_all(std::iter::once(command), cwd);
        summary.executed += step.executed;
        summary.failed += step.failed;
    }

    if !summary.all_succeeded() {
        log::warn!(
            "{} of {} command(s) in '{}' failed",
            summary.failed,
            summary.executed,
            name
        );
    }

    Ok(summary)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::types::PackageLayout;
    use std::fs;
    use tempfile::TempDir;

    fn setup(source: &str) -> (TempDir, Project, BuildOptions) {
        let dir = TempDir::new().unwrap();
        let project = Parser::from_source(source, "build.path").parse().unwrap();
        let options = BuildOptions {
            layout: PackageLayout::new(dir.path()),
            ..Default::default()
        };
        (dir, project, options)
    }

    #[test]
    fn test_runs_named_function() {
        let (dir, project, options) = setup(r#"greet { command "echo hello > greeting" }"#);

        let summary = run_custom_function(&project, "greet", &options).unwrap();

        assert_eq!(summary, RunSummary { executed: 1, failed: 0 });
        assert_eq!(fs::read_to_string(dir.path().join("greeting")).unwrap(), "hello\n");
    }

    #[test]
    fn test_reserved_names_are_refused() {
        let (dir, project, options) = setup(r#"build { command "touch built" } main { }"#);

        for name in ["build", "main"] {
            let result = run_custom_function(&project, name, &options);
            assert!(matches!(result, Err(LightPathError::ReservedFunctionName { .. })));
        }
        assert!(!dir.path().join("built").exists());
    }

    #[test]
    fn test_unknown_function_is_not_found() {
        let (_dir, project, options) = setup(r#"greet { }"#);

        let result = run_custom_function(&project, "deploy", &options);

        match result {
            Err(LightPathError::FunctionNotFound { name }) => assert_eq!(name, "deploy"),
            other => panic!("Expected FunctionNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_name_match_is_exact() {
        let (_dir, project, options) = setup(r#"Deploy { }"#);
        assert!(run_custom_function(&project, "deploy", &options).is_err());
        assert!(run_custom_function(&project, "Deploy", &options).is_ok());
    }

    #[test]
    fn test_path_mode_does_not_change_directory() {
        let (dir, project, options) = setup(
            r#"where {
                command "pwd > app_mode"
                path_mode = "current"
                command "pwd > current_mode"
            }"#,
        );

        run_custom_function(&project, "where", &options).unwrap();

        let app = fs::read_to_string(dir.path().join("app_mode")).unwrap();
        let current = fs::read_to_string(dir.path().join("current_mode")).unwrap();
        assert_eq!(app, current);
    }

    #[test]
    fn test_failures_do_not_stop_the_function() {
        let (dir, project, options) = setup(
            r#"flaky {
                command "false"
                command "touch after"
            }"#,
        );

        let summary = run_custom_function(&project, "flaky", &options).unwrap();

        assert_eq!(summary.failed, 1);
        assert!(dir.path().join("after").exists());
    }

    #[test]
    fn test_first_duplicate_runs() {
        let (dir, project, options) = setup(
            r#"
            deploy { command "touch first" }
            deploy { command "touch second" }
            "#,
        );

        run_custom_function(&project, "deploy", &options).unwrap();

        assert!(dir.path().join("first").exists());
        assert!(!dir.path().join("second").exists());
    }
}
