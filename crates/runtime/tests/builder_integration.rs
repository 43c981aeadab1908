#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use streamlit_desktop_common::error::{BuildError, ConfigurationError};
use streamlit_desktop_common::Error;
use streamlit_desktop_runtime::{build, BuildConfig, PackagerCommand};
use tempfile::TempDir;

/// Scratch project with a script and a fake PyInstaller that records its
/// arguments and a copy of the entry script, then exits with `exit_code`.
struct Project {
    dir: TempDir,
    script: PathBuf,
    tool: PathBuf,
}

impl Project {
    fn new(exit_code: i32) -> Self {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let script = dir.path().join("dashboard.py");
        fs::write(
            &script,
            "import streamlit as st\nfrom pandas import DataFrame\n\nst.write(DataFrame())\n",
        )
        .expect("script written");

        let tool = dir.path().join("fake-pyinstaller");
        fs::write(
            &tool,
            format!(
                "#!/bin/sh\n\
                 here=\"$(dirname \"$0\")\"\n\
                 printf '%s\\n' \"$@\" > \"$here/args.txt\"\n\
                 for last; do :; done\n\
                 cp \"$last\" \"$here/entry_copy.py\"\n\
                 exit {exit_code}\n"
            ),
        )
        .expect("tool written");
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).expect("tool executable");
        fs::create_dir(dir.path().join("entries")).expect("entries dir created");

        Self { dir, script, tool }
    }

    fn config(&self) -> BuildConfig {
        let mut config = BuildConfig::new(&self.script, "Dashboard");
        config.packager = PackagerCommand::new(&self.tool);
        config.launcher_binary = Some(self.dir.path().join("streamlit-desktop"));
        config.entry_dir = Some(self.entries_dir());
        config
    }

    fn entries_dir(&self) -> PathBuf {
        self.dir.path().join("entries")
    }

    fn recorded_args(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("args.txt"))
            .expect("tool should have recorded its arguments")
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn entry_copy(&self) -> String {
        fs::read_to_string(self.dir.path().join("entry_copy.py"))
            .expect("tool should have copied the entry script")
    }
}

fn is_empty_dir(path: &Path) -> bool {
    fs::read_dir(path).expect("dir readable").next().is_none()
}

#[test]
fn downloads_build_injects_option_and_removes_entry_script() {
    let project = Project::new(0);
    let mut config = project.config();
    config.allow_downloads = true;

    let output = build(&config).expect("build should succeed");

    assert!(output.ends_with(Path::new("Dashboard").join("Dashboard")));
    let entry = project.entry_copy();
    assert!(entry.contains("--server.enableStaticServing=true"));
    assert!(entry.contains(r#"LAUNCHER_FLAGS = ["--allow-download"]"#));
    assert!(entry.contains(r#"TITLE = "Dashboard""#));
    assert!(entry.contains(r#"SCRIPT_NAME = "dashboard.py""#));

    let entry_path = PathBuf::from(project.recorded_args().last().expect("entry arg"));
    assert!(entry_path.starts_with(project.entries_dir()));
    assert!(!entry_path.exists());
    assert!(is_empty_dir(&project.entries_dir()));
}

#[test]
fn failing_tool_surfaces_exit_code_and_still_cleans_up() {
    let project = Project::new(3);
    let mut config = project.config();
    config.allow_downloads = true;

    let err = build(&config).expect_err("build should fail");

    assert!(matches!(
        err,
        Error::Build(BuildError::ToolFailed { code: 3, .. })
    ));
    assert_eq!(err.tool_exit_code(), Some(3));
    assert!(project.entry_copy().contains("server.enableStaticServing"));
    assert!(is_empty_dir(&project.entries_dir()));
}

#[test]
fn missing_script_fails_before_running_tool() {
    let project = Project::new(0);
    let mut config = project.config();
    config.script = project.dir.path().join("missing.py");

    let err = build(&config).expect_err("build should fail");

    assert!(matches!(
        err,
        Error::Configuration(ConfigurationError::ScriptNotFound(_))
    ));
    assert!(!project.dir.path().join("args.txt").exists());
    assert!(is_empty_dir(&project.entries_dir()));
}

#[test]
fn missing_tool_is_spawn_error() {
    let project = Project::new(0);
    let mut config = project.config();
    config.packager = PackagerCommand::new(project.dir.path().join("no-such-tool"));

    let err = build(&config).expect_err("build should fail");

    assert!(matches!(err, Error::Build(BuildError::Spawn { .. })));
    assert!(is_empty_dir(&project.entries_dir()));
}

#[test]
fn forwards_user_flags_verbatim_after_generated_flags() {
    let project = Project::new(0);
    let mut config = project.config();
    config.pyinstaller_options = vec![
        "--onefile".into(),
        "--clean".into(),
        "--name".into(),
        "Override".into(),
    ];

    let output = build(&config).expect("build should succeed");

    let args = project.recorded_args();
    let user_start = args.len() - 5;
    assert_eq!(
        &args[user_start..args.len() - 1],
        &["--onefile", "--clean", "--name", "Override"]
    );
    assert_eq!(&args[..2], &["--name", "Dashboard"]);
    assert!(output.ends_with(format!("Dashboard{}", std::env::consts::EXE_SUFFIX)));
}

#[test]
fn bundles_script_launcher_and_hidden_imports() {
    let project = Project::new(0);

    build(&project.config()).expect("build should succeed");

    let args = project.recorded_args();
    let script = project.script.to_string_lossy().into_owned();
    let launcher = project.dir.path().join("streamlit-desktop");
    let pairs: Vec<(&str, &str)> = args
        .windows(2)
        .map(|pair| (pair[0].as_str(), pair[1].as_str()))
        .collect();

    assert!(pairs.contains(&("--add-data", format!("{script}:.").as_str())));
    assert!(pairs.contains(&(
        "--add-binary",
        format!("{}:.", launcher.display()).as_str()
    )));
    assert!(pairs.contains(&("--collect-all", "streamlit")));
    assert!(pairs.contains(&("--copy-metadata", "streamlit")));
    assert!(pairs.contains(&("--hidden-import", "streamlit")));
    assert!(pairs.contains(&("--hidden-import", "pandas.DataFrame")));
    assert!(!args.contains(&"-i".to_string()));
}
