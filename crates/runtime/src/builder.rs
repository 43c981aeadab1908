// Standalone executable builder: drives PyInstaller over a generated entry script.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use streamlit_desktop_common::config::PackagerSettings;
use streamlit_desktop_common::error::{BuildError, ConfigurationError, Result};
use tracing::{debug, info, warn};

use crate::entry_script::{file_name, EntryScript};
use crate::imports::extract_imports;

/// Assets and metadata PyInstaller cannot discover on its own.
const COLLECT_FLAGS: &[&str] = &[
    "--paths",
    ".",
    "--collect-all",
    "streamlit",
    "--copy-metadata",
    "streamlit",
];

/// `SOURCE:DEST` separator for `--add-data` / `--add-binary`.
const DATA_SEPARATOR: &str = ":";
const DEFAULT_DIST_DIR: &str = "dist";

/// Program and leading arguments used to run PyInstaller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagerCommand {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl Default for PackagerCommand {
    fn default() -> Self {
        Self::from(&PackagerSettings::default())
    }
}

impl From<&PackagerSettings> for PackagerCommand {
    fn from(settings: &PackagerSettings) -> Self {
        Self {
            program: OsString::from(&settings.program),
            args: settings.args.iter().map(OsString::from).collect(),
        }
    }
}

impl PackagerCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub script: PathBuf,
    /// Name of the output executable, also used as the window title.
    pub name: String,
    pub icon: Option<PathBuf>,
    /// Raw PyInstaller flags, appended after the generated ones.
    pub pyinstaller_options: Vec<String>,
    /// Raw Streamlit flags baked into the executable.
    pub streamlit_options: Vec<String>,
    pub allow_downloads: bool,
    pub packager: PackagerCommand,
    /// Launcher binary to bundle. Defaults to the running executable.
    pub launcher_binary: Option<PathBuf>,
    /// Where the entry script is generated. Defaults to the system temp dir.
    pub entry_dir: Option<PathBuf>,
}

impl BuildConfig {
    pub fn new(script: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            name: name.into(),
            icon: None,
            pyinstaller_options: Vec::new(),
            streamlit_options: Vec::new(),
            allow_downloads: false,
            packager: PackagerCommand::default(),
            launcher_binary: None,
            entry_dir: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.script.exists() {
            return Err(ConfigurationError::ScriptNotFound(self.script.clone()).into());
        }
        if self.name.trim().is_empty() {
            return Err(
                ConfigurationError::InvalidArgument("--name must not be empty".into()).into(),
            );
        }
        if let Some(icon) = &self.icon {
            if !icon.exists() {
                return Err(ConfigurationError::IconNotFound(icon.clone()).into());
            }
        }
        Ok(())
    }
}

/// Resolved inputs for one PyInstaller invocation.
#[derive(Debug, Clone)]
pub struct PackagingPlan {
    pub name: String,
    pub script: PathBuf,
    pub launcher: PathBuf,
    pub icon: Option<PathBuf>,
    pub hidden_imports: Vec<String>,
    pub extra_flags: Vec<String>,
    pub entry_script: PathBuf,
}

impl PackagingPlan {
    /// PyInstaller arguments: generated flags, then user flags verbatim, then
    /// the entry script.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--name".into(), self.name.clone().into()];
        args.extend(COLLECT_FLAGS.iter().map(OsString::from));
        args.push("--add-data".into());
        args.push(bundle_spec(&self.script));
        args.push("--add-binary".into());
        args.push(bundle_spec(&self.launcher));

        if let Some(icon) = &self.icon {
            args.push("-i".into());
            args.push(icon.clone().into_os_string());
        }
        for module in &self.hidden_imports {
            args.push("--hidden-import".into());
            args.push(module.into());
        }
        args.extend(self.extra_flags.iter().map(OsString::from));
        args.push(self.entry_script.clone().into_os_string());
        args
    }
}

/// Build a standalone executable for `config.script` and return its path.
pub fn build(config: &BuildConfig) -> Result<PathBuf> {
    config.validate()?;

    let script = absolute(&config.script)?;
    let icon = config.icon.as_deref().map(absolute).transpose()?;
    let launcher = match &config.launcher_binary {
        Some(path) => path.clone(),
        None => std::env::current_exe().map_err(BuildError::LauncherBinary)?,
    };

    let source =
        fs::read_to_string(&script).map_err(|source| ConfigurationError::ScriptUnreadable {
            path: script.clone(),
            source,
        })?;
    let hidden_imports = extract_imports(&source);
    debug!(count = hidden_imports.len(), "collected hidden imports");

    let entry = EntryScript {
        script_name: file_name(&script),
        launcher_name: file_name(&launcher),
        title: config.name.clone(),
        streamlit_options: config.streamlit_options.clone(),
        allow_downloads: config.allow_downloads,
    };
    let entry_file = match &config.entry_dir {
        Some(dir) => entry.write_temp_in(dir)?,
        None => entry.write_temp()?,
    };
    info!(path = %entry_file.path().display(), "generated entry script");

    let plan = PackagingPlan {
        name: config.name.clone(),
        script,
        launcher,
        icon,
        hidden_imports,
        extra_flags: config.pyinstaller_options.clone(),
        entry_script: entry_file.path().to_path_buf(),
    };
    let result = run_packager(&config.packager, &plan.args());

    let entry_path = entry_file.path().to_path_buf();
    if let Err(error) = entry_file.close() {
        warn!(path = %entry_path.display(), %error, "failed to remove entry script");
    }
    result?;

    let output = built_executable_path(&config.name, &config.pyinstaller_options);
    info!(path = %output.display(), "build finished");
    Ok(output)
}

fn run_packager(packager: &PackagerCommand, args: &[OsString]) -> Result<(), BuildError> {
    let program = packager.program.to_string_lossy().into_owned();
    info!(%program, "running packaging tool");
    debug!(args = ?args, "packaging tool arguments");

    // Output is streamed to the terminal; PyInstaller may prompt on stdin.
    let status = Command::new(&packager.program)
        .args(&packager.args)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|source| BuildError::Spawn {
            program: program.clone(),
            source,
        })?;

    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(BuildError::ToolFailed { program, code }),
        None => Err(BuildError::ToolTerminated { program, status }),
    }
}

/// Where PyInstaller puts the executable, honoring `--distpath` and
/// `--onefile`/`--onedir` in the forwarded flags (last occurrence wins).
pub fn built_executable_path(name: &str, pyinstaller_options: &[String]) -> PathBuf {
    let mut dist = PathBuf::from(DEFAULT_DIST_DIR);
    let mut onefile = false;

    let mut flags = pyinstaller_options.iter();
    while let Some(flag) = flags.next() {
        match flag.as_str() {
            "--onefile" | "-F" => onefile = true,
            "--onedir" | "-D" => onefile = false,
            "--distpath" => {
                if let Some(value) = flags.next() {
                    dist = PathBuf::from(value);
                }
            }
            other => {
                if let Some(value) = other.strip_prefix("--distpath=") {
                    dist = PathBuf::from(value);
                }
            }
        }
    }

    let executable = format!("{name}{}", std::env::consts::EXE_SUFFIX);
    if onefile {
        dist.join(executable)
    } else {
        dist.join(name).join(executable)
    }
}

fn bundle_spec(source: &Path) -> OsString {
    let mut spec = source.as_os_str().to_os_string();
    spec.push(DATA_SEPARATOR);
    spec.push(".");
    spec
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|error| {
        ConfigurationError::InvalidArgument(format!("cannot resolve `{}`: {error}", path.display()))
            .into()
    })
}
