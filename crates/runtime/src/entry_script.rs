// Generated Python entry point packaged by PyInstaller as the program's main module.
//
// The bundled executable runs in two modes:
//   <exe>                 hand off to the bundled launcher binary, which opens the window
//   <exe> --serve ARGS    run `streamlit run ARGS` in-process (the launcher's server command)

use std::io::Write;
use std::path::Path;

use streamlit_desktop_common::error::BuildError;
use streamlit_desktop_common::options::SERVER_STATIC_SERVING;
use tempfile::NamedTempFile;

/// Argument that switches the bundled executable into server mode.
pub const SERVE_FLAG: &str = "--serve";

const ENTRY_PREFIX: &str = "streamlit_desktop_entry_";

/// Values substituted into the entry script.
#[derive(Debug, Clone)]
pub struct EntryScript {
    /// File name of the user's script inside the bundle.
    pub script_name: String,
    /// File name of the launcher binary inside the bundle.
    pub launcher_name: String,
    pub title: String,
    /// Raw Streamlit flags forwarded to the launcher.
    pub streamlit_options: Vec<String>,
    pub allow_downloads: bool,
}

impl EntryScript {
    /// Streamlit flags baked into the executable, including the
    /// download-enabling option when downloads are allowed.
    pub fn baked_options(&self) -> Vec<String> {
        let mut options = self.streamlit_options.clone();
        if self.allow_downloads {
            options.push(format!("--{SERVER_STATIC_SERVING}=true"));
        }
        options
    }

    pub fn render(&self) -> String {
        let launcher_flags = if self.allow_downloads {
            r#"["--allow-download"]"#
        } else {
            "[]"
        };

        format!(
            r#"import os
import subprocess
import sys

SCRIPT_NAME = {script_name}
LAUNCHER_NAME = {launcher_name}
TITLE = {title}
STREAMLIT_OPTIONS = {options}
LAUNCHER_FLAGS = {launcher_flags}
SERVE_FLAG = {serve_flag}

# Avoid font cache generation on every start.
if "MPLCONFIGDIR" in os.environ:
    del os.environ["MPLCONFIGDIR"]


def bundle_dir():
    if hasattr(sys, "_MEIPASS"):
        return sys._MEIPASS
    return os.path.dirname(sys.executable)


def serve(args):
    from streamlit.web import cli as stcli

    sys.argv = ["streamlit", "run", *args]
    sys.exit(stcli.main())


def main():
    if len(sys.argv) > 1 and sys.argv[1] == SERVE_FLAG:
        serve(sys.argv[2:])

    if "_PYI_SPLASH_IPC" in os.environ:
        import pyi_splash

        pyi_splash.close()

    command = [
        os.path.join(bundle_dir(), LAUNCHER_NAME),
        "run",
        os.path.join(bundle_dir(), SCRIPT_NAME),
        "--title=" + TITLE,
        "--server-program",
        sys.executable,
        "--server-arg=" + SERVE_FLAG,
        *LAUNCHER_FLAGS,
    ]
    if STREAMLIT_OPTIONS:
        command += ["--streamlit-options", *STREAMLIT_OPTIONS]
    sys.exit(subprocess.call(command))


if __name__ == "__main__":
    main()
"#,
            script_name = python_literal(&self.script_name),
            launcher_name = python_literal(&self.launcher_name),
            title = python_literal(&self.title),
            options = python_literal(&self.baked_options()),
            launcher_flags = launcher_flags,
            serve_flag = python_literal(SERVE_FLAG),
        )
    }

    /// Write the script to a temporary `.py` file. The file is removed when
    /// the returned handle is dropped or closed.
    pub fn write_temp(&self) -> Result<NamedTempFile, BuildError> {
        self.write_temp_in(&std::env::temp_dir())
    }

    pub fn write_temp_in(&self, dir: &Path) -> Result<NamedTempFile, BuildError> {
        let mut file = tempfile::Builder::new()
            .prefix(ENTRY_PREFIX)
            .suffix(".py")
            .tempfile_in(dir)
            .map_err(BuildError::EntryScript)?;
        file.write_all(self.render().as_bytes())
            .and_then(|()| file.flush())
            .map_err(BuildError::EntryScript)?;
        Ok(file)
    }
}

/// File name component of `path`, lossily converted.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

// JSON strings and string arrays are valid Python literals.
fn python_literal<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "None".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(allow_downloads: bool) -> EntryScript {
        EntryScript {
            script_name: "app.py".into(),
            launcher_name: "streamlit-desktop".into(),
            title: "Sales \"Q3\"".into(),
            streamlit_options: vec!["--theme.base".into(), "dark".into()],
            allow_downloads,
        }
    }

    #[test]
    fn embeds_names_title_and_options_as_literals() {
        let text = sample(false).render();
        assert!(text.contains(r#"SCRIPT_NAME = "app.py""#));
        assert!(text.contains(r#"LAUNCHER_NAME = "streamlit-desktop""#));
        assert!(text.contains(r#"TITLE = "Sales \"Q3\"""#));
        assert!(text.contains(r#"STREAMLIT_OPTIONS = ["--theme.base","dark"]"#));
        assert!(text.contains("LAUNCHER_FLAGS = []"));
        assert!(!text.contains(SERVER_STATIC_SERVING));
    }

    #[test]
    fn title_is_attached_to_its_flag() {
        // A title starting with '-' must not be read as a separate flag.
        let text = sample(false).render();
        assert!(text.contains(r#""--title=" + TITLE,"#));
        assert!(!text.contains("\"--title\",\n"));
    }

    #[test]
    fn downloads_add_static_serving_and_launcher_flag() {
        let text = sample(true).render();
        assert!(text.contains(r#""--server.enableStaticServing=true""#));
        assert!(text.contains(r#"LAUNCHER_FLAGS = ["--allow-download"]"#));
    }

    #[test]
    fn serve_mode_runs_streamlit_cli() {
        let text = sample(false).render();
        assert!(text.contains(r#"SERVE_FLAG = "--serve""#));
        assert!(text.contains(r#"sys.argv = ["streamlit", "run", *args]"#));
        assert!(text.contains("pyi_splash.close()"));
        assert!(text.contains(r#"del os.environ["MPLCONFIGDIR"]"#));
    }

    #[test]
    fn temp_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let file = sample(true).write_temp_in(dir.path()).unwrap();
        let path = file.path().to_path_buf();

        assert!(path.extension().is_some_and(|ext| ext == "py"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains(SERVER_STATIC_SERVING));

        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn file_name_takes_last_component() {
        assert_eq!(file_name(Path::new("/tmp/project/app.py")), "app.py");
    }
}
