// `streamlit-desktop build <script> --name NAME`: package a standalone executable.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use streamlit_desktop_common::config::Settings;
use streamlit_desktop_runtime::{build, BuildConfig, PackagerCommand};

use crate::passthrough::Passthrough;

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Streamlit script to package
    pub script: PathBuf,

    /// Name of the executable (also its window title)
    #[arg(long)]
    pub name: String,

    /// Icon file for the executable
    #[arg(long)]
    pub icon: Option<PathBuf>,

    /// Let the packaged app save files offered for download
    #[arg(long = "allow-download")]
    pub allow_download: bool,
}

pub fn run(args: BuildArgs, passthrough: Passthrough) -> anyhow::Result<()> {
    let settings = Settings::load()?.with_env_overrides();
    let config = build_config(args, passthrough, &settings);

    let executable = build(&config)
        .with_context(|| format!("failed to build {}", config.script.display()))?;
    println!("Built {}", executable.display());
    Ok(())
}

pub fn build_config(args: BuildArgs, passthrough: Passthrough, settings: &Settings) -> BuildConfig {
    let mut config = BuildConfig::new(args.script, args.name);
    config.icon = args.icon;
    config.allow_downloads = args.allow_download;
    config.pyinstaller_options = passthrough.pyinstaller_options;
    config.streamlit_options = passthrough.streamlit_options;
    config.packager = PackagerCommand::from(&settings.packager);
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn passthrough_groups_land_in_their_lists() {
        let args = BuildArgs {
            script: PathBuf::from("app.py"),
            name: "Sales".into(),
            icon: Some(PathBuf::from("icon.ico")),
            allow_download: true,
        };
        let passthrough = Passthrough {
            streamlit_options: vec!["--theme.base".into(), "dark".into()],
            pyinstaller_options: vec!["--onefile".into(), "--clean".into()],
        };
        let mut settings = Settings::default();
        settings.packager.program = "python3".into();
        settings.packager.args = vec!["-m".into(), "PyInstaller".into()];

        let config = build_config(args, passthrough, &settings);

        assert_eq!(config.name, "Sales");
        assert_eq!(config.icon, Some(PathBuf::from("icon.ico")));
        assert!(config.allow_downloads);
        assert_eq!(config.pyinstaller_options, vec!["--onefile", "--clean"]);
        assert_eq!(config.streamlit_options, vec!["--theme.base", "dark"]);
        assert_eq!(config.packager.program, "python3");
        assert_eq!(
            config.packager.args,
            vec![OsString::from("-m"), OsString::from("PyInstaller")]
        );
        assert_eq!(config.launcher_binary, None);
    }
}
