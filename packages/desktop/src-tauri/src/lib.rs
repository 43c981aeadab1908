// Native window for streamlit-desktop.
// Hosts the local server's URL in a Tauri webview and blocks until the user
// closes it.

use std::path::{Path, PathBuf};

use streamlit_desktop_common::{Error, Result};
use streamlit_desktop_runtime::{WindowRenderer, WindowSpec};
use tauri::webview::DownloadEvent;
use tauri::{WebviewUrl, WebviewWindowBuilder};
use tracing::{info, warn};
use url::Url;

const WINDOW_LABEL: &str = "main";
const FALLBACK_FILE_NAME: &str = "download";

/// `WindowRenderer` backed by a Tauri event loop. One window per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct TauriWindow;

impl TauriWindow {
    pub fn new() -> Self {
        Self
    }
}

impl WindowRenderer for TauriWindow {
    fn open(&self, spec: &WindowSpec) -> Result<()> {
        let url = Url::parse(&spec.url)
            .map_err(|error| Error::Window(format!("invalid server url `{}`: {error}", spec.url)))?;

        let app = tauri::Builder::default()
            .build(tauri::generate_context!())
            .map_err(window_error)?;

        let allow_downloads = spec.allow_downloads;
        WebviewWindowBuilder::new(&app, WINDOW_LABEL, WebviewUrl::External(url))
            .title(&spec.title)
            .inner_size(f64::from(spec.width), f64::from(spec.height))
            .on_download(move |_webview, event| handle_download(event, allow_downloads))
            .build()
            .map_err(window_error)?;

        let code = app.run_return(|_app, _event| {});
        info!(code, "window event loop finished");
        Ok(())
    }
}

fn handle_download(event: DownloadEvent<'_>, allow_downloads: bool) -> bool {
    match event {
        DownloadEvent::Requested { url, destination } => {
            if !allow_downloads {
                warn!(%url, "download blocked; run with --allow-download to enable");
                return false;
            }
            if let Some(dir) = dirs::download_dir() {
                *destination = download_destination(&url, &dir);
            }
            info!(%url, path = %destination.display(), "download started");
            true
        }
        DownloadEvent::Finished { url, path, success } => {
            match path {
                Some(path) if success => info!(%url, path = %path.display(), "download finished"),
                _ => warn!(%url, success, "download did not complete"),
            }
            true
        }
        _ => true,
    }
}

/// Where a download from `url` lands inside `dir`: the last path segment of
/// the URL, or a fixed name when the URL has none.
fn download_destination(url: &Url, dir: &Path) -> PathBuf {
    let name = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .unwrap_or(FALLBACK_FILE_NAME);
    dir.join(name)
}

fn window_error(error: tauri::Error) -> Error {
    Error::WindowBackend(Box::new(error))
}
