use streamlit_desktop_cli::start_desktop_app;
use streamlit_desktop_common::error::ConfigurationError;
use streamlit_desktop_common::{Error, ServerOptions};

#[test]
fn missing_script_fails_before_anything_starts() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let script = dir.path().join("missing.py");

    let err = start_desktop_app(&script, "App", 1024, 768, ServerOptions::new(), false)
        .expect_err("missing script should be rejected");

    assert!(matches!(
        err,
        Error::Configuration(ConfigurationError::ScriptNotFound(path)) if path == script
    ));
}

#[test]
fn zero_window_size_is_a_configuration_error() {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let script = dir.path().join("app.py");
    std::fs::write(&script, "import streamlit as st\n").expect("script written");

    let err = start_desktop_app(&script, "App", 0, 768, ServerOptions::new(), false)
        .expect_err("zero width should be rejected");

    assert!(matches!(
        err,
        Error::Configuration(ConfigurationError::InvalidArgument(_))
    ));
}
