// streamlit-desktop-common: shared types for the launcher, the builder, and the CLI.

pub mod config;
pub mod error;
pub mod options;

pub use error::{Error, Result};
pub use options::{OptionValue, ServerOptions};
