// streamlit-desktop-runtime: server lifecycle, desktop launcher, and executable builder.

pub mod builder;
pub mod entry_script;
pub mod imports;
pub mod launcher;
pub mod port;
pub mod readiness;
pub mod server;

pub use builder::{build, BuildConfig, PackagerCommand};
pub use launcher::{launch, LaunchConfig, LaunchOutcome, WindowRenderer, WindowSpec};
pub use server::{ServerCommand, ServerHandle};
