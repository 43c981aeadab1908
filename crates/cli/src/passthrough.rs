// Passthrough flag groups.
//
//   streamlit-desktop app.py --title T --streamlit-options --theme.base dark
//                                      ^ everything after a marker, up to the
//                                        next marker, is forwarded verbatim
//
// Splitting happens before clap sees argv so forwarded flags are never
// interpreted or rejected as unknown.

use std::ffi::OsString;

pub const STREAMLIT_OPTIONS: &str = "--streamlit-options";
pub const PYINSTALLER_OPTIONS: &str = "--pyinstaller-options";

/// Raw flags collected from the passthrough groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Passthrough {
    pub streamlit_options: Vec<String>,
    pub pyinstaller_options: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Group {
    Head,
    Streamlit,
    Pyinstaller,
}

/// Split argv into the arguments clap parses and the passthrough groups.
///
/// A marker may appear more than once; its groups are concatenated in order.
pub fn split_args<I, T>(args: I) -> (Vec<OsString>, Passthrough)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut head = Vec::new();
    let mut passthrough = Passthrough::default();
    let mut group = Group::Head;

    for arg in args {
        let arg: OsString = arg.into();
        if arg == STREAMLIT_OPTIONS {
            group = Group::Streamlit;
            continue;
        }
        if arg == PYINSTALLER_OPTIONS {
            group = Group::Pyinstaller;
            continue;
        }
        match group {
            Group::Head => head.push(arg),
            Group::Streamlit => passthrough
                .streamlit_options
                .push(arg.to_string_lossy().into_owned()),
            Group::Pyinstaller => passthrough
                .pyinstaller_options
                .push(arg.to_string_lossy().into_owned()),
        }
    }

    (head, passthrough)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head_strings(head: &[OsString]) -> Vec<&str> {
        head.iter().map(|arg| arg.to_str().unwrap()).collect()
    }

    #[test]
    fn no_markers_leaves_argv_untouched() {
        let (head, passthrough) = split_args(["streamlit-desktop", "app.py", "--title", "T"]);
        assert_eq!(head_strings(&head), vec!["streamlit-desktop", "app.py", "--title", "T"]);
        assert_eq!(passthrough, Passthrough::default());
    }

    #[test]
    fn groups_are_forwarded_verbatim_and_in_order() {
        let (head, passthrough) = split_args([
            "streamlit-desktop",
            "build",
            "app.py",
            "--name",
            "App",
            "--pyinstaller-options",
            "--onefile",
            "--name",
            "Other",
            "--streamlit-options",
            "--theme.base",
            "dark",
            "--title",
        ]);

        assert_eq!(
            head_strings(&head),
            vec!["streamlit-desktop", "build", "app.py", "--name", "App"]
        );
        assert_eq!(
            passthrough.pyinstaller_options,
            vec!["--onefile", "--name", "Other"]
        );
        assert_eq!(
            passthrough.streamlit_options,
            vec!["--theme.base", "dark", "--title"]
        );
    }

    #[test]
    fn repeated_markers_concatenate() {
        let (_, passthrough) = split_args([
            "streamlit-desktop",
            "--streamlit-options",
            "--a=1",
            "--pyinstaller-options",
            "--clean",
            "--streamlit-options",
            "--b=2",
        ]);
        assert_eq!(passthrough.streamlit_options, vec!["--a=1", "--b=2"]);
        assert_eq!(passthrough.pyinstaller_options, vec!["--clean"]);
    }

    #[test]
    fn empty_group_is_allowed() {
        let (head, passthrough) = split_args(["streamlit-desktop", "app.py", "--streamlit-options"]);
        assert_eq!(head_strings(&head), vec!["streamlit-desktop", "app.py"]);
        assert!(passthrough.streamlit_options.is_empty());
    }
}
