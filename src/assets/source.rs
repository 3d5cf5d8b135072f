use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Resolved location of an asset's media.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum MediaSource {
    /// Local file.
    Path(PathBuf),
    /// Anything with a `scheme://` prefix; handed to ffmpeg untouched.
    Uri(String),
}

impl MediaSource {
    /// Resolve a clip's `src` against `assets_root`. Absolute paths and URIs are kept as-is.
    pub fn resolve(src: &str, assets_root: &Path) -> Self {
        if is_uri(src) {
            return Self::Uri(src.to_string());
        }
        let p = Path::new(src);
        if p.is_absolute() {
            Self::Path(p.to_path_buf())
        } else {
            Self::Path(assets_root.join(p))
        }
    }

    /// Argument form for ffmpeg/ffprobe `-i`.
    pub fn to_arg(&self) -> OsString {
        match self {
            Self::Path(p) => p.as_os_str().to_os_string(),
            Self::Uri(u) => OsString::from(u),
        }
    }

    /// Local path, if this is a file.
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Path(p) => Some(p),
            Self::Uri(_) => None,
        }
    }
}

impl std::fmt::Display for MediaSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Uri(u) => f.write_str(u),
        }
    }
}

fn is_uri(src: &str) -> bool {
    match src.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
