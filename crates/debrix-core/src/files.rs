//! Filename classification by extension.

/// Decides whether a provider path is a video or an archive.
pub trait FileClassifier: Send + Sync {
    /// Whether `name` is a playable video.
    fn is_video(&self, name: &str) -> bool;
    /// Whether `name` is an archive.
    fn is_archive(&self, name: &str) -> bool;
}

const VIDEO_EXTENSIONS: &[&str] = &[
    "3g2", "3gp", "avi", "divx", "flv", "m2ts", "m4v", "mk3d", "mkv", "mov", "mp2", "mp4", "mpe",
    "mpeg", "mpg", "mpv", "mts", "ogm", "ogv", "ts", "vob", "webm", "wmv", "xvid",
];

const ARCHIVE_EXTENSIONS: &[&str] = &[
    "7z", "arj", "bz2", "cab", "gz", "iso", "lzh", "rar", "tar", "tgz", "xz", "zip", "zipx",
];

/// Extension-based classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionClassifier;

impl ExtensionClassifier {
    fn extension(name: &str) -> Option<String> {
        let file = name.rsplit(['/', '\\']).next()?;
        let (stem, ext) = file.rsplit_once('.')?;
        (!stem.is_empty()).then(|| ext.to_ascii_lowercase())
    }
}

impl FileClassifier for ExtensionClassifier {
    fn is_video(&self, name: &str) -> bool {
        Self::extension(name).is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
    }

    fn is_archive(&self, name: &str) -> bool {
        Self::extension(name).is_some_and(|ext| {
            ARCHIVE_EXTENSIONS.contains(&ext.as_str()) || is_split_volume(&ext)
        })
    }
}

/// `r00`, `r01`, ... and `001`, `002`, ... volumes.
fn is_split_volume(ext: &str) -> bool {
    let digits = ext.strip_prefix('r').unwrap_or(ext);
    digits.len() >= 2 && digits.len() <= 3 && digits.chars().all(|ch| ch.is_ascii_digit())
}
