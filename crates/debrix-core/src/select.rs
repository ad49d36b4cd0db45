//! Target file selection over a provider file list.

use crate::files::FileClassifier;
use crate::model::ResolvedFile;

/// Result of [`select_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSelection<'a> {
    /// The file to stream.
    Selected(&'a ResolvedFile),
    /// No video, and every file is an archive.
    ArchiveOnly,
    /// Nothing suitable.
    NoMatch,
}

/// Pick the file to stream.
///
/// With a `file_index`, the video whose normalized path equals
/// `target_filename` wins. Without one, the largest video wins and ties keep
/// the earliest file. When no video qualifies the result is `ArchiveOnly` if
/// every file is an archive, `NoMatch` otherwise.
#[must_use]
pub fn select_file<'a>(
    files: &'a [ResolvedFile],
    file_index: Option<u32>,
    target_filename: Option<&str>,
    classifier: &dyn FileClassifier,
) -> FileSelection<'a> {
    let mut videos = files.iter().filter(|file| classifier.is_video(&file.path));

    let chosen = match file_index {
        Some(_) => target_filename.map(normalize).and_then(|target| {
            videos.find(|file| normalize(&file.path) == target)
        }),
        None => videos.fold(None, |best: Option<&ResolvedFile>, file| match best {
            Some(current) if current.size >= file.size => Some(current),
            _ => Some(file),
        }),
    };

    match chosen {
        Some(file) => FileSelection::Selected(file),
        None if !files.is_empty() && files.iter().all(|file| classifier.is_archive(&file.path)) => {
            FileSelection::ArchiveOnly
        }
        None => FileSelection::NoMatch,
    }
}

fn normalize(path: &str) -> String {
    path.trim_start_matches(['/', '\\']).to_lowercase()
}
