//! Name and location filters for candidate files.
//!
//! A file is only ever observed for stability when all three hold: it has a
//! supported audio extension, its name starts with the configured mix
//! prefix (case-insensitive), and it lives under a directory whose name
//! matches the configured audio-files folder (case-sensitive).

use std::path::{Path, PathBuf};

/// Extensions Pro Tools writes bounces with.
const AUDIO_EXTENSIONS: &[&str] = &["wav", "aiff", "aif"];

/// Whether the file name starts with the mix prefix, case-insensitively.
pub fn is_mix_file(file_name: &str, prefix: &str) -> bool {
    file_name.to_lowercase().starts_with(&prefix.to_lowercase())
}

/// Whether the file has a supported audio extension.
pub fn is_audio_file(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Whether the path has an ancestor directory named `audio_folder`,
/// matched case-sensitively against whole components.
pub fn in_audio_folder(path: &Path, audio_folder: &str) -> bool {
    path.parent()
        .map(|parent| {
            parent
                .components()
                .any(|c| c.as_os_str() == std::ffi::OsStr::new(audio_folder))
        })
        .unwrap_or(false)
}

/// Derives the session name for a mix file.
///
/// The session is the directory immediately above the nearest ancestor named
/// `audio_folder`, not the file's own parent, so output grouping stays at
/// the session level no matter how deeply the file is nested:
/// `.../SessionA/Audio Files/stems/mix_01.wav` -> `SessionA`.
pub fn session_name(path: &Path, audio_folder: &str) -> Option<String> {
    let needle = std::ffi::OsStr::new(audio_folder);
    for ancestor in path.ancestors().skip(1) {
        if ancestor.file_name() == Some(needle) {
            return ancestor
                .parent()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned());
        }
    }
    None
}

/// Full candidate check used before a file enters stability observation.
pub fn is_candidate(path: &Path, audio_folder: &str, mix_prefix: &str) -> bool {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    is_audio_file(file_name)
        && is_mix_file(file_name, mix_prefix)
        && in_audio_folder(path, audio_folder)
}

/// Counts directories named `audio_folder` under `root`. Used only for
/// startup logging when a new root is registered; scan errors are ignored.
pub fn count_audio_folders(root: &Path, audio_folder: &str) -> usize {
    let mut count = 0;
    let mut stack: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if path.file_name() == Some(std::ffi::OsStr::new(audio_folder)) {
                    count += 1;
                }
                stack.push(path);
            }
        }
    }

    count
}
