use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use image_fingerprint_core::ImageFormat;

/// Check if a path has a JPEG, PNG or WebP extension
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFormat::from_extension)
        .is_some()
}

/// Collect supported image files from files and directories.
///
/// Directories are walked up to `max_depth` levels. Explicit file arguments
/// are kept as given. The result is sorted and free of duplicates.
pub fn discover_images<P: AsRef<Path>>(paths: &[P], max_depth: Option<usize>) -> Vec<PathBuf> {
    let max_depth = max_depth.unwrap_or(usize::MAX);
    let mut images = Vec::new();

    for path in paths {
        let path = path.as_ref();

        if path.is_file() {
            images.push(path.to_path_buf());
            continue;
        }

        if !path.exists() {
            warn!("Skipping missing path: {}", path.display());
            continue;
        }

        for entry in WalkDir::new(path)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if is_supported_image(entry.path()) {
                images.push(entry.into_path());
            } else {
                debug!("Ignoring {}", entry.path().display());
            }
        }
    }

    images.sort();
    images.dedup();
    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_discover_images() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let subdir = root.join("subdir");
        fs::create_dir_all(&subdir).unwrap();

        for name in ["a.jpg", "b.PNG", "c.webp", "notes.txt", "d.tiff"] {
            fs::write(root.join(name), b"data").unwrap();
        }
        fs::write(subdir.join("e.jpeg"), b"data").unwrap();

        let found = discover_images(&[root], None);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG", "c.webp", "e.jpeg"]);

        // Depth 1 stays out of subdirectories
        assert_eq!(discover_images(&[root], Some(1)).len(), 3);
    }

    #[test]
    fn test_explicit_files_and_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("photo.jpg");
        fs::write(&file, b"data").unwrap();

        let paths = [file.clone(), file.clone(), dir.path().join("missing")];
        let found = discover_images(&paths, None);
        assert_eq!(found, vec![file]);
    }
}
