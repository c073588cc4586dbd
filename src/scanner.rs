use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions recognized as route manifests
pub const MANIFEST_EXTENSIONS: [&str; 3] = ["yaml", "yml", "json"];

/// Directory scanner that collects route manifest files.
///
/// Hidden entries (names starting with `.`) and `target` directories are skipped.
/// Files are returned in sorted path order so that merging is deterministic.
///
/// # Example
///
/// ```no_run
/// use route_composer::scanner::ManifestScanner;
/// use std::path::PathBuf;
///
/// let scanner = ManifestScanner::new(PathBuf::from("./routes"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} manifests", result.manifest_files.len());
/// ```
pub struct ManifestScanner {
    root_path: PathBuf,
}

/// Result of a directory scan.
pub struct ScanResult {
    /// Paths of every discovered manifest, sorted
    pub manifest_files: Vec<PathBuf>,
    /// Warning messages for entries that could not be accessed
    pub warnings: Vec<String>,
}

/// Whether `path` carries one of the [`MANIFEST_EXTENSIONS`]
pub fn is_manifest_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| MANIFEST_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl ManifestScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Walks the directory tree and collects manifest files.
    ///
    /// Inaccessible entries are recorded as warnings; scanning continues.
    pub fn scan(&self) -> Result<ScanResult> {
        debug!("Scanning {} for route manifests", self.root_path.display());

        let mut manifest_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                let is_hidden = file_name.starts_with('.');
                let is_target = file_name == "target";

                !is_hidden && !is_target
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && is_manifest_file(path) {
                        manifest_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    debug!("Skipping inaccessible entry: {}", e);
                    warnings.push(format!("Failed to access path: {}", e));
                }
            }
        }

        manifest_files.sort();
        debug!("Found {} manifest file(s)", manifest_files.len());

        Ok(ScanResult {
            manifest_files,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_collects_manifests_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("users.yaml"), "routes: []").unwrap();
        fs::create_dir(root.join("characters")).unwrap();
        fs::write(root.join("characters/hiscores.json"), "{}").unwrap();
        fs::write(root.join("notes.txt"), "not a manifest").unwrap();
        fs::write(root.join("api.YML"), "routes: []").unwrap();

        let result = ManifestScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(result.manifest_files.len(), 3);
        assert!(result.warnings.is_empty());
        let mut sorted = result.manifest_files.clone();
        sorted.sort();
        assert_eq!(result.manifest_files, sorted);
        assert!(result
            .manifest_files
            .iter()
            .all(|p| p.extension().unwrap() != "txt"));
    }

    #[test]
    fn test_scan_skips_hidden_and_target() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/config.json"), "{}").unwrap();
        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target/out.json"), "{}").unwrap();
        fs::write(root.join(".hidden.yaml"), "routes: []").unwrap();
        fs::write(root.join("routes.yaml"), "routes: []").unwrap();

        let result = ManifestScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(result.manifest_files, vec![root.join("routes.yaml")]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = ManifestScanner::new(temp_dir.path().to_path_buf())
            .scan()
            .unwrap();
        assert!(result.manifest_files.is_empty());
    }

    #[test]
    fn test_is_manifest_file() {
        assert!(is_manifest_file(Path::new("a/routes.yaml")));
        assert!(is_manifest_file(Path::new("routes.JSON")));
        assert!(!is_manifest_file(Path::new("routes.toml")));
        assert!(!is_manifest_file(Path::new("routes")));
    }
}
