use std::fs;
use std::path::{Path, PathBuf};

use relative_path::RelativePath;

/// File extension for analysis documents.
pub const SPEC_EXTENSION: &str = "stpa";

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid specs directory: {0}")]
    InvalidSpecsDir(String),
}

/// Read an analysis file and return its content.
pub fn read_file(relative_path: &RelativePath, specs_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(specs_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write content to an analysis file, creating parent directories as needed.
pub fn write_file(
    relative_path: &RelativePath,
    specs_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(specs_root);
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }
    fs::write(&absolute_path, content).map_err(IoError::Io)
}

/// Scan for `.stpa` files in the specs directory, sorted for stable output.
pub fn scan_spec_files(specs_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    validate_specs_dir(specs_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(specs_root, &mut files)?;
    files.sort();
    Ok(files)
}

pub fn validate_specs_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidSpecsDir(
            "directory does not exist".to_string(),
        ));
    }
    Ok(())
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    for entry in fs::read_dir(dir).map_err(IoError::Io)? {
        let path = entry.map_err(IoError::Io)?.path();
        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == SPEC_EXTENSION
        {
            files.push(path);
        }
    }
    Ok(())
}
