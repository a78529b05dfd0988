//! Design file discovery.
//!
//! Thin collaborator over the file system: maps a project directory to the
//! set of source files a provider stack needs. Parsing and reading stay in
//! the providers.

use std::path::{Path, PathBuf};

/// The source files of one design.
#[derive(Debug, Default)]
pub struct DesignFiles {
    /// Schematic sheets, sorted for deterministic page ordering.
    pub schematics: Vec<PathBuf>,
    /// The board file, when the project has one.
    pub board: Option<PathBuf>,
}

/// Recursively discover schematic and board files under a directory.
pub fn locate_design_files(dir: &Path) -> Result<DesignFiles, std::io::Error> {
    let mut files = DesignFiles::default();
    walk_dir(dir, &mut files, 0)?;
    files.schematics.sort();
    Ok(files)
}

fn walk_dir(dir: &Path, files: &mut DesignFiles, depth: usize) -> Result<(), std::io::Error> {
    if depth > 20 {
        return Ok(());
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if name.starts_with('.') || name == "node_modules" || name == "target" || name == "build"
            {
                continue;
            }
            walk_dir(&path, files, depth + 1)?;
        } else if path.is_file() {
            match path.extension().and_then(|s| s.to_str()) {
                Some("kicad_sch") => files.schematics.push(path),
                Some("kicad_pcb") => {
                    if files.board.is_none() {
                        files.board = Some(path);
                    } else {
                        tracing::warn!(path = %path.display(), "ignoring extra board file");
                    }
                }
                _ => {}
            }
        }
    }
    Ok(())
}
