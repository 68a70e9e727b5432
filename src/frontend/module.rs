//! Script source loading
//!
//! Papyrus scripts live in `.psc` files named after the script they declare.
//! [`SourceLoader`] finds them on a list of search paths, reads them and
//! caches what it has parsed by case-insensitive script name.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};

use crate::frontend::ast::Script;
use crate::frontend::parse_script;
use crate::utils::{Error, Result};

/// File extension of Papyrus sources, compared case-insensitively
pub const SOURCE_EXTENSION: &str = "psc";

/// A script file read from disk
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File stem, which names the script the file should declare
    pub identifier: String,
    pub text: String,
}

impl SourceFile {
    pub fn parse(&self) -> Result<Script> {
        parse_script(&self.text)
    }
}

/// Whether `path` names a Papyrus source file
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SOURCE_EXTENSION))
}

fn script_identifier(path: &Path) -> Option<String> {
    path.file_stem().and_then(|stem| stem.to_str()).map(str::to_string)
}

pub struct SourceLoader {
    search_paths: Vec<PathBuf>,
    /// Parsed scripts by upper-cased name
    parsed: HashMap<String, Script>,
}

impl SourceLoader {
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
            parsed: HashMap::new(),
        }
    }

    pub fn with_search_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut loader = Self::new();
        for path in paths {
            loader.add_search_path(path);
        }
        loader
    }

    pub fn add_search_path(&mut self, path: PathBuf) {
        if !self.search_paths.contains(&path) {
            self.search_paths.push(path);
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Locate `NAME.psc` directly inside one of the search paths
    pub fn find_script(&self, name: &str) -> Option<PathBuf> {
        let wanted = name.to_uppercase();
        for search_path in &self.search_paths {
            let Ok(entries) = fs::read_dir(search_path) else {
                trace!("Skipping unreadable search path {}", search_path.display());
                continue;
            };
            let mut matches: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| path.is_file() && is_source_file(path))
                .filter(|path| script_identifier(path).is_some_and(|stem| stem.to_uppercase() == wanted))
                .collect();
            matches.sort();
            if let Some(found) = matches.into_iter().next() {
                return Some(found);
            }
        }
        None
    }

    /// Read a source file
    pub fn load(&self, path: &Path) -> Result<SourceFile> {
        let text = fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let identifier = script_identifier(path)
            .ok_or_else(|| Error::Io(format!("{} has no usable file name", path.display())))?;
        Ok(SourceFile {
            path: path.to_path_buf(),
            identifier,
            text,
        })
    }

    /// Find, read and parse a script by name, caching the result
    pub fn load_script(&mut self, name: &str) -> Result<&Script> {
        let key = name.to_uppercase();
        if !self.parsed.contains_key(&key) {
            let path = self
                .find_script(name)
                .ok_or_else(|| Error::ScriptNotFound { name: name.to_string() })?;
            debug!("Loading script {} from {}", name, path.display());
            let script = self.load(&path)?.parse()?;
            self.parsed.insert(key.clone(), script);
        }
        self.parsed
            .get(&key)
            .ok_or_else(|| Error::ScriptNotFound { name: name.to_string() })
    }

    /// Load every script reachable from `roots` through imports, following
    /// imports of imports. Names in `seen` are skipped and every visited name
    /// is added to it. `on_script` runs once per loaded script; a script it
    /// rejects is not followed further. Returns the names that failed.
    pub fn load_imports<F>(&mut self, roots: &[Script], seen: &mut HashSet<String>, mut on_script: F) -> Vec<(String, Error)>
    where
        F: FnMut(&Script) -> Result<()>,
    {
        let mut pending: Vec<String> = roots
            .iter()
            .flat_map(|script| script.imports().map(|name| name.name().to_string()))
            .collect();
        pending.reverse();

        let mut failed = Vec::new();
        while let Some(name) = pending.pop() {
            if !seen.insert(name.to_uppercase()) {
                continue;
            }
            let loaded = self.load_script(&name).and_then(|script| {
                on_script(script)?;
                Ok(script.imports().map(|i| i.name().to_string()).collect::<Vec<_>>())
            });
            match loaded {
                Ok(more) => pending.extend(more.into_iter().rev()),
                Err(e) => {
                    warn!("Import {} not loaded: {}", name, e);
                    failed.push((name, e));
                }
            }
        }
        failed
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.parsed.contains_key(&name.to_uppercase())
    }

    /// Expand files and directories into the `.psc` files they contain.
    /// Directories are searched recursively; results are sorted per directory.
    pub fn collect(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for path in paths {
            collect_into(path, &mut files)?;
        }
        Ok(files)
    }
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_into(path: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    if path.is_file() {
        if is_source_file(path) {
            files.push(path.to_path_buf());
        }
        return Ok(());
    }

    let entries = fs::read_dir(path)
        .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    let mut children: Vec<PathBuf> = entries.filter_map(|entry| entry.ok().map(|e| e.path())).collect();
    children.sort();
    for child in children {
        collect_into(&child, files)?;
    }
    Ok(())
}
