//! Build manifest: which documents to index and where the output goes.
//!
//! ```toml
//! [input]
//! base_directory = "docs"
//! files = [
//!     { path = "intro.txt", url = "/intro", title = "Introduction" },
//! ]
//!
//! [output]
//! directory = "public/index"
//! shard_width = 2
//! ```

use crate::error::{Error, Result};
use crate::index::{DocId, Document};
use crate::shard::DEFAULT_SHARD_WIDTH;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    pub input: InputSection,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputSection {
    /// Relative file paths resolve against this directory when set.
    pub base_directory: Option<PathBuf>,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

/// One input document. Every field is required; they are optional here only so a
/// missing one can be reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileEntry {
    pub path: Option<PathBuf>,
    pub url: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_shard_width")]
    pub shard_width: usize,
}

fn default_directory() -> PathBuf { PathBuf::from("./index") }
fn default_shard_width() -> usize { DEFAULT_SHARD_WIDTH }

impl Default for OutputSection {
    fn default() -> Self {
        Self { directory: default_directory(), shard_width: default_shard_width() }
    }
}

impl Manifest {
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(&text)
    }

    /// Check every entry for its metadata before any file is read.
    pub fn validate(&self) -> Result<()> {
        for (index, entry) in self.input.files.iter().enumerate() {
            entry.require(index)?;
        }
        Ok(())
    }

    /// Read every listed file. A document's id is its position in the manifest.
    pub fn load_documents(&self) -> Result<Vec<Document>> {
        self.validate()?;
        let mut docs = Vec::with_capacity(self.input.files.len());
        for (index, entry) in self.input.files.iter().enumerate() {
            let (path, url, title) = entry.require(index)?;
            let path = self.resolve(path);
            let text = fs::read_to_string(&path).map_err(|source| Error::Document { index, path, source })?;
            docs.push(Document { id: index as DocId, title: title.to_string(), url: url.to_string(), text });
        }
        tracing::info!(num_docs = docs.len(), "loaded documents");
        Ok(docs)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.input.base_directory {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl FileEntry {
    fn require(&self, index: usize) -> Result<(&Path, &str, &str)> {
        let path = self.path.as_deref().ok_or(Error::MissingField { index, field: "path" })?;
        let url = self.url.as_deref().ok_or(Error::MissingField { index, field: "url" })?;
        let title = self.title.as_deref().ok_or(Error::MissingField { index, field: "title" })?;
        Ok((path, url, title))
    }
}
