//! Markdown vault record source.
//!
//! Reads a folder of Markdown notes and exposes each note as a
//! [`cg_core::Record`]: YAML frontmatter keys become fields, and file
//! metadata provides the intrinsic creation and modification times.
//!
//! # Selectors
//!
//! - `/`: every note in the vault
//! - `folder` or `"folder"`: notes under that folder, recursively
//! - `#tag`: notes tagged `tag` (or a nested `tag/...`) in frontmatter or body

mod frontmatter;
mod selector;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use cg_core::{FieldValue, Record, RecordSource};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

pub use selector::Selector;

/// Vault errors.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The vault root is missing or not a directory.
    #[error("vault root not found: {}", path.display())]
    RootNotFound { path: PathBuf },
    /// Reading a file or directory failed.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The frontmatter block is not valid YAML.
    #[error("invalid frontmatter in {}", path.display())]
    Frontmatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A Markdown note.
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Path relative to the vault root, without extension, `/`-separated.
    pub id: String,
    pub path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub fields: BTreeMap<String, FieldValue>,
    /// Tags from frontmatter and body, without the leading `#`.
    pub tags: Vec<String>,
}

impl Note {
    /// True when the note carries `tag` or a tag nested under it.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| {
            t.eq_ignore_ascii_case(tag)
                || (t.len() > tag.len()
                    && t.as_bytes()[tag.len()] == b'/'
                    && t[..tag.len()].eq_ignore_ascii_case(tag))
        })
    }
}

impl Record for Note {
    fn id(&self) -> &str {
        &self.id
    }

    fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }
}

/// A folder of Markdown notes.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
}

impl Vault {
    /// Opens the vault at `root`, which must be an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, VaultError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(VaultError::RootNotFound { path: root });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads every note matching `selector`, sorted by id.
    ///
    /// Notes that can't be read are skipped with a warning.
    pub fn notes(&self, selector: &Selector) -> Result<Vec<Note>, VaultError> {
        if !self.root.is_dir() {
            return Err(VaultError::RootNotFound {
                path: self.root.clone(),
            });
        }

        let start = match selector {
            Selector::Folder(folder) => {
                if folder
                    .components()
                    .any(|c| !matches!(c, Component::Normal(_)))
                {
                    tracing::warn!(folder = ?folder, "folder selector must stay inside the vault");
                    return Ok(Vec::new());
                }
                self.root.join(folder)
            }
            Selector::All | Selector::Tag(_) => self.root.clone(),
        };

        let paths = if start.is_dir() {
            collect_markdown(&start)?
        } else {
            Vec::new()
        };

        let mut notes: Vec<Note> = paths
            .par_iter()
            .filter_map(|path| match load_note(&self.root, path) {
                Ok(note) => Some(note),
                Err(e) => {
                    tracing::warn!(path = ?path, error = %e, "skipping unreadable note");
                    None
                }
            })
            .filter(|note| match selector {
                Selector::Tag(tag) => note.has_tag(tag),
                Selector::All | Selector::Folder(_) => true,
            })
            .collect();

        notes.sort_by(|a, b| a.id.cmp(&b.id));
        tracing::debug!(root = ?self.root, count = notes.len(), "loaded notes");
        Ok(notes)
    }
}

impl RecordSource for Vault {
    type Record = Note;
    type Error = VaultError;

    fn fetch(&self, selector: &str) -> Result<Vec<Note>, VaultError> {
        self.notes(&Selector::parse(selector))
    }
}

/// Recursively collects `.md` files, skipping hidden entries.
///
/// Symlinks are not followed. Only a failure to read the top directory is
/// an error; unreadable entries below it are logged and skipped.
fn collect_markdown(dir: &Path) -> Result<Vec<PathBuf>, VaultError> {
    let mut paths = Vec::new();
    let walker = WalkDir::new(dir)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(VaultError::Io {
                    path: dir.to_path_buf(),
                    source: e.into(),
                });
            }
            Err(e) => {
                tracing::warn!(path = ?e.path(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        let is_markdown = entry
            .path()
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("md"));
        if entry.file_type().is_file() && is_markdown {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|n| n.starts_with('.'))
}

fn load_note(root: &Path, path: &Path) -> Result<Note, VaultError> {
    let io_err = |source| VaultError::Io {
        path: path.to_path_buf(),
        source,
    };

    let content = fs::read_to_string(path).map_err(io_err)?;
    let metadata = fs::metadata(path).map_err(io_err)?;
    let modified_at: DateTime<Utc> = metadata.modified().map_err(io_err)?.into();
    // Not every filesystem records birth time.
    let created_at = metadata
        .created()
        .map_or(modified_at, DateTime::<Utc>::from);

    let (yaml, body) = frontmatter::split(&content);
    let parsed = yaml.map_or_else(|| Ok(frontmatter::Frontmatter::default()), frontmatter::parse);
    let (fields, mut tags) = match parsed {
        Ok(fm) => (fm.fields, fm.tags),
        Err(source) => {
            let err = VaultError::Frontmatter {
                path: path.to_path_buf(),
                source,
            };
            tracing::warn!(error = %err, "ignoring frontmatter");
            (BTreeMap::new(), Vec::new())
        }
    };
    for tag in frontmatter::inline_tags(body) {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    Ok(Note {
        id: note_id(root, path),
        path: path.to_path_buf(),
        created_at,
        modified_at,
        fields,
        tags,
    })
}

fn note_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path).with_extension("");
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
