//! Where catalog and resource bytes come from.
//!
//! Every source uses the same layout below its root:
//!
//! ```text
//! <locale>/LC_MESSAGES/<domain>.po
//! <locale>/LC_MESSAGES/<domain>.mo
//! <locale>/LC_RESOURCE/<domain>/<name>
//! ```

use crate::error::SourceError;
use es_gettext_catalog::CatalogFormat;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Supplies raw catalog and resource bytes for a domain.
pub trait CatalogSource: fmt::Debug + Send + Sync {
    /// The locales this source can serve, sorted.
    fn locales(&self) -> Result<Vec<String>, SourceError>;

    /// Raw bytes of `<locale>/LC_MESSAGES/<domain><ext>`.
    fn load_messages(
        &self,
        domain: &str,
        locale: &str,
        format: CatalogFormat,
    ) -> Result<Vec<u8>, SourceError>;

    /// Raw bytes of `<locale>/LC_RESOURCE/<domain>/<name>`.
    fn load_resource(&self, domain: &str, locale: &str, name: &str)
    -> Result<Vec<u8>, SourceError>;

    /// Human readable description used in logs.
    fn describe(&self) -> String;
}

pub fn messages_path(domain: &str, locale: &str, format: CatalogFormat) -> String {
    format!("{}/LC_MESSAGES/{}{}", locale, domain, format.extension())
}

pub fn resource_path(domain: &str, locale: &str, name: &str) -> String {
    format!("{}/LC_RESOURCE/{}/{}", locale, domain, name)
}

/// Rejects names that could escape the source root.
fn check_relative(path: &str) -> Result<(), SourceError> {
    let escapes = path.starts_with('/')
        || path.contains('\\')
        || path.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if escapes {
        return Err(SourceError::NotFound(path.to_string()));
    }
    Ok(())
}

/// Picks the source for a path: a `.zip` file becomes an [`ArchiveSource`],
/// anything else a [`DirectorySource`].
pub fn open_path(path: impl AsRef<Path>) -> Arc<dyn CatalogSource> {
    let path = path.as_ref();
    #[cfg(feature = "zip")]
    {
        let is_zip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
        if is_zip && path.is_file() {
            return match ArchiveSource::open(path) {
                Ok(archive) => Arc::new(archive),
                Err(err) => {
                    tracing::warn!("Failed to open archive '{}': {}", path.display(), err);
                    Arc::new(NullSource::new(path.display().to_string()))
                },
            };
        }
    }
    Arc::new(DirectorySource::new(path))
}

/// Catalogs stored in a directory tree.
#[derive(Clone, Debug)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read(&self, relative: &str) -> Result<Vec<u8>, SourceError> {
        check_relative(relative)?;
        let path = self.root.join(relative);
        fs_err::read(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                SourceError::NotFound(path.display().to_string())
            } else {
                SourceError::Io(err)
            }
        })
    }
}

impl CatalogSource for DirectorySource {
    fn locales(&self) -> Result<Vec<String>, SourceError> {
        let mut locales = BTreeSet::new();
        for entry in fs_err::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => {
                    locales.insert(name);
                },
                Err(raw) => tracing::debug!("Skipping non UTF-8 locale directory {:?}", raw),
            }
        }
        Ok(locales.into_iter().collect())
    }

    fn load_messages(
        &self,
        domain: &str,
        locale: &str,
        format: CatalogFormat,
    ) -> Result<Vec<u8>, SourceError> {
        self.read(&messages_path(domain, locale, format))
    }

    fn load_resource(
        &self,
        domain: &str,
        locale: &str,
        name: &str,
    ) -> Result<Vec<u8>, SourceError> {
        self.read(&resource_path(domain, locale, name))
    }

    fn describe(&self) -> String {
        format!("directory({})", self.root.display())
    }
}

/// Catalogs held in memory, keyed by their relative path.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    name: String,
    files: BTreeMap<String, Arc<[u8]>>,
}

impl MemorySource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: BTreeMap::new(),
        }
    }

    /// Adds a file under its relative path, e.g. `fr/LC_MESSAGES/app.po`.
    pub fn insert(&mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        let bytes: Vec<u8> = bytes.into();
        self.files.insert(path.into(), Arc::from(bytes));
    }

    pub fn with_file(mut self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn with_messages(
        self,
        domain: &str,
        locale: &str,
        format: CatalogFormat,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.with_file(messages_path(domain, locale, format), bytes)
    }

    pub fn with_resource(
        self,
        domain: &str,
        locale: &str,
        name: &str,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.with_file(resource_path(domain, locale, name), bytes)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn read(&self, relative: &str) -> Result<Vec<u8>, SourceError> {
        self.files
            .get(relative)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| SourceError::NotFound(relative.to_string()))
    }
}

impl CatalogSource for MemorySource {
    fn locales(&self) -> Result<Vec<String>, SourceError> {
        let locales: BTreeSet<&str> = self
            .files
            .keys()
            .filter_map(|path| path.split_once('/').map(|(locale, _)| locale))
            .filter(|locale| !locale.is_empty())
            .collect();
        Ok(locales.into_iter().map(str::to_string).collect())
    }

    fn load_messages(
        &self,
        domain: &str,
        locale: &str,
        format: CatalogFormat,
    ) -> Result<Vec<u8>, SourceError> {
        self.read(&messages_path(domain, locale, format))
    }

    fn load_resource(
        &self,
        domain: &str,
        locale: &str,
        name: &str,
    ) -> Result<Vec<u8>, SourceError> {
        self.read(&resource_path(domain, locale, name))
    }

    fn describe(&self) -> String {
        format!("memory({})", self.name)
    }
}

/// Catalogs packed in a zip archive.
///
/// Entries are expected under a top-level directory named after the archive
/// file stem (`locale.zip` holds `locale/<locale>/LC_MESSAGES/...`). The
/// archive is read once, when the source is created.
/// Largest archive entry that is extracted, in bytes.
#[cfg(feature = "zip")]
pub const MAX_ARCHIVE_ENTRY_BYTES: u64 = 64 * 1024 * 1024;

#[cfg(feature = "zip")]
#[derive(Clone, Debug)]
pub struct ArchiveSource {
    name: String,
    files: MemorySource,
}

#[cfg(feature = "zip")]
impl ArchiveSource {
    /// Reads a zip archive from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let bytes = fs_err::read(path)?;
        Self::from_bytes(path.display().to_string(), &bytes)
    }

    /// Reads a zip archive held in memory. `name` is the archive's file name or
    /// path; its stem selects the root directory inside the archive.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, SourceError> {
        use std::io::Read as _;

        let name = name.into();
        let root = archive_root(&name);
        let prefix = format!("{}/", root);

        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))?;
        let mut files = MemorySource::new(name.clone());
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let Some(relative) = entry.name().strip_prefix(&prefix).map(str::to_string) else {
                continue;
            };
            // The declared size is untrusted; read at most one byte past the limit.
            let mut data = Vec::new();
            entry
                .by_ref()
                .take(MAX_ARCHIVE_ENTRY_BYTES + 1)
                .read_to_end(&mut data)?;
            if data.len() as u64 > MAX_ARCHIVE_ENTRY_BYTES {
                return Err(SourceError::EntryTooLarge {
                    name: entry.name().to_string(),
                    limit: MAX_ARCHIVE_ENTRY_BYTES,
                });
            }
            files.insert(relative, data);
        }

        tracing::debug!("Loaded {} files from archive '{}'", files.len(), name);
        Ok(Self { name, files })
    }
}

#[cfg(feature = "zip")]
fn archive_root(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.strip_suffix(".zip")
        .or_else(|| base.strip_suffix(".ZIP"))
        .unwrap_or(base)
}

#[cfg(feature = "zip")]
impl CatalogSource for ArchiveSource {
    fn locales(&self) -> Result<Vec<String>, SourceError> {
        self.files.locales()
    }

    fn load_messages(
        &self,
        domain: &str,
        locale: &str,
        format: CatalogFormat,
    ) -> Result<Vec<u8>, SourceError> {
        self.files.load_messages(domain, locale, format)
    }

    fn load_resource(
        &self,
        domain: &str,
        locale: &str,
        name: &str,
    ) -> Result<Vec<u8>, SourceError> {
        self.files.load_resource(domain, locale, name)
    }

    fn describe(&self) -> String {
        format!("archive({})", self.name)
    }
}

/// A source with nothing in it.
#[derive(Clone, Debug, Default)]
pub struct NullSource {
    name: String,
}

impl NullSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl CatalogSource for NullSource {
    fn locales(&self) -> Result<Vec<String>, SourceError> {
        Ok(Vec::new())
    }

    fn load_messages(
        &self,
        domain: &str,
        locale: &str,
        format: CatalogFormat,
    ) -> Result<Vec<u8>, SourceError> {
        Err(SourceError::NotFound(messages_path(domain, locale, format)))
    }

    fn load_resource(
        &self,
        domain: &str,
        locale: &str,
        name: &str,
    ) -> Result<Vec<u8>, SourceError> {
        Err(SourceError::NotFound(resource_path(domain, locale, name)))
    }

    fn describe(&self) -> String {
        format!("null({})", self.name)
    }
}
