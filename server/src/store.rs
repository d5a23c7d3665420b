use std::io::{self, ErrorKind, SeekFrom};
use std::path::{Component, Path, PathBuf};

use kernel::FileInfo;
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::config::Config;
use crate::domain::StorageError;
use crate::sniff::{self, SNIFF_LEN};

/// Flat directory storage. Files are addressed by name only.
#[derive(Debug, Clone)]
pub struct FileStore {
    upload_root: PathBuf,
    download_root: PathBuf,
}

/// Opened stored file, positioned at its start, ready to be streamed.
pub struct Download {
    pub file: File,
    pub info: FileInfo,
}

impl FileStore {
    /// Creates both roots when missing and pins them to their canonical form.
    pub async fn open(config: &Config) -> io::Result<Self> {
        fs::create_dir_all(&config.upload_root).await?;
        fs::create_dir_all(&config.download_root).await?;
        Ok(Self {
            upload_root: fs::canonicalize(&config.upload_root).await?,
            download_root: fs::canonicalize(&config.download_root).await?,
        })
    }

    #[must_use]
    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }

    #[must_use]
    pub fn download_root(&self) -> &Path {
        &self.download_root
    }

    /// Writes `data` as `name` under the upload root replacing any previous
    /// content and returns the name used.
    pub async fn store(&self, name: &str, data: &[u8]) -> Result<String, StorageError> {
        let path = resolve(&self.upload_root, name)?;
        let write_failure = |source| StorageError::StorageWriteFailure {
            name: name.to_owned(),
            source,
        };

        // A symlink is written through only when it resolves inside the root.
        // Dangling links are refused since creating their target escapes too
        match fs::symlink_metadata(&path).await {
            Ok(meta) if meta.file_type().is_symlink() => {
                let target = fs::canonicalize(&path).await.ok();
                if !target
                    .as_ref()
                    .is_some_and(|t| t.starts_with(&self.upload_root))
                {
                    tracing::warn!("Path traversal attempt blocked: {name} -> {target:?}");
                    return Err(StorageError::InvalidFilename(name.to_owned()));
                }
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(write_failure(e)),
        }

        let mut file = File::create(&path).await.map_err(write_failure)?;
        file.write_all(data).await.map_err(write_failure)?;
        file.flush().await.map_err(write_failure)?;
        Ok(name.to_owned())
    }

    /// Opens `name` under the download root and sniffs its media type.
    pub async fn retrieve(&self, name: &str) -> Result<Download, StorageError> {
        let path = resolve(&self.download_root, name)?;
        let read_failure = |source| StorageError::StorageReadFailure {
            name: name.to_owned(),
            source,
        };
        let not_found_or = |e: io::Error| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::FileNotFound(name.to_owned())
            } else {
                read_failure(e)
            }
        };

        let target = fs::canonicalize(&path).await.map_err(not_found_or)?;
        if !target.starts_with(&self.download_root) {
            tracing::warn!(
                "Path traversal attempt blocked: {name} -> {}",
                target.display()
            );
            return Err(StorageError::FileNotFound(name.to_owned()));
        }

        let mut file = File::open(&target).await.map_err(not_found_or)?;
        let meta = file.metadata().await.map_err(read_failure)?;
        if !meta.is_file() {
            return Err(StorageError::FileNotFound(name.to_owned()));
        }

        let mut head = Vec::with_capacity(SNIFF_LEN);
        (&mut file)
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut head)
            .await
            .map_err(read_failure)?;
        file.seek(SeekFrom::Start(0))
            .await
            .map_err(read_failure)?;

        let info = FileInfo {
            name: name.to_owned(),
            media_type: sniff::detect_media_type(&head).to_owned(),
            size: meta.len(),
        };
        Ok(Download { file, info })
    }
}

/// Joins `name` to `root` when it is a single plain path segment.
fn resolve(root: &Path, name: &str) -> Result<PathBuf, StorageError> {
    if !is_plain_file_name(name) {
        return Err(StorageError::InvalidFilename(name.to_owned()));
    }
    Ok(root.join(name))
}

fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
