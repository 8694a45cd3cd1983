use std::fs::Metadata;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Local};
use rfd::{AsyncFileDialog, FileHandle};
use tokio::fs;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{Capabilities, CommandArgs, DialogOptions, DirEntry, EntryKind, FileStat};
use crate::error::ApiError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Capabilities backed by the local machine.
///
/// Relative paths are resolved against `root`, which must be absolute.
#[derive(Debug, Clone)]
pub struct LocalCapabilities {
    root: PathBuf,
    exit: CancellationToken,
}

impl LocalCapabilities {
    pub fn new<P: Into<PathBuf>>(root: P, exit: CancellationToken) -> Self {
        Self { root: root.into(), exit }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        normalize(&self.root.join(path))
    }

    async fn read(&self, path: &str) -> Result<Bytes, ApiError> {
        let path = self.resolve(path);
        match fs::read(&path).await {
            Ok(contents) => Ok(Bytes::from(contents)),
            Err(e) => Err(ApiError::fs(path, e)),
        }
    }

    /// Builds the native dialog; awaiting it doesn't block a runtime worker.
    fn dialog(&self, options: &DialogOptions) -> AsyncFileDialog {
        let mut dialog = AsyncFileDialog::new();

        if let Some(title) = &options.title {
            dialog = dialog.set_title(title);
        }
        if let Some(dir) = &options.initialdir {
            dialog = dialog.set_directory(self.resolve(dir));
        }
        if let Some(file) = &options.initialfile {
            dialog = dialog.set_file_name(file);
        }
        for (label, pattern) in &options.filetypes {
            let extensions = pattern_extensions(pattern);
            if !extensions.is_empty() {
                dialog = dialog.add_filter(label, extensions.as_slice());
            }
        }

        dialog
    }
}

#[async_trait]
impl Capabilities for LocalCapabilities {
    async fn read_text_file(&self, path: &str) -> Result<Bytes, ApiError> {
        self.read(path).await
    }

    async fn read_binary_file(&self, path: &str) -> Result<Bytes, ApiError> {
        self.read(path).await
    }

    async fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, ApiError> {
        let dir = self.resolve(path);
        let mut read_dir = fs::read_dir(&dir).await.map_err(|e| ApiError::fs(&dir, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(|e| ApiError::fs(&dir, e))? {
            let entry_path = entry.path();
            // follow symlinks, a link to a folder is a folder
            let kind = match fs::metadata(&entry_path).await {
                Ok(metadata) => entry_kind(&metadata),
                Err(_) => EntryKind::Other,
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry_path.to_string_lossy().into_owned(),
                kind,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(entries)
    }

    async fn stat(&self, path: &str) -> Result<FileStat, ApiError> {
        let path = self.resolve(path);
        let metadata = fs::metadata(&path).await.map_err(|e| ApiError::fs(&path, e))?;

        let modified = metadata.modified().map_err(|e| ApiError::fs(&path, e))?;
        let accessed = metadata.accessed().unwrap_or(modified);
        // not every platform records a birth time
        let created = metadata.created().unwrap_or(modified);

        Ok(FileStat {
            path: path.to_string_lossy().into_owned(),
            kind: if metadata.is_dir() { EntryKind::Folder } else { EntryKind::File },
            accessed: format_time(accessed),
            modified: format_time(modified),
            created: format_time(created),
        })
    }

    async fn delete_files(&self, paths: Vec<String>) -> Vec<bool> {
        let mut deleted = Vec::with_capacity(paths.len());
        for path in paths {
            let result = fs::remove_file(self.resolve(&path)).await;
            if let Err(e) = &result {
                debug!(path, cause = %e, "can't delete file");
            }
            deleted.push(result.is_ok());
        }
        deleted
    }

    async fn make_directory(&self, path: &str, exist_ok: bool) -> Result<(), ApiError> {
        let path = self.resolve(path);
        if !exist_ok && fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ApiError::fs(path, io::Error::from(io::ErrorKind::AlreadyExists)));
        }
        fs::create_dir_all(&path).await.map_err(|e| ApiError::fs(path, e))
    }

    async fn remove_directory(&self, path: &str) -> Result<(), ApiError> {
        let path = self.resolve(path);
        fs::remove_dir(&path).await.map_err(|e| ApiError::fs(path, e))
    }

    async fn write_file(&self, path: &str, contents: Bytes) -> Result<(), ApiError> {
        let path = self.resolve(path);
        fs::write(&path, contents).await.map_err(|e| ApiError::fs(path, e))
    }

    async fn copy_file(&self, src: &str, dest: &str) -> Result<(), ApiError> {
        let src = self.resolve(src);
        let mut dest = self.resolve(dest);

        if fs::metadata(&dest).await.is_ok_and(|metadata| metadata.is_dir()) {
            let Some(file_name) = src.file_name() else {
                return Err(ApiError::invalid_argument(format!("{} has no file name", src.display())));
            };
            dest.push(file_name);
        }

        fs::copy(&src, &dest).await.map(|_| ()).map_err(|e| ApiError::fs(src, e))
    }

    async fn pick_open_file(&self, options: DialogOptions) -> Result<Option<String>, ApiError> {
        let picked = self.dialog(&options).pick_file().await;
        Ok(picked.map(|handle| handle_path(&handle)))
    }

    async fn pick_save_file(&self, options: DialogOptions) -> Result<Option<String>, ApiError> {
        let picked = self.dialog(&options).save_file().await;
        Ok(picked.map(|handle| {
            let path = with_default_extension(handle.path().to_path_buf(), options.defaultextension.as_deref());
            path.to_string_lossy().into_owned()
        }))
    }

    async fn pick_folder(&self, options: DialogOptions) -> Result<Option<String>, ApiError> {
        let picked = self.dialog(&options).pick_folder().await;
        Ok(picked.map(|handle| handle_path(&handle)))
    }

    async fn run_process(&self, command: CommandArgs) -> Result<(), ApiError> {
        let (program, args) =
            command.program_and_args().ok_or_else(|| ApiError::invalid_argument("empty command"))?;

        let child = Command::new(&program)
            .args(&args)
            .current_dir(&self.root)
            .spawn()
            .map_err(|source| ApiError::Command { source })?;

        info!(program, pid = child.id(), "process started");
        Ok(())
    }

    fn relative_path(&self, path: &str) -> Result<String, ApiError> {
        let relative = relative_to(&self.resolve(path), &self.root);
        Ok(relative.to_string_lossy().into_owned())
    }

    fn request_exit(&self) {
        info!("exit requested");
        self.exit.cancel();
    }
}

fn entry_kind(metadata: &Metadata) -> EntryKind {
    if metadata.is_file() {
        EntryKind::File
    } else if metadata.is_dir() {
        EntryKind::Folder
    } else {
        EntryKind::Other
    }
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format(TIMESTAMP_FORMAT).to_string()
}

/// `"*.txt *.md"` becomes `["txt", "md"]`; wildcards without an extension are dropped.
fn pattern_extensions(pattern: &str) -> Vec<String> {
    pattern
        .split_whitespace()
        .filter_map(|glob| glob.strip_prefix("*.").or_else(|| glob.strip_prefix('.')))
        .filter(|ext| !ext.is_empty() && *ext != "*")
        .map(str::to_owned)
        .collect()
}

fn handle_path(handle: &FileHandle) -> String {
    handle.path().to_string_lossy().into_owned()
}

fn with_default_extension(path: PathBuf, default_extension: Option<&str>) -> PathBuf {
    match default_extension.map(|ext| ext.trim_start_matches('.')) {
        Some(ext) if !ext.is_empty() && path.extension().is_none() => path.with_extension(ext),
        _ => path,
    }
}

/// Lexically removes `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// `path` relative to `base`, both absolute and normalized.
fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path_components = path.components().collect::<Vec<_>>();
    let base_components = base.components().collect::<Vec<_>>();

    let common = path_components.iter().zip(&base_components).take_while(|(a, b)| a == b).count();

    let mut relative = PathBuf::new();
    for _ in common..base_components.len() {
        relative.push(Component::ParentDir);
    }
    for component in &path_components[common..] {
        relative.push(component);
    }

    if relative.as_os_str().is_empty() { PathBuf::from(".") } else { relative }
}
