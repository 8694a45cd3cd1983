//! The operations a web page can't do by itself, exposed to route handlers.
//!
//! Route handlers only see [`Capabilities`]; [`LocalCapabilities`] is the implementation that
//! touches the local filesystem, native dialogs and processes. Tests use `MockCapabilities`.

mod local;

pub use local::LocalCapabilities;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

/// File metadata; timestamps are local time, `%Y-%m-%dT%H:%M:%S.ffffff`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStat {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub accessed: String,
    pub modified: String,
    pub created: String,
}

/// Options of the native file pickers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DialogOptions {
    pub title: Option<String>,
    pub initialdir: Option<String>,
    pub initialfile: Option<String>,
    /// `(label, pattern)` pairs, e.g. `("Text", "*.txt *.md")`
    pub filetypes: Vec<(String, String)>,
    pub defaultextension: Option<String>,
}

/// A process to launch: a command line split on whitespace, or program and arguments.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CommandArgs {
    Line(String),
    Argv(Vec<String>),
}

impl CommandArgs {
    /// Splits into program and arguments; `None` when there is no program.
    pub fn program_and_args(&self) -> Option<(String, Vec<String>)> {
        let mut parts: Vec<String> = match self {
            CommandArgs::Line(line) => line.split_whitespace().map(str::to_owned).collect(),
            CommandArgs::Argv(argv) => argv.clone(),
        };

        if parts.first().is_none_or(|program| program.is_empty()) {
            return None;
        }
        let program = parts.remove(0);
        Some((program, parts))
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Capabilities: Send + Sync {
    async fn read_text_file(&self, path: &str) -> Result<Bytes, ApiError>;

    async fn read_binary_file(&self, path: &str) -> Result<Bytes, ApiError>;

    async fn list_directory(&self, path: &str) -> Result<Vec<DirEntry>, ApiError>;

    async fn stat(&self, path: &str) -> Result<FileStat, ApiError>;

    /// Deletes every file it can; the result tells which deletions succeeded.
    async fn delete_files(&self, paths: Vec<String>) -> Vec<bool>;

    async fn make_directory(&self, path: &str, exist_ok: bool) -> Result<(), ApiError>;

    /// Removes an empty directory.
    async fn remove_directory(&self, path: &str) -> Result<(), ApiError>;

    async fn write_file(&self, path: &str, contents: Bytes) -> Result<(), ApiError>;

    /// Copies a file; a directory as `dest` receives a file of the same name.
    async fn copy_file(&self, src: &str, dest: &str) -> Result<(), ApiError>;

    async fn pick_open_file(&self, options: DialogOptions) -> Result<Option<String>, ApiError>;

    async fn pick_save_file(&self, options: DialogOptions) -> Result<Option<String>, ApiError>;

    async fn pick_folder(&self, options: DialogOptions) -> Result<Option<String>, ApiError>;

    /// Starts a process without waiting for it.
    async fn run_process(&self, command: CommandArgs) -> Result<(), ApiError>;

    fn relative_path(&self, path: &str) -> Result<String, ApiError>;

    fn request_exit(&self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn command_forms() {
        let line: CommandArgs = serde_json::from_value(json!("code  --new-window docs")).unwrap();
        assert_eq!(
            line.program_and_args(),
            Some(("code".to_string(), vec!["--new-window".to_string(), "docs".to_string()]))
        );

        let argv: CommandArgs = serde_json::from_value(json!(["open", "a b.txt"])).unwrap();
        assert_eq!(argv.program_and_args(), Some(("open".to_string(), vec!["a b.txt".to_string()])));

        assert_eq!(CommandArgs::Line("   ".into()).program_and_args(), None);
        assert_eq!(CommandArgs::Argv(vec![]).program_and_args(), None);
    }

    #[test]
    fn dialog_options_are_optional() {
        let options: DialogOptions =
            serde_json::from_value(json!({"title": "Open", "filetypes": [["Text", "*.txt"]]})).unwrap();

        assert_eq!(options.title.as_deref(), Some("Open"));
        assert_eq!(options.filetypes, vec![("Text".to_string(), "*.txt".to_string())]);
        assert_eq!(options.initialdir, None);
    }

    #[test]
    fn entry_serialization() {
        let entry = DirEntry { name: "a".into(), path: "/r/a".into(), kind: EntryKind::Folder };
        assert_eq!(serde_json::to_value(&entry).unwrap(), json!({"name": "a", "path": "/r/a", "type": "folder"}));
    }
}
