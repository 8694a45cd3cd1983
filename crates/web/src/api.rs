//! The API route handlers.
//!
//! Each handler decodes its single argument, makes one capability call and describes the
//! reply. [`route_table`] registers all of them.

use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use mime::Mime;
use serde::Deserialize;

use crate::args::{Args, require};
use crate::capability::{Capabilities, CommandArgs, DialogOptions};
use crate::error::{ApiError, RouteError};
use crate::handler::handler_fn;
use crate::reply::Reply;
use crate::router::RouteTable;

type Caps = Arc<dyn Capabilities>;

pub fn route_table() -> Result<RouteTable, RouteError> {
    RouteTable::builder()
        .register("fs_readtext", handler_fn(fs_readtext))
        .register("fs_readbinary", handler_fn(fs_readbinary))
        .register("fs_readfolder", handler_fn(fs_readfolder))
        .register("fs_getstats", handler_fn(fs_getstats))
        .register("fs_deletefile", handler_fn(fs_deletefile))
        .register("fs_makefolder", handler_fn(fs_makefolder))
        .register("fs_deletefolder", handler_fn(fs_deletefolder))
        .register("fs_writefile", handler_fn(fs_writefile))
        .register("fs_copyfile", handler_fn(fs_copyfile))
        .register("fs_relativepath", handler_fn(fs_relativepath))
        .register("ui_chooseopenfile", handler_fn(ui_chooseopenfile))
        .register("ui_choosesavefile", handler_fn(ui_choosesavefile))
        .register("ui_choosefolder", handler_fn(ui_choosefolder))
        .register("exit", handler_fn(exit))
        .register("command", handler_fn(command))
        .build()
}

/// Reads a file and answers its bytes unchanged under `content_type`.
pub async fn read_text_as(caps: &dyn Capabilities, path: &str, content_type: Mime) -> Result<Reply, ApiError> {
    let contents = caps.read_text_file(path).await?;
    Ok(Reply::bytes(StatusCode::OK, content_type, contents))
}

async fn fs_readtext(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    let path: String = require(args)?;
    read_text_as(caps.as_ref(), &path, mime::TEXT_PLAIN).await
}

async fn fs_readbinary(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    let path: String = require(args)?;
    let contents = caps.read_binary_file(&path).await?;
    Ok(Reply::bytes(StatusCode::OK, mime::APPLICATION_OCTET_STREAM, contents))
}

async fn fs_readfolder(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    let path: String = require(args)?;
    let entries = caps.list_directory(&path).await?;
    Ok(Reply::text(StatusCode::OK, mime::APPLICATION_JSON, serde_json::to_string(&entries)?))
}

async fn fs_getstats(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    let path: String = require(args)?;
    let stat = caps.stat(&path).await?;
    Ok(Reply::text(StatusCode::OK, mime::APPLICATION_JSON, serde_json::to_string(&stat)?))
}

async fn fs_deletefile(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    let paths: Vec<String> = require(args)?;
    let deleted = caps.delete_files(paths).await;
    Ok(Reply::text(StatusCode::OK, mime::APPLICATION_JSON, serde_json::to_string(&deleted)?))
}

#[derive(Debug, Deserialize)]
struct MakeFolder {
    path: String,
    #[serde(default)]
    exist_ok: bool,
}

async fn fs_makefolder(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    let MakeFolder { path, exist_ok } = require(args)?;
    caps.make_directory(&path, exist_ok).await?;
    Ok(Reply::empty(StatusCode::OK))
}

async fn fs_deletefolder(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    let path: String = require(args)?;
    caps.remove_directory(&path).await?;
    Ok(Reply::empty(StatusCode::OK))
}

#[derive(Debug, Deserialize)]
struct WriteFile {
    path: String,
    contents: String,
}

async fn fs_writefile(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    let (path, contents) = match args.ok_or(ApiError::MissingArgument)? {
        // multipart contents are written verbatim, only the path has to be text
        Args::Form(mut fields) => {
            let path = fields.remove("path").ok_or_else(|| ApiError::invalid_argument("missing field `path`"))?;
            let path = String::from_utf8(path.to_vec())
                .map_err(|e| ApiError::invalid_argument(format!("field `path` is not utf-8: {e}")))?;
            let contents =
                fields.remove("contents").ok_or_else(|| ApiError::invalid_argument("missing field `contents`"))?;
            (path, contents)
        }
        json @ Args::Json(_) => {
            let WriteFile { path, contents } = json.parse()?;
            (path, Bytes::from(contents))
        }
    };

    caps.write_file(&path, contents).await?;
    Ok(Reply::empty(StatusCode::OK))
}

#[derive(Debug, Deserialize)]
struct CopyFile {
    src: String,
    dest: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CopyFiles {
    One(CopyFile),
    Many(Vec<CopyFile>),
}

async fn fs_copyfile(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    let copies = match require(args)? {
        CopyFiles::One(copy) => vec![copy],
        CopyFiles::Many(copies) => copies,
    };

    for CopyFile { src, dest } in copies {
        caps.copy_file(&src, &dest).await?;
    }
    Ok(Reply::empty(StatusCode::OK))
}

async fn fs_relativepath(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    let path: String = require(args)?;
    Ok(Reply::text(StatusCode::OK, mime::TEXT_PLAIN, caps.relative_path(&path)?))
}

fn dialog_options(args: Option<Args>) -> Result<DialogOptions, ApiError> {
    args.map(Args::parse).transpose().map(Option::unwrap_or_default)
}

/// A cancelled dialog answers an empty path.
fn picked(path: Option<String>) -> Reply {
    Reply::text(StatusCode::OK, mime::TEXT_PLAIN, path.unwrap_or_default())
}

async fn ui_chooseopenfile(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    Ok(picked(caps.pick_open_file(dialog_options(args)?).await?))
}

async fn ui_choosesavefile(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    Ok(picked(caps.pick_save_file(dialog_options(args)?).await?))
}

async fn ui_choosefolder(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    Ok(picked(caps.pick_folder(dialog_options(args)?).await?))
}

async fn exit(caps: Caps, _args: Option<Args>) -> Result<Reply, ApiError> {
    caps.request_exit();
    Ok(Reply::empty(StatusCode::NO_CONTENT))
}

async fn command(caps: Caps, args: Option<Args>) -> Result<Reply, ApiError> {
    let command: CommandArgs = require(args)?;
    caps.run_process(command).await?;
    Ok(Reply::text(StatusCode::OK, mime::TEXT_PLAIN, "done"))
}
