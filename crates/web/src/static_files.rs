//! Files of the web page, served for every GET outside `/api/`.

use std::io;
use std::path::{Component, Path, PathBuf};

use http::StatusCode;
use mime::Mime;
use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};
use tokio::fs;
use tracing::debug;

use crate::reply::Reply;

const INDEX_FILE: &str = "index.html";

/// Bytes escaped in the links of a directory listing.
const PATH_SEGMENT: &AsciiSet =
    &CONTROLS.add(b' ').add(b'"').add(b'#').add(b'%').add(b'/').add(b'<').add(b'>').add(b'?').add(b'`').add(b'{').add(b'}');

#[derive(Debug, Clone)]
pub struct StaticFiles {
    base: PathBuf,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base: base.into() }
    }

    /// Maps a URL path below `base`.
    ///
    /// Each segment is percent-decoded first; parent, root and prefix components are rejected
    /// after decoding, so `%2e%2e` and `%2F` can't escape the base either.
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut path = self.base.clone();
        for segment in url_path.split('/').filter(|segment| !segment.is_empty()) {
            let decoded = percent_decode_str(segment).decode_utf8().ok()?;
            for component in Path::new(&*decoded).components() {
                match component {
                    Component::Normal(name) => path.push(name),
                    Component::CurDir => {}
                    _ => return None,
                }
            }
        }
        Some(path)
    }

    fn content_type(path: &Path) -> Mime {
        let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("html" | "htm") => mime::TEXT_HTML,
            Some("css") => mime::TEXT_CSS,
            Some("js" | "mjs") => mime::TEXT_JAVASCRIPT,
            Some("json") => mime::APPLICATION_JSON,
            Some("txt") => mime::TEXT_PLAIN,
            Some("svg") => mime::IMAGE_SVG,
            Some("png") => mime::IMAGE_PNG,
            Some("jpg" | "jpeg") => mime::IMAGE_JPEG,
            Some("gif") => mime::IMAGE_GIF,
            Some("ico") => "image/x-icon".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
            Some("wasm") => "application/wasm".parse().unwrap_or(mime::APPLICATION_OCTET_STREAM),
            _ => mime::APPLICATION_OCTET_STREAM,
        }
    }

    /// A directory answers its `index.html`, or a listing when it has none.
    pub async fn load(&self, url_path: &str) -> io::Result<(Vec<u8>, Mime)> {
        let path = self.map_path(url_path).ok_or_else(|| io::Error::from(io::ErrorKind::PermissionDenied))?;
        if !fs::metadata(&path).await?.is_dir() {
            let bytes = fs::read(&path).await?;
            return Ok((bytes, Self::content_type(&path)));
        }

        match fs::read(path.join(INDEX_FILE)).await {
            Ok(bytes) => Ok((bytes, mime::TEXT_HTML)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let listing = list_directory(&path, url_path).await?;
                Ok((listing.into_bytes(), mime::TEXT_HTML_UTF_8))
            }
            Err(e) => Err(e),
        }
    }

    /// Answers the file, or `404 file not found`.
    pub async fn serve(&self, url_path: &str) -> Reply {
        match self.load(url_path).await {
            Ok((bytes, content_type)) => Reply::bytes(StatusCode::OK, content_type, bytes),
            Err(e) => {
                debug!(path = url_path, cause = %e, "static file not served");
                Reply::text(StatusCode::NOT_FOUND, mime::TEXT_PLAIN, "file not found")
            }
        }
    }
}

async fn list_directory(dir: &Path, url_path: &str) -> io::Result<String> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let is_dir = entry.file_type().await?.is_dir();
        entries.push((entry.file_name().to_string_lossy().into_owned(), is_dir));
    }
    entries.sort_by_key(|(name, _)| name.to_lowercase());

    let base = if url_path.ends_with('/') { url_path.to_string() } else { format!("{url_path}/") };
    let title = escape_html(&percent_decode_str(url_path).decode_utf8_lossy());

    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Directory listing for {title}</title>\n</head>\n\
         <body>\n<h1>Directory listing for {title}</h1>\n<hr>\n<ul>\n"
    );
    for (name, is_dir) in entries {
        let slash = if is_dir { "/" } else { "" };
        let href = escape_html(&format!("{base}{}{slash}", utf8_percent_encode(&name, PATH_SEGMENT)));
        html.push_str(&format!("<li><a href=\"{href}\">{}{slash}</a></li>\n", escape_html(&name)));
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");

    Ok(html)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}
