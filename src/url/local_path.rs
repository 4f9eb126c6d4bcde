use crate::{UrlError, UrlResult};
use std::path::{Path, PathBuf};
use url::Url;

/// File name used when a URL path names a directory
const DIRECTORY_INDEX: &str = "index.html";

/// Maps a resource URL onto its mirrored location under `root`
///
/// The URL's path component, stripped of its leading separator, is joined
/// under the output root. Paths that name a directory (empty or ending in
/// `/`) are stored as `index.html` inside that directory. Percent-encoded
/// segments are decoded so the on-disk name matches the server's name.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use site_mirror::url::local_path;
///
/// let path = local_path(Path::new("Output"), "http://site/catalogue/foo.html").unwrap();
/// assert_eq!(path, Path::new("Output/catalogue/foo.html"));
/// ```
pub fn local_path(root: &Path, url: &str) -> UrlResult<PathBuf> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;

    let mut path = root.to_path_buf();
    let segments: Vec<&str> = match parsed.path_segments() {
        Some(segments) => segments.collect(),
        None => return Err(UrlError::MissingHost(url.to_string())),
    };

    for segment in &segments {
        if segment.is_empty() {
            continue;
        }
        let decoded = decode_segment(segment);
        // The URL parser already collapsed dot segments; anything left is literal
        if decoded == "." || decoded == ".." {
            continue;
        }
        path.push(decoded);
    }

    if segments.last().map_or(true, |last| last.is_empty()) {
        path.push(DIRECTORY_INDEX);
    }

    Ok(path)
}

/// Decodes `%XX` escapes in a single path segment, leaving separators encoded
fn decode_segment(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                if byte != b'/' && byte != b'\\' {
                    decoded.push(byte);
                    i += 3;
                    continue;
                }
            }
        }
        decoded.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&decoded).into_owned()
}
