use crate::{UrlError, UrlResult};
use url::Url;

/// Scheme prefixes that mark a reference as already absolute
const SCHEME_PREFIXES: &[&str] = &["http://", "https://"];

/// Returns true if the reference carries its own scheme (or is
/// protocol-relative) and therefore points at a fixed location
pub fn is_absolute_reference(reference: &str) -> bool {
    let lower = reference.trim_start().to_ascii_lowercase();
    SCHEME_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) || lower.starts_with("//")
}

/// Resolves a page-relative reference into an absolute URL on the site
///
/// # Resolution Steps
///
/// 1. A reference that already carries a scheme is returned unchanged
/// 2. A protocol-relative reference (`//host/path`) takes the scheme of `base_url`
/// 3. A rooted reference (`/path`) is joined directly onto `base_url`
/// 4. Anything else is joined onto the directory of `current_url`'s path,
///    after which `..` and `.` segments are collapsed
///
/// # Arguments
///
/// * `base_url` - Scheme and host of the site root, e.g. `http://site`
/// * `current_url` - Absolute URL of the page the reference was found on
/// * `reference` - The raw reference as it appeared in the markup
///
/// # Examples
///
/// ```
/// use site_mirror::url::resolve;
///
/// let url = resolve("http://site", "http://site/test/index.html", "../index.html").unwrap();
/// assert_eq!(url, "http://site/index.html");
///
/// let url = resolve("http://site", "http://site/test/index.html", "index.html").unwrap();
/// assert_eq!(url, "http://site/test/index.html");
/// ```
pub fn resolve(base_url: &str, current_url: &str, reference: &str) -> UrlResult<String> {
    let reference = reference.trim();

    if SCHEME_PREFIXES
        .iter()
        .any(|prefix| reference.to_ascii_lowercase().starts_with(prefix))
    {
        return Ok(reference.to_string());
    }

    let base = base_url.trim_end_matches('/');

    let joined = if let Some(rest) = reference.strip_prefix("//") {
        let scheme = base.split("://").next().unwrap_or("http");
        format!("{}://{}", scheme, rest)
    } else if reference.starts_with('/') {
        format!("{}{}", base, reference)
    } else {
        let current = Url::parse(current_url)
            .map_err(|e| UrlError::Parse(format!("{}: {}", current_url, e)))?;
        format!("{}{}/{}", base, directory_of(current.path()), reference)
    };

    let mut absolute =
        Url::parse(&joined).map_err(|e| UrlError::Parse(format!("{}: {}", joined, e)))?;
    absolute.set_fragment(None);

    Ok(absolute.to_string())
}

/// Drops a trailing `#fragment`, which names a spot inside a resource and
/// never a different resource
///
/// # Examples
///
/// ```
/// use site_mirror::url::without_fragment;
///
/// assert_eq!(without_fragment("http://site/a.html#reviews"), "http://site/a.html");
/// assert_eq!(without_fragment("http://site/a.html"), "http://site/a.html");
/// ```
pub fn without_fragment(url: &str) -> &str {
    match url.split_once('#') {
        Some((resource, _)) => resource,
        None => url,
    }
}

/// Derives the site root (`scheme://host[:port]`) from any URL on the site
///
/// # Examples
///
/// ```
/// use site_mirror::url::site_root;
///
/// let root = site_root("http://books.toscrape.com/index.html").unwrap();
/// assert_eq!(root, "http://books.toscrape.com");
/// ```
pub fn site_root(url: &str) -> UrlResult<String> {
    let parsed = Url::parse(url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            parsed.scheme()
        )));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| UrlError::MissingHost(url.to_string()))?;

    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

/// Returns true if `url` lives under the site rooted at `base_url`
pub fn is_on_site(base_url: &str, url: &str) -> bool {
    match (site_root(base_url), site_root(url)) {
        (Ok(base), Ok(candidate)) => base.eq_ignore_ascii_case(&candidate),
        _ => false,
    }
}

/// Path with its last segment removed, without a trailing separator
///
/// `/test/index.html` becomes `/test`, `/index.html` and `/` become empty.
fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}
