use crate::{UrlError, UrlResult};
use url::Url;

/// Resolves a possibly-relative link against the URL of the page it was found on
///
/// # Resolution Steps
///
/// 1. Empty input resolves to `base` itself
/// 2. Input carrying a scheme (`https:`, `mailto:`, ...) is returned unchanged
/// 3. Query-only (`?x=1`) and fragment-only (`#top`) input is appended to `base`
/// 4. Otherwise the last path segment of `base` is dropped (or the whole path,
///    when the input starts with `/`), the input is joined on, and `//`, `/./`
///    and `/segment/../` sequences are collapsed until none remain
///
/// The port of `base` is carried over to the result. The path of `base` is
/// used as written, so characters such as spaces are not percent-encoded.
///
/// # Arguments
///
/// * `input` - The link to resolve
/// * `base` - Absolute URL of the page the link was found on
///
/// # Returns
///
/// * `Ok(String)` - The absolute URL
/// * `Err(UrlError)` - `base` could not be parsed or has no host
///
/// # Examples
///
/// ```
/// use byline_harvest::url::resolve;
///
/// let url = resolve("../c.html", "https://example.com/a/b/index.html").unwrap();
/// assert_eq!(url, "https://example.com/a/c.html");
///
/// let url = resolve("/about.html", "https://example.com/a/b/index.html").unwrap();
/// assert_eq!(url, "https://example.com/about.html");
/// ```
pub fn resolve(input: &str, base: &str) -> UrlResult<String> {
    if input.is_empty() {
        return Ok(base.to_string());
    }

    if has_scheme(input) {
        return Ok(input.to_string());
    }

    if input.starts_with('#') || input.starts_with('?') {
        return Ok(format!("{}{}", base, input));
    }

    let base_url = Url::parse(base).map_err(|e| UrlError::Parse(format!("{}: {}", base, e)))?;
    let host = base_url
        .host_str()
        .ok_or_else(|| UrlError::MissingHost(base.to_string()))?;

    let authority = match base_url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };

    let directory = if input.starts_with('/') {
        ""
    } else {
        parent_directory(raw_path(base))
    };

    let joined = format!("{}{}/{}", authority, directory, input);

    Ok(format!(
        "{}://{}",
        base_url.scheme(),
        collapse_segments(&joined)
    ))
}

/// Builds the URL of page `page` of a paginated articles listing
///
/// Listing pages live next to the first page as `articles-page=<n>.html`.
///
/// # Examples
///
/// ```
/// use byline_harvest::url::numbered_page_url;
///
/// let url = numbered_page_url("http://example.com/author/jane/articles.html", 3).unwrap();
/// assert_eq!(url, "http://example.com/author/jane/articles-page=3.html");
/// ```
pub fn numbered_page_url(articles_url: &str, page: u32) -> UrlResult<String> {
    let prefix = resolve("articles-page=", articles_url)?;
    Ok(format!("{}{}.html", prefix, page))
}

/// Returns true if `input` starts with a URI scheme (`ALPHA *(ALPHA / DIGIT / "+" / "-" / ".") ":"`)
pub fn has_scheme(input: &str) -> bool {
    let Some(colon) = input.find(':') else {
        return false;
    };

    let scheme = &input[..colon];
    let mut chars = scheme.chars();

    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// Path of `base` exactly as written, without percent-encoding it
///
/// Query and fragment are dropped; a URL with no path yields `/`.
fn raw_path(base: &str) -> &str {
    let after_scheme = base.find("://").map_or(base, |idx| &base[idx + 3..]);
    let path_and_rest = after_scheme
        .find(['/', '?', '#'])
        .map_or("", |idx| &after_scheme[idx..]);
    let path = path_and_rest
        .find(['?', '#'])
        .map_or(path_and_rest, |idx| &path_and_rest[..idx]);

    if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// Strips everything after the final `/` of a path, including the slash
fn parent_directory(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Collapses `//`, `/./` and `/segment/../` until the string stops changing
fn collapse_segments(joined: &str) -> String {
    let mut current = joined.to_string();

    loop {
        let next = collapse_parent_ref(&current.replace("//", "/").replace("/./", "/"));
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Removes the first `/segment/../` pair whose segment is not itself a `..`
fn collapse_parent_ref(path: &str) -> String {
    let mut search_from = 0;

    while let Some(offset) = path[search_from..].find("/../") {
        let dots = search_from + offset;

        if let Some(start) = path[..dots].rfind('/') {
            let segment = &path[start + 1..dots];
            if !segment.is_empty() && !segment.starts_with("..") {
                return format!("{}/{}", &path[..start], &path[dots + 4..]);
            }
        }

        search_from = dots + 1;
    }

    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://example.com/authors/jane/index.html";

    #[test]
    fn test_empty_input_returns_base() {
        assert_eq!(resolve("", BASE).unwrap(), BASE);
    }

    #[test]
    fn test_absolute_input_unchanged() {
        let absolute = "https://other.org/x/../y";
        assert_eq!(resolve(absolute, BASE).unwrap(), absolute);
        assert_eq!(
            resolve("mailto:jane@example.com", BASE).unwrap(),
            "mailto:jane@example.com"
        );
    }

    #[test]
    fn test_query_and_fragment_appended() {
        assert_eq!(resolve("?page=2", BASE).unwrap(), format!("{}?page=2", BASE));
        assert_eq!(resolve("#bio", BASE).unwrap(), format!("{}#bio", BASE));
    }

    #[test]
    fn test_relative_to_directory() {
        assert_eq!(
            resolve("articles.html", BASE).unwrap(),
            "http://example.com/authors/jane/articles.html"
        );
    }

    #[test]
    fn test_base_path_kept_as_written() {
        let base = "http://example.com/a b/c.html";
        assert_eq!(resolve("d.html", base).unwrap(), "http://example.com/a b/d.html");
        assert_eq!(resolve("?x=1", base).unwrap(), "http://example.com/a b/c.html?x=1");
    }

    #[test]
    fn test_base_query_and_fragment_ignored() {
        assert_eq!(
            resolve("d.html", "http://example.com/a/c.html?q=/x/y#top").unwrap(),
            "http://example.com/a/d.html"
        );
        assert_eq!(
            resolve("d.html", "http://example.com").unwrap(),
            "http://example.com/d.html"
        );
    }

    #[test]
    fn test_root_relative_discards_base_path() {
        assert_eq!(
            resolve("/news/item.html", BASE).unwrap(),
            "http://example.com/news/item.html"
        );
    }

    #[test]
    fn test_parent_segments_collapse() {
        assert_eq!(
            resolve("../../news/item.html", BASE).unwrap(),
            "http://example.com/news/item.html"
        );
        assert_eq!(
            resolve("/a/b/../c", BASE).unwrap(),
            "http://example.com/a/c"
        );
    }

    #[test]
    fn test_duplicate_slashes_and_dot_segments_collapse() {
        assert_eq!(
            resolve("x//y/./z.html", BASE).unwrap(),
            "http://example.com/authors/jane/x/y/z.html"
        );
    }

    #[test]
    fn test_parent_above_root_is_kept() {
        assert_eq!(
            resolve("../../../x.html", BASE).unwrap(),
            "http://example.com/../x.html"
        );
    }

    #[test]
    fn test_base_without_path() {
        assert_eq!(
            resolve("authors.html", "http://example.com").unwrap(),
            "http://example.com/authors.html"
        );
    }

    #[test]
    fn test_port_is_preserved() {
        assert_eq!(
            resolve("b.html", "http://127.0.0.1:8080/dir/a.html").unwrap(),
            "http://127.0.0.1:8080/dir/b.html"
        );
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(
            resolve("a.html", "not a url"),
            Err(UrlError::Parse(_))
        ));
    }

    #[test]
    fn test_has_scheme() {
        assert!(has_scheme("http://example.com"));
        assert!(has_scheme("svn+ssh://host/repo"));
        assert!(!has_scheme("articles-page=2.html"));
        assert!(!has_scheme("/path:with-colon"));
        assert!(!has_scheme("1http://nope"));
    }

    #[test]
    fn test_numbered_page_url() {
        assert_eq!(
            numbered_page_url("http://example.com/author/jane/articles.html", 2).unwrap(),
            "http://example.com/author/jane/articles-page=2.html"
        );
    }
}
