use crate::{UrlError, UrlResult};
use url::Url;

/// Returns the base of an address: `scheme://host[:port]`
///
/// Path, query and fragment are stripped. Default ports are omitted, as in
/// the serialized origin of the URL.
///
/// # Examples
///
/// ```
/// use tiercrawl::url::base_url;
///
/// assert_eq!(base_url("https://oda.com/no/products/123").unwrap(), "https://oda.com");
/// assert_eq!(base_url("http://example.com:8080/").unwrap(), "http://example.com:8080");
/// ```
pub fn base_url(address: &str) -> UrlResult<String> {
    let url = parse_http(address)?;
    Ok(url.origin().ascii_serialization())
}

/// Resolves a link reference into an absolute address
///
/// # Resolution Rules
///
/// 1. A reference that already carries a scheme is taken as absolute; the
///    base is not consulted and may be empty
/// 2. Any other reference is joined onto `base` with standard URL-join
///    semantics, so dot segments are resolved and `test`, `/test` and
///    `./test` all land under the base root
/// 3. The empty reference resolves to the base itself
/// 4. The fragment is dropped
/// 5. Only HTTP and HTTPS results are accepted
///
/// # Examples
///
/// ```
/// use tiercrawl::url::to_absolute_url;
///
/// let url = to_absolute_url("https://oda.com", "./test/some/../other").unwrap();
/// assert_eq!(url, "https://oda.com/test/other");
/// ```
pub fn to_absolute_url(base: &str, reference: &str) -> UrlResult<String> {
    let reference = reference.trim();

    let mut url = match Url::parse(reference) {
        Ok(absolute) => absolute,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = parse_http(base)?;
            base.join(reference)
                .map_err(|e| UrlError::Parse(format!("{}: {}", reference, e)))?
        }
        Err(e) => return Err(UrlError::Parse(format!("{}: {}", reference, e))),
    };

    check_scheme(&url)?;
    url.set_fragment(None);

    Ok(url.to_string())
}

fn parse_http(address: &str) -> UrlResult<Url> {
    let url = Url::parse(address).map_err(|e| UrlError::Parse(format!("{}: {}", address, e)))?;
    check_scheme(&url)?;

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

fn check_scheme(url: &Url) -> UrlResult<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            other
        ))),
    }
}
