use axum::http::HeaderValue;
use reqwest::Url;

/// True iff `s` parses as an absolute URL with the `https` scheme.
///
/// The host is not checked: any HTTPS destination is accepted, which leaves
/// `GET /?redirect=` usable as an open redirect.
pub fn is_valid_https_url(s: &str) -> bool {
    Url::parse(s).map_or(false, |url| url.scheme() == "https")
}

/// `Location` value for a validated target.
///
/// The target is used verbatim when it is a legal header value, otherwise its
/// normalized serialization is used.
pub fn location(target: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(target).ok().or_else(|| {
        let url = Url::parse(target).ok()?;
        HeaderValue::from_str(url.as_str()).ok()
    })
}
