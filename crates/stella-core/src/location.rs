//! Addressable locations.
//!
//! A [`Location`] is a route id plus its parameters, encoded in the visible
//! URL as a fragment:
//!
//! ```text
//! #<routeId>/<key>=<value>/<key>=<value>...
//! ```
//!
//! Keys and values are percent-encoded so a `/` or `=` inside a value cannot
//! split a segment. Fragment parsing is lenient: a malformed `key=value`
//! segment is skipped rather than rejecting the whole location.
//!
//! [`DeepLink`] resolves an externally supplied absolute URL: the path names
//! the route and the query string carries the parameters.

use std::borrow::Cow;

use crate::{LocationError, Params, RouteId};

/// Route id plus parameters, as mirrored into the visible URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Route addressed by this location.
    pub route_id: RouteId,
    /// Parameters the route is entered with.
    pub params: Params,
}

impl Location {
    /// Create a location.
    pub fn new(route_id: RouteId, params: Params) -> Self {
        Self { route_id, params }
    }

    /// Encode as a URL fragment, including the leading `#`.
    pub fn to_fragment(&self) -> String {
        let mut fragment = format!("#{}", urlencoding::encode(self.route_id.as_str()));
        for (key, value) in &self.params {
            fragment.push('/');
            fragment.push_str(&urlencoding::encode(key));
            fragment.push('=');
            fragment.push_str(&urlencoding::encode(value));
        }
        fragment
    }

    /// Parse a URL fragment. The leading `#` is optional.
    ///
    /// Returns `None` if the fragment names no route.
    pub fn from_fragment(fragment: &str) -> Option<Self> {
        let body = fragment.strip_prefix('#').unwrap_or(fragment);
        let mut segments = body.split('/');

        let route = decode(segments.next()?);
        if route.is_empty() {
            return None;
        }

        let params = segments
            .filter_map(|segment| {
                let (key, value) = segment.split_once('=')?;
                if key.is_empty() {
                    return None;
                }
                Some((decode(key).into_owned(), decode(value).into_owned()))
            })
            .collect();

        Some(Self { route_id: RouteId::new(route.into_owned()), params })
    }

    /// Native history state object mirroring this location.
    pub fn state(&self) -> HistoryState {
        HistoryState { route_id: self.route_id.clone(), params: self.params.clone() }
    }
}

/// State object stored alongside a native history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryState {
    /// Route the entry points to.
    pub route_id: RouteId,
    /// Parameters of that route.
    pub params: Params,
}

impl From<HistoryState> for Location {
    fn from(state: HistoryState) -> Self {
        Self { route_id: state.route_id, params: state.params }
    }
}

/// Route candidate extracted from an external URL.
///
/// The candidate is not checked against any route table; callers fall back to
/// a default route when it is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    /// Candidate route id taken from the URL path.
    pub route_id: RouteId,
    /// Parameters taken from the query string.
    pub params: Params,
}

impl DeepLink {
    /// Parse an absolute URL such as
    /// `https://stella.app/product-detail?productId=7&storeId=2`.
    ///
    /// The path without its leading `/` is the route candidate. Any fragment
    /// is ignored.
    pub fn parse(url: &str) -> Result<Self, LocationError> {
        let (_, rest) =
            url.split_once("://").ok_or_else(|| LocationError::MissingScheme(url.to_string()))?;

        let rest = rest.split_once('#').map_or(rest, |(before, _)| before);
        let (authority_and_path, query) = rest.split_once('?').unwrap_or((rest, ""));
        let path = authority_and_path.split_once('/').map_or("", |(_, path)| path);
        let path = path.trim_end_matches('/');

        if path.is_empty() {
            return Err(LocationError::EmptyPath(url.to_string()));
        }

        Ok(Self { route_id: RouteId::new(decode(path).into_owned()), params: parse_query(query) })
    }
}

/// Parse an `a=1&b=2` query string. `+` decodes to a space.
pub fn parse_query(query: &str) -> Params {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if key.is_empty() {
                return None;
            }
            let key = decode(&key.replace('+', " ")).into_owned();
            let value = decode(&value.replace('+', " ")).into_owned();
            Some((key, value))
        })
        .collect()
}

/// Percent-decode, keeping the raw text when it is not valid UTF-8.
fn decode(raw: &str) -> Cow<'_, str> {
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn fragment_without_params() {
        let location = Location::new(RouteId::new("cart"), Params::new());
        assert_eq!(location.to_fragment(), "#cart");
    }

    #[test]
    fn fragment_with_params_is_ordered() {
        let location = Location::new(
            RouteId::new("product-detail"),
            params(&[("storeId", "2"), ("productId", "7")]),
        );
        assert_eq!(location.to_fragment(), "#product-detail/productId=7/storeId=2");
    }

    #[test]
    fn fragment_escapes_separators() {
        let location =
            Location::new(RouteId::new("store-list"), params(&[("q", "fruit/veg=fresh")]));
        let fragment = location.to_fragment();
        assert_eq!(fragment, "#store-list/q=fruit%2Fveg%3Dfresh");
        assert_eq!(Location::from_fragment(&fragment), Some(location));
    }

    #[test]
    fn fragment_parse_skips_malformed_segments() {
        let parsed = Location::from_fragment("#order-tracking/orderId=42/garbage/=x");
        assert_eq!(
            parsed,
            Some(Location::new(RouteId::new("order-tracking"), params(&[("orderId", "42")])))
        );
    }

    #[test]
    fn empty_fragment_names_no_route() {
        assert_eq!(Location::from_fragment(""), None);
        assert_eq!(Location::from_fragment("#"), None);
        assert_eq!(Location::from_fragment("#/a=b"), None);
    }

    #[test]
    fn deep_link_takes_route_from_path_and_params_from_query() {
        let link = DeepLink::parse("https://stella.app/product-detail?productId=7&storeId=2#top")
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(link.route_id, RouteId::new("product-detail"));
        assert_eq!(link.params, params(&[("productId", "7"), ("storeId", "2")]));
    }

    #[test]
    fn deep_link_decodes_query() {
        let link = DeepLink::parse("stella://open/store-list?q=fresh+fruit&tag=a%26b")
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert_eq!(link.route_id, RouteId::new("store-list"));
        assert_eq!(link.params, params(&[("q", "fresh fruit"), ("tag", "a&b")]));
    }

    #[test]
    fn deep_link_without_scheme_or_path_is_rejected() {
        assert!(matches!(DeepLink::parse("not a url"), Err(LocationError::MissingScheme(_))));
        assert!(matches!(
            DeepLink::parse("https://stella.app/"),
            Err(LocationError::EmptyPath(_))
        ));
        assert!(matches!(DeepLink::parse("https://stella.app"), Err(LocationError::EmptyPath(_))));
    }
}
