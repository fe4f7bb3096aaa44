//! Intercepted request shape.
//!
//! The page hands every outgoing request to the engine as a [`RequestInfo`]:
//! method, URL, destination type, and headers. Matching is driven entirely by
//! these static attributes.

use std::collections::BTreeMap;

use url::Url;

/// HTTP method of an intercepted request.
///
/// Only GET-shaped reads are eligible for caching; everything else passes
/// through to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Options => "OPTIONS",
        }
    }
}

/// What kind of resource the request is for.
///
/// `Document` marks a full-page navigation; the rest are sub-resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Other,
}

/// An intercepted request.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub url: Url,
    pub destination: Destination,
    pub headers: BTreeMap<String, String>,
}

impl RequestInfo {
    pub fn new(method: Method, url: Url, destination: Destination) -> Self {
        Self { method, url, destination, headers: BTreeMap::new() }
    }

    /// A GET request for a sub-resource or API read.
    pub fn get(url: Url, destination: Destination) -> Self {
        Self::new(Method::Get, url, destination)
    }

    /// A full-page navigation request.
    pub fn navigation(url: Url) -> Self {
        Self::new(Method::Get, url, Destination::Document)
    }

    pub fn is_navigation(&self) -> bool {
        self.destination == Destination::Document
    }
}
