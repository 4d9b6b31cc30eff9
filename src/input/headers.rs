//! Request header extraction
//!
//! Pulls the bearer credential and the proxy-supplied visitor location
//! out of an inbound request's headers.

use std::collections::HashMap;
use std::num::ParseFloatError;
use thiserror::Error;

use crate::models::Coordinates;

pub const AUTHORIZATION_HEADER: &str = "Authorization";
/// Visitor longitude added by the edge proxy
pub const LONGITUDE_HEADER: &str = "Cf-Iplongitude";
/// Visitor latitude added by the edge proxy
pub const LATITUDE_HEADER: &str = "Cf-Iplatitude";

/// Errors that can occur while reading request headers
#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("Header {header:?} is missing")]
    Missing { header: String },

    #[error("Parsing {header:?} header: {source}")]
    InvalidNumber {
        header: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("Malformed header line: {0:?}")]
    MalformedLine(String),
}

impl HeaderError {
    /// Name of the header the error refers to, if any
    pub fn header(&self) -> Option<&str> {
        match self {
            HeaderError::Missing { header } | HeaderError::InvalidNumber { header, .. } => {
                Some(header.as_str())
            }
            HeaderError::MalformedLine(_) => None,
        }
    }
}

/// Case-insensitive view over a request's headers
///
/// Like HTTP header lookups, `get` returns the first value seen for a name.
#[derive(Debug, Clone, Default)]
pub struct RequestHeaders {
    headers: HashMap<String, String>,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header; later values for an existing name are ignored
    pub fn append(&mut self, name: &str, value: &str) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Build from raw `Name: value` lines
    pub fn from_lines<'a, I>(lines: I) -> Result<Self, HeaderError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut headers = Self::new();
        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| HeaderError::MalformedLine(line.to_string()))?;
            let name = name.trim();
            if name.is_empty() {
                return Err(HeaderError::MalformedLine(line.to_string()));
            }
            headers.append(name, value.trim());
        }
        Ok(headers)
    }

    /// Bearer token carried by `header_name`
    pub fn bearer_token(&self, header_name: &str) -> Option<&str> {
        bearer_token(self.get(header_name))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for RequestHeaders {
    fn from_iter<T: IntoIterator<Item = (&'a str, &'a str)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.append(name, value);
        }
        headers
    }
}

/// Extract the token from an `Authorization: Bearer <token>` value
///
/// The scheme is matched case-insensitively. Anything other than exactly
/// two space-separated segments yields `None`.
pub fn bearer_token(header_value: Option<&str>) -> Option<&str> {
    let mut parts = header_value?.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

/// Reads the visitor coordinates the edge proxy attaches to each request
#[derive(Debug, Clone)]
pub struct GeoHeaderExtractor {
    longitude_header: String,
    latitude_header: String,
}

impl GeoHeaderExtractor {
    pub fn new(longitude_header: impl Into<String>, latitude_header: impl Into<String>) -> Self {
        GeoHeaderExtractor {
            longitude_header: longitude_header.into(),
            latitude_header: latitude_header.into(),
        }
    }

    pub fn longitude_header(&self) -> &str {
        &self.longitude_header
    }

    pub fn latitude_header(&self) -> &str {
        &self.latitude_header
    }

    /// Parse both headers as decimal degrees, longitude first
    pub fn coordinates(&self, headers: &RequestHeaders) -> Result<Coordinates, HeaderError> {
        let longitude = parse_degrees(headers, &self.longitude_header)?;
        let latitude = parse_degrees(headers, &self.latitude_header)?;
        Ok(Coordinates::new(longitude, latitude))
    }
}

impl Default for GeoHeaderExtractor {
    fn default() -> Self {
        Self::new(LONGITUDE_HEADER, LATITUDE_HEADER)
    }
}

fn parse_degrees(headers: &RequestHeaders, name: &str) -> Result<f64, HeaderError> {
    let value = headers.get(name).ok_or_else(|| HeaderError::Missing {
        header: name.to_string(),
    })?;

    value.parse::<f64>().map_err(|source| HeaderError::InvalidNumber {
        header: name.to_string(),
        source,
    })
}
