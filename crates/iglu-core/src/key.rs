//! # Schema Keys
//!
//! A schema key names exactly one schema document:
//!
//! ```text
//! iglu:com.acme/event/jsonschema/1-0-0
//!      └──┬───┘ └─┬─┘ └───┬────┘ └─┬─┘
//!       vendor   name   format  version
//! ```
//!
//! The key is parsed once at the boundary and is immutable afterwards.
//! Its canonical storage path replaces the dots of the vendor with `/`,
//! so `com.acme` is stored under `com/acme/event/jsonschema/1-0-0`. The same
//! path is used by embedded repositories on disk and by HTTP registries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IgluError;

/// URI scheme prefix of every schema key.
pub const IGLU_URI_SCHEME: &str = "iglu:";

/// SchemaVer version triple: `MODEL-REVISION-ADDITION`.
///
/// `MODEL` starts at 1; `REVISION` and `ADDITION` start at 0. Leading zeros
/// are rejected so each version has exactly one textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaVer {
    pub model: u32,
    pub revision: u32,
    pub addition: u32,
}

impl SchemaVer {
    /// Build a version from its three components.
    pub fn new(model: u32, revision: u32, addition: u32) -> Self {
        Self {
            model,
            revision,
            addition,
        }
    }
}

impl fmt::Display for SchemaVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.model, self.revision, self.addition)
    }
}

impl FromStr for SchemaVer {
    type Err = IgluError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 3 {
            return Err(IgluError::malformed(
                s,
                "version must have the form MODEL-REVISION-ADDITION",
            ));
        }
        let model = parse_component(s, parts[0], "model")?;
        let revision = parse_component(s, parts[1], "revision")?;
        let addition = parse_component(s, parts[2], "addition")?;
        if model == 0 {
            return Err(IgluError::malformed(s, "version model must start at 1"));
        }
        Ok(Self::new(model, revision, addition))
    }
}

fn parse_component(input: &str, part: &str, label: &str) -> Result<u32, IgluError> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IgluError::malformed(
            input,
            format!("version {label} {part:?} is not a non-negative integer"),
        ));
    }
    if part.len() > 1 && part.starts_with('0') {
        return Err(IgluError::malformed(
            input,
            format!("version {label} {part:?} has a leading zero"),
        ));
    }
    part.parse::<u32>().map_err(|e| {
        IgluError::malformed(input, format!("version {label} {part:?} out of range: {e}"))
    })
}

/// Validated reference to a single schema document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaKey {
    vendor: String,
    name: String,
    format: String,
    version: SchemaVer,
}

impl SchemaKey {
    /// Parse a key of the form `iglu:<vendor>/<name>/<format>/<version>`.
    ///
    /// # Errors
    ///
    /// Returns [`IgluError::MalformedIdentifier`] if the scheme is not
    /// `iglu:`, if any of the four segments is missing or empty, if a
    /// segment contains characters outside its permitted set, or if the
    /// version is not a valid SchemaVer.
    pub fn parse(text: &str) -> Result<Self, IgluError> {
        let rest = text
            .strip_prefix(IGLU_URI_SCHEME)
            .ok_or_else(|| IgluError::malformed(text, "missing iglu: scheme"))?;

        let segments: Vec<&str> = rest.split('/').collect();
        if segments.len() != 4 {
            return Err(IgluError::malformed(
                text,
                format!(
                    "expected vendor/name/format/version, found {} segment(s)",
                    segments.len()
                ),
            ));
        }

        let vendor = checked_segment(text, segments[0], "vendor", true)?;
        let name = checked_segment(text, segments[1], "name", false)?;
        let format = checked_segment(text, segments[2], "format", false)?;
        if segments[3].is_empty() {
            return Err(IgluError::malformed(text, "version segment is empty"));
        }
        let version = segments[3].parse::<SchemaVer>().map_err(|e| match e {
            IgluError::MalformedIdentifier { reason, .. } => IgluError::malformed(text, reason),
            other => other,
        })?;

        Ok(Self {
            vendor: vendor.to_string(),
            name: name.to_string(),
            format: format.to_string(),
            version,
        })
    }

    /// Dot-delimited vendor, e.g. `com.acme`.
    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn version(&self) -> SchemaVer {
        self.version
    }

    /// Storage path: `<vendor-with-slashes>/<name>/<format>/<version>`.
    pub fn canonical_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.vendor.replace('.', "/"),
            self.name,
            self.format,
            self.version
        )
    }

    /// Textual `iglu:` form of this key.
    pub fn to_uri(&self) -> String {
        self.to_string()
    }
}

fn checked_segment<'a>(
    input: &str,
    segment: &'a str,
    label: &str,
    allow_dots: bool,
) -> Result<&'a str, IgluError> {
    if segment.is_empty() {
        return Err(IgluError::malformed(input, format!("{label} segment is empty")));
    }
    let permitted =
        |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_' || (allow_dots && c == '.');
    if let Some(bad) = segment.chars().find(|c| !permitted(*c)) {
        return Err(IgluError::malformed(
            input,
            format!("{label} segment contains invalid character {bad:?}"),
        ));
    }
    Ok(segment)
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{IGLU_URI_SCHEME}{}/{}/{}/{}",
            self.vendor, self.name, self.format, self.version
        )
    }
}

impl FromStr for SchemaKey {
    type Err = IgluError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for SchemaKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_uri())
    }
}

impl<'de> Deserialize<'de> for SchemaKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
