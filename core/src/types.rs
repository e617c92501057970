//! Domain DTOs for the QR code record service.
//!
//! # Design
//! Field names follow the service's JSON (`_id`, `type`, `customization`,
//! `qrCodeUrl`); the Rust side uses the domain names `id`, `kind`, `style`
//! and `artifact_uri`. These types are defined independently from the
//! mock-server crate; integration tests catch schema drift.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned opaque record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// What the encoded content is. Fixed when a record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    #[default]
    Url,
    Text,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Url => "url",
            RecordKind::Text => "text",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "url" => Ok(RecordKind::Url),
            "text" => Ok(RecordKind::Text),
            other => Err(format!("unknown record kind '{other}' (expected url or text)")),
        }
    }
}

/// A `#rrggbb` colour.
///
/// Deserialization is lenient: anything that is not six hex digits after a
/// `#` reads as the default black, matching how the service's clients treat
/// a missing colour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    pub const DEFAULT: &'static str = "#000000";

    /// Parse a strict `#rrggbb` value. The result is lowercased.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#')?;
        if digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(format!("#{}", digits.to_ascii_lowercase())))
        } else {
            None
        }
    }

    /// Parse, falling back to the default colour when malformed.
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for HexColor {
    fn default() -> Self {
        Self(Self::DEFAULT.to_string())
    }
}

impl From<String> for HexColor {
    fn from(s: String) -> Self {
        Self::parse_or_default(&s)
    }
}

impl From<HexColor> for String {
    fn from(c: HexColor) -> Self {
        c.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Visual customization of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default)]
    pub color: HexColor,
}

impl Style {
    pub fn with_color(color: HexColor) -> Self {
        Self { color }
    }
}

/// A single record as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "_id")]
    pub id: RecordId,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub content: String,
    #[serde(rename = "customization", default)]
    pub style: Style,
}

/// Request payload for create and update. Update sends the record's
/// existing `kind` unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayload {
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub content: String,
    #[serde(rename = "customization")]
    pub style: Style,
}

/// Response of a successful create: the stored record plus the generated
/// artifact, which is only ever returned here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedRecord {
    #[serde(flatten)]
    pub record: Record,
    #[serde(rename = "qrCodeUrl")]
    pub artifact_uri: String,
}

/// Registration request for the external credential source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Login request for the external credential source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
