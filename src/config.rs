use crate::error::ConfigError;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Contact,
    Value,
}

/// What to do when the remote service reports that an id already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExistingPolicy {
    #[default]
    Skip,
    Update,
    Warn,
    Exit,
}

impl FromStr for ExistingPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Self::Skip),
            "update" => Ok(Self::Update),
            "warn" => Ok(Self::Warn),
            "exit" => Ok(Self::Exit),
            other => Err(ConfigError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for ExistingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Skip => "skip",
            Self::Update => "update",
            Self::Warn => "warn",
            Self::Exit => "exit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEncoding {
    Ascii,
    Latin1,
    Ucs2,
    #[default]
    Utf8,
}

impl TextEncoding {
    pub fn encoding(&self) -> &'static encoding_rs::Encoding {
        match self {
            // windows-1252 is a superset of both and never fails to decode a byte
            Self::Ascii | Self::Latin1 => encoding_rs::WINDOWS_1252,
            Self::Ucs2 => encoding_rs::UTF_16LE,
            Self::Utf8 => encoding_rs::UTF_8,
        }
    }
}

impl FromStr for TextEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(Self::Ascii),
            "latin1" | "binary" => Ok(Self::Latin1),
            "ucs2" | "ucs-2" | "utf16le" | "utf-16le" => Ok(Self::Ucs2),
            "utf8" | "utf-8" => Ok(Self::Utf8),
            _ => Err(ConfigError::UnknownEncoding(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    #[default]
    Info,
    Debug,
}

/// CSV column names for each logical field. `None` means the field is omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMapping {
    pub id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub code: Option<String>,
    pub balance: Option<String>,
    pub currency: Option<String>,
    pub contact_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub kind: EntityKind,
    pub source_file: PathBuf,
    pub fields: FieldMapping,
    pub fixed_currency: Option<String>,
    pub dry_run: bool,
    pub existing: ExistingPolicy,
    pub encoding: TextEncoding,
    pub verbosity: Verbosity,
}

impl ImportConfig {
    pub fn new(kind: EntityKind, source_file: impl Into<PathBuf>, fields: FieldMapping) -> Self {
        Self {
            kind,
            source_file: source_file.into(),
            fields,
            fixed_currency: None,
            dry_run: false,
            existing: ExistingPolicy::default(),
            encoding: TextEncoding::default(),
            verbosity: Verbosity::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let noun = match self.kind {
            EntityKind::Contact => "Contact",
            EntityKind::Value => "Value",
        };
        if !is_set(&self.fields.id) {
            return Err(ConfigError::MissingIdField(noun));
        }
        if self.kind == EntityKind::Value
            && is_set(&self.fixed_currency) == is_set(&self.fields.currency)
        {
            return Err(ConfigError::AmbiguousCurrency);
        }
        Ok(())
    }
}

fn is_set(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.is_empty())
}
