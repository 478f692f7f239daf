use std::fs;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{Chainable, ErrorDetail, Result};

/// A serde data format that documents are read from or written to.
pub trait Format: Sized {
    /// The data format's error type.
    type Error: ErrorDetail + 'static;

    /// Parses `string` as the data format `Self` as a `T`.
    fn from_str<T: DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    /// Reads and parses the file at `path`.
    fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
        let string = fs::read_to_string(path).chain_with(|| error! {
            "failed to open file for reading",
            "file path" => path.display(),
        })?;

        Self::from_str(&string).chain_with(|| error! {
            "failed to parse file",
            "file path" => path.display(),
        })
    }

    /// Like [`Format::read()`] but yields `Ok(None)` if `path` doesn't exist.
    fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        match path.exists() {
            true => Self::read(path).map(Some),
            false => Ok(None),
        }
    }
}

macro_rules! impl_format {
    ($name:ident : $func:expr, $E:ty) => (
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Toml: toml::from_str, toml::de::Error);
impl_format!(Json: serde_json::from_str, serde_json::Error);

impl Json {
    /// Serializes `value` to compact JSON bytes. Serialization failures are
    /// errors, never silently dropped fields.
    pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }
}

/// Writes `bytes` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, bytes: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).chain_with(|| error! {
            "failed to create output directory",
            "directory" => parent.display(),
        })?;
    }

    fs::write(path, bytes).chain_with(|| error! {
        "failed to open/create file for writing",
        "file path" => path.display(),
    })?;

    tracing::debug!(path = %path.display(), "wrote file");
    Ok(())
}
