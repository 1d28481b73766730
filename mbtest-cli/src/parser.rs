use log::trace;
use mbtest::ClientSettings;
use serde_json::Value;
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("File {0:?} does not exist")]
    MissingFile(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("unable to parse the JSON structure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unable to parse the TOML structure: {0}")]
    Toml(#[from] toml::de::Error),
}

fn read_existing(file_name: &str) -> Result<String, ParseError> {
    let file = Path::new(file_name);
    if !file.exists() {
        return Err(ParseError::MissingFile(file_name.to_string()));
    }
    Ok(fs::read_to_string(file)?)
}

fn is_toml(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .map(|extension| extension.eq_ignore_ascii_case("toml"))
        .unwrap_or_default()
}

/// Reads a request body; `.toml` files are converted, anything else is read as JSON.
pub fn parse_body(file_name: &str) -> Result<Value, ParseError> {
    let content = read_existing(file_name)?;
    trace!("Parsing request body from {}", file_name);

    let body = if is_toml(file_name) {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(body)
}

pub fn parse_settings(file_name: &str) -> Result<ClientSettings, ParseError> {
    let content = read_existing(file_name)?;
    trace!("Parsing settings from {}", file_name);
    Ok(toml::from_str(&content)?)
}
