use thiserror::Error;

/// Failure to read one of the JSON data files (snapshot, catalog, locale, config).
#[derive(Debug, Error)]
pub enum DataError {
    #[error("could not read data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read and parse a JSON file.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, DataError> {
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}
