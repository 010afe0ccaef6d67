use serde::{Deserialize, Serialize};

use crate::core::errors::{DecodeError, RelayError};

/// Opaque capture of a board's widgets at one poll instant.
///
/// No structure is assumed: two snapshots are the same board state exactly
/// when their bytes are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(Vec<u8>);

impl Snapshot {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Snapshot {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

/// Board metadata captured once when monitoring starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardInfo {
    pub name: String,
    pub link: String,
}

#[derive(Deserialize)]
struct BoardResponse {
    name: Option<String>,
    #[serde(rename = "viewLink")]
    view_link: Option<String>,
}

impl BoardInfo {
    /// Decode the board metadata endpoint's JSON body
    pub fn from_json(body: &[u8]) -> Result<Self, RelayError> {
        let response: BoardResponse =
            serde_json::from_slice(body).map_err(|source| DecodeError::Json {
                context: "board metadata".to_string(),
                source,
            })?;

        let name = response.name.ok_or_else(|| missing("name"))?;
        let link = response.view_link.ok_or_else(|| missing("viewLink"))?;

        Ok(Self { name, link })
    }
}

fn missing(field: &str) -> DecodeError {
    DecodeError::MissingField {
        context: "board metadata".to_string(),
        field: field.to_string(),
    }
}
