use serde::{Deserialize, Deserializer};

use super::Stratum;

/// A single row of the statistics table: a processed file and its day/night label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    pub filename: String,
    #[serde(rename = "night", deserialize_with = "deserialize_flag")]
    pub is_night: bool,
}

impl Record {
    #[cfg(test)]
    pub fn new(filename: impl Into<String>, is_night: bool) -> Self {
        Self {
            filename: filename.into(),
            is_night,
        }
    }

    pub fn stratum(&self) -> Stratum {
        Stratum::from_is_night(self.is_night)
    }
}

/// Accepts JSON booleans as well as the textual forms written by
/// spreadsheet and dataframe exports (`True`, `false`, `1`, `0`).
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(serde::de::Error::custom(format!(
            "invalid night flag: {}",
            other
        ))),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(serde::de::Error::custom(format!(
                "invalid night flag: {:?}",
                text
            ))),
        },
    }
}
