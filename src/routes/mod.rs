pub mod donors;
pub mod health;
pub mod impact;
pub mod imports;
pub mod segmentation;
pub mod volunteers;
pub mod wrapped;

use serde::Deserialize;

use crate::error::AppError;
use crate::impact::parse_amount;

/// A numeric field that clients send either as a JSON number or as text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberInput {
    Number(f64),
    Text(String),
}

impl NumberInput {
    pub fn value(&self) -> Result<f64, AppError> {
        match self {
            NumberInput::Number(n) => Ok(*n),
            NumberInput::Text(text) => Ok(parse_amount(text)?),
        }
    }
}

pub(crate) fn required(value: Option<String>, name: &str) -> Result<f64, AppError> {
    let raw = value.ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    Ok(parse_amount(&raw)?)
}
