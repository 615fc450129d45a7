use serde_json::Value;

use crate::error::ExtractError;

const FENCE: &str = "```";

/// Row-major cell text as read by the model, before canonicalization.
///
/// Always non-empty and rectangular.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterGrid {
    rows: Vec<Vec<String>>,
}

impl LetterGrid {
    /// Validates the shape of `rows`: at least one row, no empty row, equal row lengths.
    pub fn new(rows: Vec<Vec<String>>) -> Result<Self, ExtractError> {
        let Some(first) = rows.first() else {
            return Err(ExtractError::malformed_grid("grid has no rows"));
        };

        let width = first.len();
        if width == 0 {
            return Err(ExtractError::malformed_grid("row 0 is empty"));
        }
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(ExtractError::malformed_grid(format!(
                "row {index} has {} cells, expected {width}",
                row.len()
            )));
        }

        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }
}

impl TryFrom<Value> for LetterGrid {
    type Error = ExtractError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let rows = match value {
            Value::Array(rows) => rows,
            other => {
                return Err(ExtractError::malformed_grid(format!(
                    "expected an array of rows, found {}",
                    json_type(&other)
                )));
            }
        };

        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(r, row)| match row {
                Value::Array(cells) => cells
                    .into_iter()
                    .enumerate()
                    .map(|(c, cell)| match cell {
                        Value::String(text) => Ok(text),
                        other => Err(ExtractError::malformed_grid(format!(
                            "cell ({r}, {c}) is {}, expected a string",
                            json_type(&other)
                        ))),
                    })
                    .collect::<Result<Vec<_>, _>>(),
                other => Err(ExtractError::malformed_grid(format!(
                    "row {r} is {}, expected an array",
                    json_type(&other)
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(rows)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Removes a markdown code fence and its language tag from a model reply.
///
/// Only the content between the first pair of fence delimiters is kept; an unclosed
/// fence keeps everything after the opening delimiter. Replies without a fence are
/// returned trimmed.
pub fn strip_code_fence(reply: &str) -> &str {
    let Some(start) = reply.find(FENCE) else {
        return reply.trim();
    };

    let inner = &reply[start + FENCE.len()..];
    let inner = match inner.find(FENCE) {
        Some(end) => &inner[..end],
        None => inner,
    };

    // a grid starts with '[', so any leading word is a language tag
    let inner = inner.trim_start();
    let tag_len = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    inner[tag_len..].trim()
}

/// Decodes a free-text model reply into a [`LetterGrid`].
///
/// Stages: emptiness check, fence stripping, JSON parsing, shape validation. Each
/// stage fails with its own [`ExtractError`] variant.
pub fn extract_grid(reply: &str) -> Result<LetterGrid, ExtractError> {
    if reply.trim().is_empty() {
        return Err(ExtractError::EmptyModelOutput);
    }

    let body = strip_code_fence(reply);
    let value: Value =
        serde_json::from_str(body).map_err(|source| ExtractError::ModelOutputNotJson {
            raw: reply.to_string(),
            source,
        })?;

    LetterGrid::try_from(value)
}
