//! Per-line lyric editing form for the admin song page
//!
//! Fields are built fresh for every request from the stored lyrics; nothing
//! is kept between requests.

use std::collections::HashMap;

use serde::Serialize;

use crate::lyrics::split_lines;

/// Prefix of every per-line field name
pub const LYRIC_FIELD_NAME_PREFIX: &str = "original_lyrics_line_";

/// Maximum characters of one lyric line
pub const LYRIC_MAX_LENGTH: usize = 100;

/// Editable field for one original lyric line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LyricLineField {
    /// `original_lyrics_line_0001` for the first line
    pub name: String,
    pub label: String,
    pub initial: String,
    pub max_length: usize,
    /// Non-blank lines may not be cleared
    pub required: bool,
    /// Blank lines are shown but not editable
    pub disabled: bool,
}

/// Problem with one submitted field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Builds the lyric fields of one song for one request
#[derive(Debug, Clone)]
pub struct LyricFormBuilder {
    fields: Vec<LyricLineField>,
}

impl LyricFormBuilder {
    pub fn new(original_lyrics: &str) -> Self {
        let fields = split_lines(original_lyrics)
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                let number = i + 1;
                let blank = line.is_empty();
                LyricLineField {
                    name: field_name(number),
                    label: format!("Original lyrics line {}", number),
                    initial: line,
                    max_length: LYRIC_MAX_LENGTH,
                    required: !blank,
                    disabled: blank,
                }
            })
            .collect();

        Self { fields }
    }

    pub fn fields(&self) -> &[LyricLineField] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<LyricLineField> {
        self.fields
    }

    /// Validate submitted values and rebuild the lyrics text.
    ///
    /// Fields missing from `submitted` keep their initial value. Disabled
    /// fields always stay blank. Returns `Ok(None)` when nothing changed.
    pub fn apply(
        &self,
        submitted: &HashMap<String, String>,
    ) -> Result<Option<String>, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut lines = Vec::with_capacity(self.fields.len());
        let mut changed = false;

        for field in &self.fields {
            if field.disabled {
                lines.push(String::new());
                continue;
            }

            let value = submitted
                .get(&field.name)
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| field.initial.clone());

            if field.required && value.is_empty() {
                errors.push(FieldError {
                    field: field.name.clone(),
                    message: "This field is required.".to_string(),
                });
            } else if value.chars().count() > field.max_length {
                errors.push(FieldError {
                    field: field.name.clone(),
                    message: format!(
                        "Ensure this value has at most {} characters.",
                        field.max_length
                    ),
                });
            }

            changed |= value != field.initial;
            lines.push(value);
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(changed.then(|| lines.join("\n")))
    }
}

fn field_name(number: usize) -> String {
    format!("{}{:04}", LYRIC_FIELD_NAME_PREFIX, number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_fields_from_lyrics() {
        let form = LyricFormBuilder::new("first\n\nthird");
        let fields = form.fields();

        assert_eq!(fields.len(), 3);
        assert_eq!(fields[0].name, "original_lyrics_line_0001");
        assert_eq!(fields[0].initial, "first");
        assert!(fields[0].required);
        assert!(!fields[0].disabled);

        assert_eq!(fields[1].name, "original_lyrics_line_0002");
        assert!(fields[1].disabled);
        assert!(!fields[1].required);
        assert_eq!(fields[2].max_length, LYRIC_MAX_LENGTH);
    }

    #[test]
    fn test_builders_do_not_share_state() {
        let a = LyricFormBuilder::new("a\nb\nc");
        let b = LyricFormBuilder::new("x");
        assert_eq!(a.fields().len(), 3);
        assert_eq!(b.fields().len(), 1);
        assert_eq!(b.fields()[0].initial, "x");
    }

    #[test]
    fn test_apply_rebuilds_text() {
        let form = LyricFormBuilder::new("first\n\nthird");
        let result = form
            .apply(&submitted(&[
                ("original_lyrics_line_0001", " First "),
                ("original_lyrics_line_0002", "ignored"),
            ]))
            .unwrap();

        assert_eq!(result.as_deref(), Some("First\n\nthird"));
    }

    #[test]
    fn test_apply_unchanged_is_none() {
        let form = LyricFormBuilder::new("first\nsecond");
        assert_eq!(form.apply(&HashMap::new()).unwrap(), None);
    }

    #[test]
    fn test_apply_rejects_cleared_and_overlong_lines() {
        let form = LyricFormBuilder::new("first\nsecond");
        let long = "x".repeat(LYRIC_MAX_LENGTH + 1);
        let errors = form
            .apply(&submitted(&[
                ("original_lyrics_line_0001", "   "),
                ("original_lyrics_line_0002", &long),
            ]))
            .unwrap_err();

        let names: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            names,
            ["original_lyrics_line_0001", "original_lyrics_line_0002"]
        );
    }
}
