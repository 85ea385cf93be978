//! Field metadata as exported by the capture platform's data dictionary.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Separator between a checkbox field name and its 1-based choice position.
pub const CHECKBOX_SEPARATOR: &str = "___";

/// Declared type of a capture-platform field.
///
/// Unknown type names are kept verbatim in [`FieldType::Other`] so that the
/// storage mapping can decide what to do with them instead of failing the load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Text,
    Notes,
    Dropdown,
    Radio,
    Checkbox,
    File,
    Calc,
    Sql,
    Descriptive,
    Slider,
    YesNo,
    TrueFalse,
    Other(String),
}

impl FieldType {
    /// Parse a type name as it appears in the data dictionary (case-insensitive).
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" => Self::Text,
            "notes" => Self::Notes,
            "dropdown" => Self::Dropdown,
            "radio" => Self::Radio,
            "checkbox" => Self::Checkbox,
            "file" => Self::File,
            "calc" => Self::Calc,
            "sql" => Self::Sql,
            "descriptive" => Self::Descriptive,
            "slider" => Self::Slider,
            "yesno" => Self::YesNo,
            "truefalse" => Self::TrueFalse,
            _ => Self::Other(name.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Notes => "notes",
            Self::Dropdown => "dropdown",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::File => "file",
            Self::Calc => "calc",
            Self::Sql => "sql",
            Self::Descriptive => "descriptive",
            Self::Slider => "slider",
            Self::YesNo => "yesno",
            Self::TrueFalse => "truefalse",
            Self::Other(name) => name,
        }
    }

    /// Returns true for types whose choice column holds `code, label` pairs.
    ///
    /// Other types reuse that column for calculations or slider labels, which
    /// are not choices.
    pub fn has_choice_list(&self) -> bool {
        matches!(self, Self::Dropdown | Self::Radio | Self::Checkbox)
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One code/label pair of a multi-option field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub code: String,
    pub label: String,
}

impl Choice {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// Parse a `code, label | code, label` choice string.
///
/// A segment without a comma is a bare code with an empty label. Labels keep
/// any further commas. Blank segments are ignored.
pub fn parse_choices(raw: &str) -> Vec<Choice> {
    raw.split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once(',') {
            Some((code, label)) => Choice::new(code.trim(), label.trim()),
            None => Choice::new(segment, ""),
        })
        .collect()
}

/// Data dictionary row in the platform's export shape.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFieldMeta {
    pub field_name: String,
    pub form_name: String,
    pub field_type: String,
    #[serde(default)]
    pub select_choices_or_calculations: String,
}

/// Metadata for a single capture-platform field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawFieldMeta")]
pub struct FieldMeta {
    field_name: String,
    form_name: String,
    field_type: FieldType,
    choices: Vec<Choice>,
    raw_choices: String,
}

impl FieldMeta {
    /// Build a field, parsing its choice list when the type carries one.
    ///
    /// # Errors
    ///
    /// Fails when a name is blank or a checkbox declares no choices.
    pub fn new(
        field_name: impl Into<String>,
        form_name: impl Into<String>,
        field_type: FieldType,
        raw_choices: impl Into<String>,
    ) -> Result<Self> {
        let field_name = field_name.into().trim().to_string();
        let form_name = form_name.into().trim().to_string();
        let raw_choices = raw_choices.into();
        if field_name.is_empty() {
            return Err(ModelError::EmptyFieldName { form: form_name });
        }
        if form_name.is_empty() {
            return Err(ModelError::EmptyFormName { field: field_name });
        }
        let choices = if field_type.has_choice_list() {
            parse_choices(&raw_choices)
        } else {
            Vec::new()
        };
        if field_type == FieldType::Checkbox && choices.is_empty() {
            return Err(ModelError::CheckboxWithoutChoices { field: field_name });
        }
        Ok(Self {
            field_name,
            form_name,
            field_type,
            choices,
            raw_choices,
        })
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn form_name(&self) -> &str {
        &self.form_name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn raw_choices(&self) -> &str {
        &self.raw_choices
    }

    pub fn is_checkbox(&self) -> bool {
        self.field_type == FieldType::Checkbox
    }

    /// Label for a stored choice code, compared after trimming.
    pub fn choice_label(&self, code: &str) -> Option<&str> {
        let code = code.trim();
        self.choices
            .iter()
            .find(|choice| choice.code == code)
            .map(|choice| choice.label.as_str())
    }

    /// Variable names this field contributes to a form's column list.
    ///
    /// Checkboxes expand to `<field>___1 .. <field>___N` in choice order.
    pub fn variables(&self) -> Vec<String> {
        if self.is_checkbox() {
            (1..=self.choices.len())
                .map(|position| format!("{}{CHECKBOX_SEPARATOR}{position}", self.field_name))
                .collect()
        } else {
            vec![self.field_name.clone()]
        }
    }
}

impl TryFrom<RawFieldMeta> for FieldMeta {
    type Error = ModelError;

    fn try_from(raw: RawFieldMeta) -> Result<Self> {
        FieldMeta::new(
            raw.field_name,
            raw.form_name,
            FieldType::parse(&raw.field_type),
            raw.select_choices_or_calculations,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_and_unknown_types() {
        assert_eq!(FieldType::parse("YesNo"), FieldType::YesNo);
        assert_eq!(FieldType::parse(" radio "), FieldType::Radio);
        assert_eq!(
            FieldType::parse("signature"),
            FieldType::Other("signature".to_string())
        );
        assert_eq!(FieldType::parse("truefalse").to_string(), "truefalse");
    }

    #[test]
    fn choice_string_splits_code_and_label() {
        let choices = parse_choices("1, Yes | 2, No, not really | 3");
        assert_eq!(
            choices,
            vec![
                Choice::new("1", "Yes"),
                Choice::new("2", "No, not really"),
                Choice::new("3", ""),
            ]
        );
    }

    #[test]
    fn calc_fields_carry_no_choices() {
        let field =
            FieldMeta::new("bmi", "vitals", FieldType::Calc, "[weight]/([height]^2)").unwrap();
        assert!(field.choices().is_empty());
        assert_eq!(field.raw_choices(), "[weight]/([height]^2)");
    }

    #[test]
    fn checkbox_requires_choices() {
        let err = FieldMeta::new("race", "demo", FieldType::Checkbox, " ").unwrap_err();
        assert_eq!(
            err,
            ModelError::CheckboxWithoutChoices {
                field: "race".to_string()
            }
        );
    }

    #[test]
    fn checkbox_expands_by_position() {
        let field =
            FieldMeta::new("race", "demo", FieldType::Checkbox, "1, A | 2, B | 5, C").unwrap();
        assert_eq!(field.variables(), vec!["race___1", "race___2", "race___3"]);
        assert_eq!(field.choice_label(" 5 "), Some("C"));
    }

    #[test]
    fn deserializes_data_dictionary_row() {
        let json = r#"{
            "field_name": "sex",
            "form_name": "demographics",
            "field_type": "radio",
            "select_choices_or_calculations": "0, Female | 1, Male",
            "field_label": "Sex"
        }"#;
        let field: FieldMeta = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_type(), &FieldType::Radio);
        assert_eq!(field.choice_label("1"), Some("Male"));
    }
}
