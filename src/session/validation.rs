use crate::session::actions::{ActionDescriptor, FieldKind, FieldSpec};
use crate::session::state::{FieldValue, FormFields};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProblem {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormRejection {
    pub problems: Vec<FieldProblem>,
}

impl FormRejection {
    pub fn message(&self) -> String {
        self.problems
            .iter()
            .map(|problem| problem.message.clone())
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn mentions(&self, field: &str) -> bool {
        self.problems.iter().any(|problem| problem.field == field)
    }
}

/// Checks `fields` against the descriptor's field spec and returns the
/// payload to send: text trimmed, numbers canonicalized, unknown names
/// rejected.
pub fn validate_form(
    descriptor: &ActionDescriptor,
    fields: &FormFields,
) -> Result<FormFields, FormRejection> {
    let mut problems = Vec::new();
    let mut accepted = FormFields::new();

    for name in fields.keys() {
        if descriptor.field(name).is_none() {
            problems.push(FieldProblem {
                field: name.clone(),
                message: format!(
                    "`{name}` is not a field of {}",
                    descriptor.id.as_str()
                ),
            });
        }
    }

    for spec in descriptor.field_spec {
        match validate_field(spec, fields.get(spec.name)) {
            Ok(value) => {
                accepted.insert(spec.name.to_string(), value);
            }
            Err(message) => problems.push(FieldProblem {
                field: spec.name.to_string(),
                message,
            }),
        }
    }

    if problems.is_empty() {
        Ok(accepted)
    } else {
        Err(FormRejection { problems })
    }
}

fn validate_field(spec: &FieldSpec, value: Option<&FieldValue>) -> Result<FieldValue, String> {
    let required = || format!("{} is required", spec.label);
    match (spec.kind, value) {
        (_, None) => Err(required()),
        (FieldKind::Text, Some(FieldValue::Text(raw))) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(required());
            }
            Ok(FieldValue::Text(trimmed.to_string()))
        }
        (FieldKind::Number { min }, Some(FieldValue::Text(raw))) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(required());
            }
            let number = trimmed
                .parse::<i64>()
                .map_err(|_| format!("{} must be a whole number, got `{trimmed}`", spec.label))?;
            if number < min {
                return Err(format!("{} must be at least {min}", spec.label));
            }
            Ok(FieldValue::Text(number.to_string()))
        }
        (
            FieldKind::File { extensions },
            Some(FieldValue::File {
                file_name,
                contents,
            }),
        ) => {
            if file_name.trim().is_empty() {
                return Err(required());
            }
            if !has_allowed_extension(file_name, extensions) {
                return Err(format!(
                    "{} must be one of: {}",
                    spec.label,
                    extensions
                        .iter()
                        .map(|ext| format!(".{ext}"))
                        .collect::<Vec<_>>()
                        .join(", ")
                ));
            }
            Ok(FieldValue::File {
                file_name: file_name.clone(),
                contents: contents.clone(),
            })
        }
        (FieldKind::File { .. }, Some(FieldValue::Text(_))) => {
            Err(format!("{} must be a file upload", spec.label))
        }
        (FieldKind::Text | FieldKind::Number { .. }, Some(FieldValue::File { .. })) => {
            Err(format!("{} must be typed, not uploaded", spec.label))
        }
    }
}

fn has_allowed_extension(file_name: &str, extensions: &[&str]) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::actions::ActionId;

    fn text_fields(pairs: &[(&str, &str)]) -> FormFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::text(*v)))
            .collect()
    }

    #[test]
    fn blank_required_text_is_rejected_by_label() {
        let rejection = validate_form(
            ActionId::GenerateIdeal.descriptor(),
            &text_fields(&[("industry", "  "), ("subdomain", "retail")]),
        )
        .expect_err("blank industry");
        assert!(rejection.mentions("industry"));
        assert!(!rejection.mentions("subdomain"));
        assert_eq!(rejection.message(), "Industry is required");
    }

    #[test]
    fn missing_fields_are_all_reported() {
        let rejection = validate_form(
            ActionId::ModifyInteractive.descriptor(),
            &FormFields::new(),
        )
        .expect_err("empty form");
        assert_eq!(
            rejection.message(),
            "Filename is required; Instruction is required"
        );
    }

    #[test]
    fn number_field_is_canonicalized_and_bounded() {
        let accepted = validate_form(
            ActionId::ReduceFiles.descriptor(),
            &text_fields(&[("n_keep", " 03 ")]),
        )
        .expect("valid n_keep");
        assert_eq!(accepted["n_keep"], FieldValue::text("3"));

        let zero = validate_form(
            ActionId::ReduceFiles.descriptor(),
            &text_fields(&[("n_keep", "0")]),
        )
        .expect_err("zero");
        assert_eq!(zero.message(), "Number of files to keep must be at least 1");

        let words = validate_form(
            ActionId::ReduceFiles.descriptor(),
            &text_fields(&[("n_keep", "three")]),
        )
        .expect_err("not a number");
        assert!(words.message().contains("whole number"));
    }

    #[test]
    fn file_field_checks_extension_and_kind() {
        let mut fields = FormFields::new();
        fields.insert(
            "instruction_file".to_string(),
            FieldValue::File {
                file_name: "steps.SQL".to_string(),
                contents: b"UPDATE t SET x = 1;".to_vec(),
            },
        );
        validate_form(ActionId::ModifyBatch.descriptor(), &fields).expect("sql accepted");

        fields.insert(
            "instruction_file".to_string(),
            FieldValue::File {
                file_name: "steps.exe".to_string(),
                contents: Vec::new(),
            },
        );
        let rejection =
            validate_form(ActionId::ModifyBatch.descriptor(), &fields).expect_err("exe");
        assert!(rejection.message().contains(".txt, .csv, .sql"));

        let typed = validate_form(
            ActionId::ModifyBatch.descriptor(),
            &text_fields(&[("instruction_file", "steps.txt")]),
        )
        .expect_err("typed path is not an upload");
        assert!(typed.message().contains("file upload"));
    }

    #[test]
    fn unknown_field_names_are_rejected() {
        let rejection = validate_form(
            ActionId::AskCsvQuestion.descriptor(),
            &text_fields(&[("question", "how many rows?"), ("mood", "curious")]),
        )
        .expect_err("unknown field");
        assert!(rejection.mentions("mood"));
    }
}
