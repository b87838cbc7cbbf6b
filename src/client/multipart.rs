use crate::session::state::FieldValue;
use mime_guess::Mime;
use reqwest::blocking::multipart::{Form, Part};

/// Builds the `multipart/form-data` body for a validated form. Parts keep
/// the order of `fields`; file parts carry their name and a guessed type.
pub fn build_form(fields: &[(String, FieldValue)]) -> Result<Form, reqwest::Error> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = match value {
            FieldValue::Text(text) => form.text(name.clone(), text.clone()),
            FieldValue::File {
                file_name,
                contents,
            } => {
                let part = Part::bytes(contents.clone())
                    .file_name(file_name.clone())
                    .mime_str(content_type_for_file(file_name).essence_str())?;
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

pub fn content_type_for_file(file_name: &str) -> Mime {
    mime_guess::from_path(file_name).first_or_octet_stream()
}
