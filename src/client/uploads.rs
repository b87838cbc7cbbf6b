use crate::session::actions::{ActionDescriptor, FieldKind};
use crate::session::state::{FieldValue, FormFields};
use crate::shared::ClientError;
use std::fs;
use std::path::Path;

/// Turns raw `name -> input` pairs into form fields. File fields take a
/// path and are read here; blank inputs are left out so validation reports
/// them as missing.
pub fn form_fields_from_inputs(
    descriptor: &ActionDescriptor,
    inputs: &[(String, String)],
) -> Result<FormFields, ClientError> {
    let mut fields = FormFields::new();
    for (name, raw) in inputs {
        let is_file = matches!(
            descriptor.field(name).map(|spec| spec.kind),
            Some(FieldKind::File { .. })
        );
        if !is_file {
            fields.insert(name.clone(), FieldValue::Text(raw.clone()));
            continue;
        }
        let path = raw.trim();
        if path.is_empty() {
            continue;
        }
        fields.insert(name.clone(), read_upload(Path::new(path))?);
    }
    Ok(fields)
}

pub fn read_upload(path: &Path) -> Result<FieldValue, ClientError> {
    let contents = fs::read(path).map_err(|source| ClientError::File {
        path: path.display().to_string(),
        source,
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    Ok(FieldValue::File {
        file_name,
        contents,
    })
}
