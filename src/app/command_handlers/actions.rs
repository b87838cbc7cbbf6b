use crate::session::actions::{FieldKind, ALL_ACTIONS};

pub fn cmd_actions() -> Result<String, String> {
    let mut lines = Vec::new();
    for action in ALL_ACTIONS {
        let descriptor = action.descriptor();
        let fields = if descriptor.field_spec.is_empty() {
            "-".to_string()
        } else {
            descriptor
                .field_spec
                .iter()
                .map(|spec| match spec.kind {
                    FieldKind::Text => format!("{}:{}", spec.name, spec.kind.as_str()),
                    FieldKind::Number { min } => format!("{}:number>={min}", spec.name),
                    FieldKind::File { extensions } => {
                        format!("{}:file({})", spec.name, extensions.join("|"))
                    }
                })
                .collect::<Vec<_>>()
                .join(",")
        };
        lines.push(format!(
            "{} method={} path={} fields={} decode={}",
            action.as_str(),
            descriptor.method.as_str(),
            descriptor.endpoint,
            fields,
            descriptor.response_kind.as_str()
        ));
    }
    Ok(lines.join("\n"))
}
