use crate::app::command_support::{load_command_context, parse_field_args};
use crate::client::uploads::form_fields_from_inputs;
use crate::session::{
    validate_form, ActionId, DispatchRequest, Dispatcher, ErrorReport, FormFields,
};
use std::sync::Arc;

/// Runs one action outside the menus, through the same validation and
/// dispatcher as the playground.
pub fn cmd_call(args: &[String]) -> Result<String, String> {
    let Some(raw_action) = args.first() else {
        return Err("usage: call <action> [field=value ...]".to_string());
    };
    let action = ActionId::parse(raw_action)?;
    let descriptor = action.descriptor();
    let inputs = parse_field_args(&args[1..])?;

    let fields = if descriptor.requires_form() || !inputs.is_empty() {
        let raw = form_fields_from_inputs(descriptor, &inputs)
            .map_err(|err| ErrorReport::from(&err).to_string())?;
        validate_form(descriptor, &raw)
            .map_err(|rejection| ErrorReport::validation(rejection.message()).to_string())?
    } else {
        FormFields::new()
    };

    let context = load_command_context()?;
    let mut dispatcher = Dispatcher::new(Arc::new(context.service_client()), context.log.clone());
    dispatcher
        .start(DispatchRequest { action, fields })
        .map_err(|err| err.to_string())?;
    match dispatcher.wait() {
        Some(Ok(payload)) => Ok(payload.render()),
        Some(Err(report)) => Err(report.to_string()),
        None => Err(format!("no request was started for {action}")),
    }
}
