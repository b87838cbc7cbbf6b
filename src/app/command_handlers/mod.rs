use crate::app::cli::{help_text, parse_cli_verb, CliVerb};

pub mod actions;
pub mod call;
pub mod play;
pub mod status;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    if args.is_empty() {
        return play::cmd_play();
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::Play => play::cmd_play(),
        CliVerb::Status => status::cmd_status(),
        CliVerb::Actions => actions::cmd_actions(),
        CliVerb::Call => call::cmd_call(&args[1..]),
        CliVerb::Help => Ok(help_text()),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
