use dataplay::app::command_handlers;

fn output_header() -> &'static str {
    "DataPlay\nTerminal client for the industrial data playground: generate, corrupt and repair synthetic datasets."
}

fn print_header() {
    println!("{}\n", output_header());
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    // The interactive screen owns stdout; print the header only for line output.
    if !matches!(args.first().map(String::as_str), None | Some("play")) {
        print_header();
    }
    let output = command_handlers::run_cli(args)?;
    println!("{output}");
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
