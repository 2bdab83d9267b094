use clap::{Arg, Command};
use std::fs;
use std::path::Path;

fn main() {
    env_logger::init();

    let matches = Command::new("tinylang")
        .about("Interpreter for a small expression-oriented scripting language")
        .arg(
            Arg::new("file")
                .help("The script file to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if let Some(file_path) = matches.get_one::<String>("file") {
        run_file(file_path);
    } else if matches.get_flag("interactive") || matches.get_one::<String>("file").is_none() {
        tinylang::start_repl();
    }
}

fn run_file(path: &str) {
    let path = Path::new(path);

    match fs::read_to_string(path) {
        Ok(source) => {
            tinylang::run(&source, path.to_str());
        }
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}
