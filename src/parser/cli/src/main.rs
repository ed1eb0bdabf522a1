mod cli;
mod logging;

use cli::Cli;

fn main() {
    if let Err(err) = Cli::execute() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
