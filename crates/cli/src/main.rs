use std::process::ExitCode;

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    pricewire_cli::run()
}
