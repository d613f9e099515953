use std::process::ExitCode;

fn main() -> ExitCode {
    agrimall_cli::run()
}
