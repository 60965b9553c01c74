use std::process::ExitCode;

fn main() -> ExitCode {
    stride_cli::run()
}
