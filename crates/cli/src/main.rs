use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    registrar_cli::run()
}
