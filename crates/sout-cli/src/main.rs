use std::process::ExitCode;

fn main() -> ExitCode {
    let registry = sout_cli::default_registry();
    let matches = registry.build_cli().get_matches();
    let mut out = std::io::stdout().lock();
    match sout_cli::execute(&registry, &matches, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
