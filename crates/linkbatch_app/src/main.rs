use std::process::ExitCode;

mod platform;

fn main() -> ExitCode {
    match platform::run_app() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("linkbatch: {err:#}");
            ExitCode::FAILURE
        }
    }
}
