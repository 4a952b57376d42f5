use std::process::ExitCode;

fn main() -> ExitCode {
    match yeet::cli::run() {
        Ok(code) => code,
        Err(err) => {
            yeet::ui::output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
