use std::process::ExitCode;

mod app;

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match app::bootstrap::build_app(&args) {
        Ok(Some(wiring)) => app::loop_runner::run(wiring),
        Ok(None) => ExitCode::SUCCESS,
        Err(err) => app::loop_runner::report_startup_failure(&err),
    }
}
