use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match phys_fit::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::debug!("exiting with code {}", err.exit_code());
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
