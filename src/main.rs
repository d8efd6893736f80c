mod sortlast;

use sortlast::composite::BinarySwap;
use sortlast::{App, Launch};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = match App::from_args(std::env::args_os(), Box::new(BinarySwap::new())) {
        Ok(Launch::Run(app)) => app,
        Ok(Launch::Help(text)) => {
            print!("{}", text);
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };

    match app.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
