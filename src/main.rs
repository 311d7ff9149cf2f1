use clap::Parser;
use flowport::cli::{self, Args};
use flowport::core::error::{AppError, DefaultErrorReporter, ErrorReporter};
use flowport::logging;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    let _logging_guard = match logging::init(&args.command) {
        Ok(guard) => Some(guard),
        Err(error) => {
            eprintln!("[WARNING] logging disabled: {:#}", error);
            None
        }
    };

    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            match error.downcast_ref::<AppError>() {
                Some(app_error) => DefaultErrorReporter.report_error(app_error),
                None => eprintln!("[ERROR] {:#}", error),
            }
            ExitCode::FAILURE
        }
    }
}
