use crash_log_parser::parse_file;
use main_error::MainError;
use std::env::args_os;
use std::io::stdout;

fn main() -> Result<(), MainError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let path = match args_os().nth(1) {
        Some(path) => path,
        None => return Ok(()),
    };

    parse_file(path, stdout().lock())?;

    Ok(())
}
