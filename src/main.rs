//! Runs a Perun script from a file or from the command line.

mod cli;

use std::io;
use std::path::PathBuf;

use console::style;
use tracing_subscriber::EnvFilter;

use perun_interpreter::{Interpreter, InterpreterConfig, InterpreterError};

fn main() {
    let args = cli::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut config = InterpreterConfig {
        dry_run: args.dry_run,
        ..Default::default()
    };
    if let Some(dir) = &args.directory {
        let expanded = shellexpand::tilde(dir).into_owned();
        if !PathBuf::from(&expanded).is_dir() {
            abort(&format!("Directory `{}` does not exist", expanded));
        }
        config.location = expanded;
    }
    let mut interpreter = Interpreter::new(config);

    let result = if let Some(code) = &args.code {
        interpreter.run_str(code)
    } else if let Some(script_file) = &args.file {
        let file = match file_checks(script_file).and_then(|_| {
            std::fs::File::open(script_file).map_err(|e| format!("Cannot open file `{}`: {}", script_file, e))
        }) {
            Ok(file) => file,
            Err(msg) => abort(&msg),
        };
        interpreter.run(io::BufReader::new(file))
    } else {
        abort("Nothing to run; give a script file or use --code");
    };

    match result {
        Ok(code) => {
            if args.dry_run {
                println!("{}", style("Syntax OK").green());
            }
            std::process::exit(code)
        }
        Err(e) => {
            report(&e);
            std::process::exit(1)
        }
    }
}

fn report(error: &InterpreterError) {
    let styled = match error {
        InterpreterError::Runtime(_) => style(error.to_string()).yellow(),
        _ => style(error.to_string()).red(),
    };
    eprintln!("{}", styled.bold());
}

fn abort(msg: &str) -> ! {
    eprintln!("{} {}", style("Abort:").red().bold(), msg);
    std::process::exit(2)
}

fn file_checks(path_str: &str) -> Result<(), String> {
    let path = PathBuf::from(path_str);
    if !path.exists() {
        return Err(format!("File `{}` does not exist", path_str));
    }
    if !path.is_file() {
        return Err(format!("Path `{}` is not a file", path_str));
    }
    Ok(())
}
