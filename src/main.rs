use flexi_logger::{Duplicate, FileSpec, Logger};
use genvis::param::{self, Param};
use genvis::run;
use log::{error, info, warn};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::path::Path;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn main() {
    let param_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "param.yaml".to_string());

    let param_found = Path::new(&param_file).exists();
    let mut param = if param_found {
        match param::load(&param_file) {
            Ok(param) => param,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    } else {
        Param::default()
    };

    let logger = Logger::try_with_env_or_str(&param.general.log_level)
        .or_else(|_| Logger::try_with_str("info"));
    let logger = match logger {
        Ok(logger) if param.general.log_base.is_empty() => logger.start(),
        Ok(logger) => logger
            .log_to_file(
                FileSpec::default()
                    .basename(&param.general.log_base)
                    .suffix(&param.general.log_suffix),
            )
            .duplicate_to_stderr(Duplicate::Info)
            .start(),
        Err(e) => Err(e),
    };
    let _logger = match logger {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Cannot start logger: {}", e);
            process::exit(1);
        }
    };

    if !param_found {
        warn!("{} not found, running with default parameters", param_file);
    }
    if let Err(e) = param::validate(&mut param) {
        error!("{}", e);
        process::exit(1);
    }

    info!("genvis {}", genvis::version());

    let running = Arc::new(AtomicBool::new(true));
    match Signals::new([SIGINT, SIGTERM]) {
        Ok(mut signals) => {
            let running = Arc::clone(&running);
            thread::spawn(move || {
                for signal in signals.forever() {
                    warn!("Signal {} received, stopping after the current step...", signal);
                    running.store(false, Ordering::Relaxed);
                }
            });
        }
        Err(e) => warn!("Cannot register signal handlers: {}", e),
    }

    if let Err(e) = run(&param, running) {
        error!("{}", e);
        process::exit(1);
    }
}
