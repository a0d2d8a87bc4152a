use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};

use remap_core::config::Config;
use remap_core::logging::init_logging;
use remap_core::protocol::Session;
use tracing::{error, info};

fn main() {
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("remap-core: {e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = init_logging(&config.log) {
        eprintln!("remap-core: {e}");
    }
    info!(source = config.source.as_deref().unwrap_or("<none>"), "remap-core started");

    let mut session = Session::new(config);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => continue,
        };

        if line.trim().is_empty() {
            continue;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| session.handle(&line)));

        let response = match result {
            Ok(resp) => resp,
            Err(_) => {
                error!("panic while handling request");
                serde_json::json!({
                    "status": "error",
                    "message": "internal core error"
                })
                .to_string()
            }
        };

        if writeln!(stdout, "{response}").is_err() {
            break;
        }

        let _ = stdout.flush();
    }
}
