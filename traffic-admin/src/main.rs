/*!
Traffic violation database administration
*/

use std::path::PathBuf;
use std::process::ExitCode;

use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use traffic_database::Database;

use crate::core::commands::{self, BoxError, Outcome, Request};
use crate::core::config::{AdminConfig, OutputFormat};
use crate::core::render::Renderer;

mod core;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Await `work` to the end. An interrupt is only logged: the running request
/// may already have committed.
async fn finish<T>(
    mut work: JoinHandle<T>,
    interrupt: impl Future<Output = ()>,
) -> Result<T, JoinError> {
    tokio::select! {
        joined = &mut work => joined,
        () = interrupt => {
            warn!("🛑 Interrupted, waiting for the running request to finish");
            work.await
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, BoxError> {
    let matches = commands::cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    let config_path = matches.get_one::<PathBuf>("config").map(PathBuf::as_path);
    let mut config = AdminConfig::load(config_path).await?;
    if let Some(path) = matches.get_one::<PathBuf>("db-path") {
        config.database.path = path.clone();
    }
    if let Some(format) = matches.get_one::<OutputFormat>("format") {
        config.output.format = *format;
    }

    let request = Request::from_matches(&matches).ok_or("unrecognised command")?;
    debug!("Handling {:?}", request);

    // rusqlite blocks, so the request runs off the async worker threads
    let work = tokio::task::spawn_blocking(move || -> Result<Outcome, BoxError> {
        let mut db = Database::open(&config.database)?;
        let renderer = Renderer::new(&config.output);
        commands::execute(&mut db, &request, &renderer)
    });

    let interrupt = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    let outcome = finish(work, interrupt).await??;

    println!("{}", outcome.output);
    Ok(ExitCode::from(outcome.status))
}
