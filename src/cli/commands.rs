use std::path::PathBuf;

use crate::cli::{Args, Command};
use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::picker::{session_from_listing, FzfPicker, Picker};
use crate::search::{DirectoryList, DirectorySearcher};
use crate::tmux::{inside_tmux, CommandRunner, SessionManager};

/// Dispatch one invocation.
///
/// Only usage errors (bad DIR argument) come back as `Err`; everything else
/// is reported here and the action ends normally.
pub async fn run_cli(args: Args) -> Result<()> {
    let config = load_config(args.config).await;
    let picker = FzfPicker::new(inside_tmux());
    let manager = SessionManager::new(config.clone());

    match args.command {
        Some(Command::List) => {
            if let Err(e) = manager.list().await {
                report(&e, "");
            }
            Ok(())
        }

        Some(Command::Connect) => {
            handle_connect(&manager, &picker).await;
            Ok(())
        }

        Some(Command::Kill) => {
            handle_kill(&manager, &picker).await;
            Ok(())
        }

        None => handle_open(&config, &manager, &picker, args.dir, args.depth).await,
    }
}

async fn load_config(dir: Option<PathBuf>) -> Config {
    let dir = match dir.map(Ok).unwrap_or_else(config::default_dir) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!("No configuration loaded: {}", e);
            return Config::default();
        }
    };

    let (config, warnings) = Config::load(&dir).await;
    for warning in &warnings {
        tracing::warn!("{}", warning);
    }
    config
}

/// Default action: pick a directory under `dir` and open its session.
async fn handle_open<R: CommandRunner>(
    config: &Config,
    manager: &SessionManager<R>,
    picker: &dyn Picker,
    dir: Option<PathBuf>,
    cli_depth: u32,
) -> Result<()> {
    let root = resolve_root(dir)?;
    let depth = config.search_depth(cli_depth);
    let list = DirectoryList::new(DirectorySearcher::new());

    let work_dir = match list.select(picker, &root, depth, config.use_zoxide()).await {
        Ok(d) => d,
        Err(e) => {
            report(&e, "No folder selected, exiting.");
            return Ok(());
        }
    };

    if let Err(e) = manager.resolve(&work_dir).await {
        report(&e, "");
    }
    Ok(())
}

async fn handle_connect<R: CommandRunner>(manager: &SessionManager<R>, picker: &dyn Picker) {
    let session = match select_session(manager, picker).await {
        Ok(s) => s,
        Err(e) => return report(&e, "No session selected, exiting."),
    };

    if let Err(e) = manager.attach(&session).await {
        eprintln!("Error connecting to {} tmux session: {}", session, e);
    }
}

async fn handle_kill<R: CommandRunner>(manager: &SessionManager<R>, picker: &dyn Picker) {
    let session = match select_session(manager, picker).await {
        Ok(s) => s,
        Err(e) => return report(&e, "No session selected, exiting."),
    };

    if let Err(e) = manager.kill(&session).await {
        eprintln!("Error killing {} tmux session: {}", session, e);
    }
}

async fn select_session<R: CommandRunner>(
    manager: &SessionManager<R>,
    picker: &dyn Picker,
) -> Result<String> {
    let listing = manager.session_listing().await?;
    let line = picker.pick(listing.as_bytes()).await?;
    Ok(session_from_listing(&line).to_string())
}

/// Search root: the DIR argument or the home directory, canonicalized.
fn resolve_root(dir: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match dir {
        Some(d) => d,
        None => dirs::home_dir()
            .ok_or_else(|| Error::NotFound("cannot determine home directory".to_string()))?,
    };

    if !dir.exists() {
        return Err(Error::NotFound(format!(
            "directory {} does not exist",
            dir.display()
        )));
    }
    if !dir.is_dir() {
        return Err(Error::InvalidInput(format!(
            "{} is not a directory",
            dir.display()
        )));
    }

    dir.canonicalize()
        .map_err(|e| Error::NotFound(format!("{}: {}", dir.display(), e)))
}

/// Print an action's failure. Cancellation is not an error.
fn report(err: &Error, cancelled_msg: &str) {
    if err.is_cancelled() {
        if !cancelled_msg.is_empty() {
            eprintln!("{}", cancelled_msg);
        }
        return;
    }
    tracing::debug!("{:?}", err);
    eprintln!("Error: {}", err);
}
