use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::{determine_session_name, match_workspace, sanitize};

use super::command::{CommandRunner, SystemRunner, TmuxCommand};

/// Set by tmux in every pane it spawns.
pub const TMUX_ENV: &str = "TMUX";

/// True when this process runs inside a tmux client.
pub fn inside_tmux() -> bool {
    std::env::var_os(TMUX_ENV).is_some()
}

/// Session manager - owns the create / attach / kill lifecycle
#[derive(Debug)]
pub struct SessionManager<R = SystemRunner> {
    config: Config,
    runner: R,
    inside_tmux: bool,
}

impl SessionManager<SystemRunner> {
    pub fn new(config: Config) -> Self {
        Self::with_runner(config, SystemRunner, inside_tmux())
    }
}

impl<R: CommandRunner> SessionManager<R> {
    pub fn with_runner(config: Config, runner: R, inside_tmux: bool) -> Self {
        Self {
            config,
            runner,
            inside_tmux,
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Make sure a session for `dir` exists, then attach (or switch) to it.
    pub async fn resolve(&self, dir: &Path) -> Result<()> {
        let name = determine_session_name(dir, &self.config);

        if !self.session_exists(&name).await {
            self.create_session(&name, dir).await;
        }

        self.attach(&name).await
    }

    /// `has-session`; any failure counts as "no such session".
    pub async fn session_exists(&self, name: &str) -> bool {
        self.runner
            .run(&TmuxCommand::has_session(name))
            .await
            .is_ok()
    }

    /// Run the creation batch for `dir`. Failed commands are logged and the
    /// rest still run. Returns the number of failed commands.
    pub async fn create_session(&self, name: &str, dir: &Path) -> usize {
        tracing::info!("Creating new session: {} in directory: {}", name, dir.display());

        let commands = self.session_commands(name, dir);
        let mut failed = 0;

        for cmd in &commands {
            if let Err(e) = self.runner.run(cmd).await {
                tracing::warn!("{}", e);
                failed += 1;
            }
        }

        if failed == 0 {
            tracing::info!("Started tmux session: {}", name);
        } else {
            tracing::warn!(
                "{} of {} commands failed while creating session {}",
                failed,
                commands.len(),
                name
            );
        }

        failed
    }

    /// Commands that create the session for `dir`.
    ///
    /// A matching workspace with windows opens its first window with
    /// `new-session` and adds the rest with `neww`. Anything else gets a
    /// single default session named `name`.
    pub fn session_commands(&self, name: &str, dir: &Path) -> Vec<TmuxCommand> {
        let dir_str = dir.to_string_lossy();

        if self.config.workspaces.is_empty() {
            tracing::debug!("No workspaces configured, using default layout");
            return vec![TmuxCommand::new_session(name, &dir_str, None)];
        }

        let Some(ws) = match_workspace(dir, &self.config.workspaces) else {
            tracing::info!("No matching workspace found, creating default session");
            return vec![TmuxCommand::new_session(name, &dir_str, None)];
        };

        let Some((first, rest)) = ws.windows.split_first() else {
            return vec![TmuxCommand::new_session(name, &dir_str, None)];
        };

        let session = sanitize(&ws.name);
        let mut commands = vec![TmuxCommand::new_session(
            &session,
            &dir_str,
            Some(first.as_str()),
        )];
        commands.extend(
            rest.iter()
                .map(|window| TmuxCommand::new_window(&session, &dir_str, window)),
        );
        commands
    }

    /// `attach-session` from a plain terminal, `switch-client` from inside tmux.
    pub async fn attach(&self, name: &str) -> Result<()> {
        let cmd = if self.inside_tmux {
            TmuxCommand::switch_client(name)
        } else {
            TmuxCommand::attach_session(name)
        };
        self.runner.run_attached(&cmd).await
    }

    pub async fn kill(&self, name: &str) -> Result<()> {
        self.runner
            .run_attached(&TmuxCommand::kill_session(name))
            .await
    }

    /// Print `list-sessions` straight to the terminal.
    pub async fn list(&self) -> Result<()> {
        self.runner
            .run_attached(&TmuxCommand::list_sessions())
            .await
    }

    /// `list-sessions` output, one `name: N windows ...` line per session.
    pub async fn session_listing(&self) -> Result<String> {
        let listing = self
            .runner
            .output(&TmuxCommand::list_sessions())
            .await
            .map_err(|_| Error::tmux("no active tmux sessions"))?;

        if listing.trim().is_empty() {
            return Err(Error::tmux("no active tmux sessions"));
        }
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::config::WorkspaceConfig;

    /// Records every command and keeps a fake set of live sessions.
    #[derive(Default)]
    struct FakeTmux {
        calls: Mutex<Vec<Vec<String>>>,
        sessions: Mutex<HashSet<String>>,
        fail_subcommand: Option<&'static str>,
    }

    impl FakeTmux {
        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().clone()
        }

        fn subcommands(&self) -> Vec<String> {
            self.calls().into_iter().map(|c| c[0].clone()).collect()
        }

        /// Find the session a `-t` target names, the way tmux does: `=name`
        /// (optionally with a trailing `:`) must match exactly, a bare name
        /// may be a unique prefix.
        fn lookup(&self, target: &str) -> Option<String> {
            let sessions = self.sessions.lock();
            let target = target.strip_suffix(':').unwrap_or(target);
            if let Some(exact) = target.strip_prefix('=') {
                return sessions.get(exact).cloned();
            }
            if let Some(name) = sessions.get(target) {
                return Some(name.clone());
            }
            let mut prefixed = sessions.iter().filter(|s| s.starts_with(target));
            match (prefixed.next(), prefixed.next()) {
                (Some(name), None) => Some(name.clone()),
                _ => None,
            }
        }

        fn record(&self, cmd: &TmuxCommand) -> Result<()> {
            self.calls.lock().push(cmd.args().to_vec());
            if self.fail_subcommand == cmd.subcommand() {
                return Err(Error::tmux(format!("{} failed", cmd)));
            }

            let args = cmd.args();
            match cmd.subcommand() {
                Some("new-session") => {
                    self.sessions.lock().insert(args[2].clone());
                    Ok(())
                }
                Some("has-session") | Some("neww") | Some("attach-session")
                | Some("switch-client") => match self.lookup(&args[2]) {
                    Some(_) => Ok(()),
                    None => Err(Error::tmux("can't find session")),
                },
                Some("kill-session") => match self.lookup(&args[2]) {
                    Some(name) => {
                        self.sessions.lock().remove(&name);
                        Ok(())
                    }
                    None => Err(Error::tmux("can't find session")),
                },
                _ => Ok(()),
            }
        }
    }

    #[async_trait]
    impl CommandRunner for FakeTmux {
        async fn run(&self, cmd: &TmuxCommand) -> Result<()> {
            self.record(cmd)
        }

        async fn output(&self, cmd: &TmuxCommand) -> Result<String> {
            self.record(cmd)?;
            let mut names: Vec<_> = self.sessions.lock().iter().cloned().collect();
            names.sort();
            Ok(names
                .iter()
                .map(|n| format!("{n}: 1 windows (created Mon Oct 19 10:00:00 2026)\n"))
                .collect())
        }

        async fn run_attached(&self, cmd: &TmuxCommand) -> Result<()> {
            self.record(cmd)
        }
    }

    fn proj_config() -> Config {
        Config {
            workspaces: vec![WorkspaceConfig {
                directory: "/h/proj".into(),
                name: "Proj".to_string(),
                windows: vec!["editor".to_string(), "logs".to_string()],
            }],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_resolve_creates_workspace_layout() {
        let sm = SessionManager::with_runner(proj_config(), FakeTmux::default(), false);

        sm.resolve(Path::new("/h/proj")).await.unwrap();

        assert_eq!(
            sm.runner().calls(),
            vec![
                vec!["has-session", "-t", "=Proj"],
                vec!["new-session", "-ds", "Proj", "-c", "/h/proj", "-n", "editor"],
                vec!["neww", "-t", "=Proj:", "-c", "/h/proj", "-n", "logs"],
                vec!["attach-session", "-t", "=Proj"],
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_ignores_session_with_longer_name() {
        let runner = FakeTmux::default();
        runner.sessions.lock().insert("api-server".to_string());
        let sm = SessionManager::with_runner(Config::default(), runner, false);

        // a bare `api` target would resolve to `api-server`
        assert!(sm.runner().lookup("api").is_some());

        sm.resolve(Path::new("/code/api")).await.unwrap();

        assert_eq!(
            sm.runner().calls(),
            vec![
                vec!["has-session", "-t", "=api"],
                vec!["new-session", "-ds", "api", "-c", "/code/api"],
                vec!["attach-session", "-t", "=api"],
            ]
        );
        assert!(sm.session_exists("api-server").await);
    }

    #[tokio::test]
    async fn test_resolve_twice_skips_creation() {
        let sm = SessionManager::with_runner(Config::default(), FakeTmux::default(), false);
        let dir = Path::new("/code/my.app");

        sm.resolve(dir).await.unwrap();
        sm.resolve(dir).await.unwrap();

        assert_eq!(
            sm.runner().subcommands(),
            vec![
                "has-session",
                "new-session",
                "attach-session",
                "has-session",
                "attach-session"
            ]
        );
        assert_eq!(sm.runner().calls()[1][2], "my_app");
    }

    #[tokio::test]
    async fn test_resolve_inside_tmux_switches() {
        let sm = SessionManager::with_runner(Config::default(), FakeTmux::default(), true);

        sm.resolve(Path::new("/code/api")).await.unwrap();

        let calls = sm.runner().calls();
        assert_eq!(calls.last().unwrap(), &vec!["switch-client", "-t", "=api"]);
    }

    #[tokio::test]
    async fn test_resolve_matches_workspace_elsewhere() {
        let sm = SessionManager::with_runner(proj_config(), FakeTmux::default(), false);

        sm.resolve(Path::new("/other/place/proj")).await.unwrap();

        let calls = sm.runner().calls();
        assert_eq!(calls[1][2], "Proj");
        assert_eq!(calls[1][4], "/other/place/proj");
        assert_eq!(calls.last().unwrap(), &vec!["attach-session", "-t", "=Proj"]);
    }

    #[tokio::test]
    async fn test_create_continues_after_failure() {
        let runner = FakeTmux {
            fail_subcommand: Some("new-session"),
            ..Default::default()
        };
        let sm = SessionManager::with_runner(proj_config(), runner, false);

        let failed = sm.create_session("Proj", Path::new("/h/proj")).await;

        assert_eq!(failed, 2);
        assert_eq!(sm.runner().subcommands(), vec!["new-session", "neww"]);
    }

    #[tokio::test]
    async fn test_resolve_reports_attach_failure() {
        let runner = FakeTmux {
            fail_subcommand: Some("attach-session"),
            ..Default::default()
        };
        let sm = SessionManager::with_runner(Config::default(), runner, false);

        let err = sm.resolve(Path::new("/code/api")).await.unwrap_err();
        assert!(matches!(err, Error::Tmux(_)));
    }

    #[test]
    fn test_session_commands_without_match() {
        let sm = SessionManager::with_runner(proj_config(), FakeTmux::default(), false);

        let commands = sm.session_commands("other", Path::new("/h/other"));
        assert_eq!(commands.len(), 1);
        assert_eq!(
            commands[0].args(),
            ["new-session", "-ds", "other", "-c", "/h/other"]
        );
    }

    #[test]
    fn test_session_commands_empty_windows() {
        let mut cfg = proj_config();
        cfg.workspaces[0].windows.clear();
        let sm = SessionManager::with_runner(cfg, FakeTmux::default(), false);

        let commands = sm.session_commands("Proj", Path::new("/h/proj"));
        assert_eq!(commands, vec![TmuxCommand::new_session("Proj", "/h/proj", None)]);
    }

    #[test]
    fn test_session_commands_three_windows() {
        let mut cfg = proj_config();
        cfg.workspaces[0].name = "My Project".to_string();
        cfg.workspaces[0].windows.push("server".to_string());
        let sm = SessionManager::with_runner(cfg, FakeTmux::default(), false);

        let commands = sm.session_commands("My_Project", Path::new("/h/proj"));
        let subs: Vec<_> = commands.iter().filter_map(|c| c.subcommand()).collect();
        assert_eq!(subs, vec!["new-session", "neww", "neww"]);
        assert_eq!(commands[0].args()[2], "My_Project");
        assert!(commands[1..].iter().all(|c| c.args()[2] == "=My_Project:"));
    }

    #[tokio::test]
    async fn test_kill_and_listing() {
        let sm = SessionManager::with_runner(Config::default(), FakeTmux::default(), false);
        assert!(sm.session_listing().await.is_err());

        sm.resolve(Path::new("/code/api")).await.unwrap();
        let listing = sm.session_listing().await.unwrap();
        assert!(listing.starts_with("api:"));

        sm.kill("api").await.unwrap();
        assert!(!sm.session_exists("api").await);
        assert!(sm.kill("api").await.is_err());
    }
}
