use std::cell::LazyCell;
use std::path::PathBuf;
use std::sync::Arc;

use countdown::client::app::connector::{Connector, UnixConnector};
use countdown::client::outbound::{ClearService, InitService, QueryService, SetService};
use countdown::client::Client;
use countdown::daemon::config;
use countdown::domain::client::ApplicationCore;
use countdown::utils::xdg::{Xdg, XdgBaseKind};
use snafu::{prelude::*, Whatever};
use tracing::Level;

use crate::cli::{Arguments, Command};

const APP_NAME: &str = "countdown";
const DAEMON_NAME: &str = "countdown-daemon";

struct EnvironmentPath {
    socket: PathBuf,
    pid: PathBuf,
}

pub fn bootstrap(args: &Arguments) -> Result<Client, Whatever> {
    let env_path = environment(args)?;
    let core = core(args, env_path);
    Ok(Client::new(core))
}

/// The client reads the daemon's configuration only to find its socket and
/// PID file.
fn environment(args: &Arguments) -> Result<EnvironmentPath, Whatever> {
    let res = match &args.config {
        Some(path) => config::load_with_path(path),
        None => config::load_with_xdg(APP_NAME),
    };
    let configuration = res.whatever_context("Could not load configuration")?;
    let runtime = configuration.runtime;

    let xdg = LazyCell::new(|| Xdg::new(APP_NAME));
    let resolve = |file: &str| -> Result<PathBuf, Whatever> {
        xdg.as_ref()
            .map_err(Clone::clone)
            .and_then(|xdg| xdg.resolve(XdgBaseKind::Runtime, file))
            .whatever_context("Could not use XDG base directories")
    };

    let socket = match runtime.socket {
        Some(socket) => socket,
        None => resolve("daemon.socket")?,
    };
    let pid = match runtime.pid {
        Some(pid) => pid,
        None => resolve("daemon.pid")?,
    };

    Ok(EnvironmentPath { socket, pid })
}

fn core(args: &Arguments, env_path: EnvironmentPath) -> Arc<ApplicationCore> {
    let (executable, verbosity) = match &args.command {
        Command::Init {
            executable,
            verbosity,
        } => (executable.clone(), *verbosity),
        _ => (None, Level::INFO),
    };

    let connector: Arc<dyn Connector> = Arc::new(UnixConnector::new(env_path.socket));

    let init_port = Arc::new(InitService::new(
        executable,
        env_path.pid,
        DAEMON_NAME.to_owned(),
        args.config.clone(),
        verbosity,
    ));
    let set_port = Arc::new(SetService::new(Arc::clone(&connector)));
    let clear_port = Arc::new(ClearService::new(Arc::clone(&connector)));
    let query_port = Arc::new(QueryService::new(connector));

    Arc::new(ApplicationCore::setup(init_port, set_port, clear_port, query_port))
}
