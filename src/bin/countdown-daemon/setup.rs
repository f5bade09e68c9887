use std::cell::LazyCell;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Router;
use countdown::daemon::app::web::{self, WebState};
use countdown::daemon::app::{Server, UnixListener};
use countdown::daemon::cache::{CacheStorage, DirectoryOrigin, OfflineCache};
use countdown::daemon::config::{self, Configuration};
use countdown::daemon::outbound::{DisplayLogger, NotifyService, SystemClock};
use countdown::daemon::repository::{IntervalStorage, KeyValueStore, NotificationConfiguration};
use countdown::daemon::runtime::{Environment, ProcessController};
use countdown::domain::daemon::outbound::ClockPort;
use countdown::domain::daemon::ApplicationCore;
use countdown::tracing_report;
use countdown::utils::signal::shutdown_signal;
use countdown::utils::xdg::{Xdg, XdgBaseKind, XdgError};
use snafu::{prelude::*, Whatever};

use crate::cli::Arguments;

const APP_NAME: &str = "countdown";
const DAEMON_NAME: &str = "countdown-daemon";

struct EnvironmentPath {
    socket: PathBuf,
    pid: PathBuf,
    state: PathBuf,
}

struct WebFront {
    address: SocketAddr,
    router: Router,
}

/// Everything the daemon serves, ready to run.
pub struct Daemon {
    core: Arc<ApplicationCore>,
    server: Server,
    web: Option<WebFront>,
    process: ProcessController,
    socket: PathBuf,
}

pub async fn bootstrap(arg: Arguments) -> Result<Daemon, Whatever> {
    let configuration = configuration(&arg)?;
    let xdg = LazyCell::new(|| Xdg::new(APP_NAME));
    let env_path = environment_path(&arg, &configuration, &xdg)?;

    let process = process(&arg, &env_path)?;
    let listener = listener(&env_path.socket)?;

    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock);
    let core = Arc::new(core(&configuration, &env_path, Arc::clone(&clock)).await?);
    let web = web_front(&configuration, &xdg, Arc::clone(&core), clock).await?;

    Ok(Daemon {
        server: Server::new(Box::new(listener), Arc::clone(&core)),
        core,
        web,
        process,
        socket: env_path.socket,
    })
}

impl Daemon {
    /// Serve until a fatal error or a shutdown signal, then stop the
    /// countdown worker and remove the runtime files.
    pub async fn run(self) -> Result<(), Whatever> {
        let res = self.serve().await;
        self.core.stop.stop().await;

        if let Err(err) = self.process.release() {
            tracing_report!(err, "Could not release PID file");
        }
        match std::fs::remove_file(&self.socket) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => tracing_report!(err, "Could not remove socket"),
        }

        tracing::info!("Daemon stopped");
        res
    }

    async fn serve(&self) -> Result<(), Whatever> {
        let web = async {
            match &self.web {
                Some(front) => web::serve(front.address, front.router.clone()).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            res = self.server.serve() => res.whatever_context("Server failed to serve with fatal"),
            res = web => res.whatever_context("Web front failed to serve with fatal"),
            res = shutdown_signal() => res.whatever_context("Could not wait for shutdown signals"),
        }
    }
}

fn configuration(arg: &Arguments) -> Result<Arc<Configuration>, Whatever> {
    let res = match &arg.config {
        Some(path) => config::load_with_path(path),
        None => config::load_with_xdg(APP_NAME),
    };

    let configuration = res.whatever_context("Could not load configuration")?;
    Ok(Arc::new(configuration))
}

fn resolve<F>(xdg: &LazyCell<Result<Xdg, XdgError>, F>, kind: XdgBaseKind, file: &str) -> Result<PathBuf, Whatever>
where
    F: FnOnce() -> Result<Xdg, XdgError>,
{
    xdg.as_ref()
        .map_err(Clone::clone)
        .and_then(|xdg| xdg.resolve(kind, file))
        .whatever_context("Could not use XDG base directories")
}

fn environment_path<F>(
    arg: &Arguments,
    configuration: &Configuration,
    xdg: &LazyCell<Result<Xdg, XdgError>, F>,
) -> Result<EnvironmentPath, Whatever>
where
    F: FnOnce() -> Result<Xdg, XdgError>,
{
    let runtime = &configuration.runtime;

    let socket = match arg.socket.as_ref().or(runtime.socket.as_ref()) {
        Some(socket) => socket.clone(),
        None => resolve(xdg, XdgBaseKind::Runtime, "daemon.socket")?,
    };
    let pid = match &runtime.pid {
        Some(pid) => pid.clone(),
        None => resolve(xdg, XdgBaseKind::Runtime, "daemon.pid")?,
    };
    let state = match &runtime.state {
        Some(state) => state.clone(),
        None => resolve(xdg, XdgBaseKind::Data, "state.toml")?,
    };

    Ok(EnvironmentPath { socket, pid, state })
}

fn parent(path: &Path) -> Result<&Path, Whatever> {
    path.parent()
        .with_whatever_context(|| format!("Invalid runtime path: {}", path.display()))
}

/// Create the runtime directories, claim the PID file and only then remove a
/// socket left behind by a previous instance.
fn process(arg: &Arguments, env_path: &EnvironmentPath) -> Result<ProcessController, Whatever> {
    let mut env = Environment::new();
    env.register_directory(parent(&env_path.socket)?, Some(0o700));
    env.register_directory(parent(&env_path.pid)?, Some(0o700));
    env.setup()
        .whatever_context("Could not setup environment")?;

    let process = ProcessController::new(DAEMON_NAME.to_owned(), env_path.pid.clone(), arg.daemonize);
    process
        .start()
        .whatever_context("Could not prepare process")?;

    let mut env = Environment::new();
    env.register_stale_file(&env_path.socket);
    env.setup()
        .whatever_context("Could not remove stale runtime files")?;

    Ok(process)
}

fn listener(path: &Path) -> Result<UnixListener, Whatever> {
    let listener = UnixListener::new(path)
        .with_whatever_context(|_| format!("Could not bind to {}", path.display()))?;
    tracing::info!(socket = %path.display(), "Listening for requests");
    Ok(listener)
}

async fn core(
    configuration: &Arc<Configuration>,
    env_path: &EnvironmentPath,
    clock: Arc<dyn ClockPort>,
) -> Result<ApplicationCore, Whatever> {
    let notification = &configuration.notification;
    let notify_port = Arc::new(NotifyService::new(APP_NAME.to_owned(), notification.enabled));
    let display_port = Arc::new(DisplayLogger);
    let interval_repository = Arc::new(IntervalStorage::new(KeyValueStore::new(&env_path.state)));
    let notification_repository = Arc::new(NotificationConfiguration::new(Arc::clone(configuration)));

    ApplicationCore::setup(
        notify_port,
        display_port,
        clock,
        interval_repository,
        notification_repository,
    )
    .await
    .whatever_context("Could not setup application core")
}

/// Build the HTTP front if an address is configured. A failed cache
/// installation only disables offline assets until the next start.
async fn web_front<F>(
    configuration: &Configuration,
    xdg: &LazyCell<Result<Xdg, XdgError>, F>,
    core: Arc<ApplicationCore>,
    clock: Arc<dyn ClockPort>,
) -> Result<Option<WebFront>, Whatever>
where
    F: FnOnce() -> Result<Xdg, XdgError>,
{
    let content = &configuration.web;
    let Some(address) = content.address else {
        return Ok(None);
    };

    let root = match &content.root {
        Some(root) => root.clone(),
        None => resolve(xdg, XdgBaseKind::Data, "www")?,
    };
    let cache_base = resolve(xdg, XdgBaseKind::Cache, "")?;

    let cache = OfflineCache::new(
        CacheStorage::open(cache_base, &content.cache),
        Arc::new(DirectoryOrigin::new(root)),
    );
    if let Err(err) = cache.install(&content.manifest).await {
        tracing_report!(err, "Could not install offline cache");
    }

    let router = web::create_router(WebState {
        core,
        cache: Arc::new(cache),
        clock,
    });
    Ok(Some(WebFront { address, router }))
}
