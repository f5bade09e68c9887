use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io::Error as IoError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snafu::prelude::*;
use xdg::{BaseDirectories, BaseDirectoriesError};

/// XDG base directories of one application. Every path handed out lives in
/// the application's own subdirectory.
pub struct Xdg {
    base: BaseDirectories,
}

impl Xdg {
    /// Read the XDG environment for the application named `prefix`.
    ///
    /// # Errors
    ///
    /// This function will return an error if the environment is unusable,
    /// e.g. `HOME` is not set.
    pub fn new<P: AsRef<Path>>(prefix: P) -> Result<Self, XdgError> {
        BaseDirectories::with_prefix(prefix)
            .map(|base| Self { base })
            .context(InitSnafu)
    }

    /// Path of `file` under the base directory of `kind`. Nothing is created.
    ///
    /// # Errors
    ///
    /// This function will return an error if `kind` is
    /// [`XdgBaseKind::Runtime`] and `XDG_RUNTIME_DIR` is missing or unsafe.
    pub fn resolve<P: AsRef<Path>>(&self, kind: XdgBaseKind, file: P) -> Result<PathBuf, XdgError> {
        let file = file.as_ref();
        let path = match kind {
            XdgBaseKind::Config => self.base.get_config_file(file),
            XdgBaseKind::Data => self.base.get_data_file(file),
            XdgBaseKind::Cache => self.base.get_cache_file(file),
            XdgBaseKind::Runtime => self
                .base
                .get_runtime_file(file)
                .context(UnavailableSnafu { kind })?,
        };
        Ok(path)
    }

    /// Same as [`Xdg::resolve`], but the parent directories of the returned
    /// path exist afterwards.
    ///
    /// # Errors
    ///
    /// This function will return an error if the directories could not be
    /// created.
    pub fn resolve_create<P: AsRef<Path>>(
        &self,
        kind: XdgBaseKind,
        file: P,
    ) -> Result<PathBuf, XdgError> {
        let file = file.as_ref();
        let placed = match kind {
            XdgBaseKind::Config => self.base.place_config_file(file),
            XdgBaseKind::Data => self.base.place_data_file(file),
            XdgBaseKind::Cache => self.base.place_cache_file(file),
            XdgBaseKind::Runtime => self.base.place_runtime_file(file),
        };
        placed.context(UnavailableSnafu { kind })
    }
}

/// Which of the XDG base directories a path belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XdgBaseKind {
    Config,
    Data,
    Cache,
    Runtime,
}

impl Display for XdgBaseKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Self::Config => "configuration",
            Self::Data => "data",
            Self::Cache => "cache",
            Self::Runtime => "runtime",
        };
        f.write_str(name)
    }
}

/// An error for resolving XDG paths. Cloneable so a lazily built [`Xdg`] can
/// report the same failure to every caller.
#[derive(Debug, Snafu, Clone)]
#[non_exhaustive]
pub enum XdgError {
    #[snafu(display("Could not read XDG environment"))]
    Init {
        #[snafu(source(from(BaseDirectoriesError, Arc::new)))]
        source: Arc<BaseDirectoriesError>,
    },
    #[snafu(display("XDG {kind} directory is not available"))]
    Unavailable {
        kind: XdgBaseKind,
        #[snafu(source(from(IoError, Arc::new)))]
        source: Arc<IoError>,
    },
}
