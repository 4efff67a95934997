use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use stylist_env::{EnvProvider, standard::StandardEnv};

/// Environment variable naming an npm executable to use.
pub const NPM_ENV_VAR: &str = "STYLIST_NPM";

const NVM_BIN: &str = "NVM_BIN";
const NVM_SYMLINK: &str = "NVM_SYMLINK";

#[cfg(windows)]
const NPM_FILE_NAMES: &[&str] = &["npm.cmd", "npm.exe", "npm"];
#[cfg(not(windows))]
const NPM_FILE_NAMES: &[&str] = &["npm"];

/// Finds an npm executable when none was configured.
///
/// Places are tried in this order:
///
/// 1. the file named by `$STYLIST_NPM`
/// 2. `npm` inside `$NVM_BIN`
/// 3. `npm` inside `$NVM_SYMLINK` (nvm-windows)
/// 4. `npm` on the `PATH`
pub struct NpmExecutableResolver {
    env: Arc<dyn EnvProvider>,
}

impl NpmExecutableResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::with_env(Arc::new(StandardEnv::new()))
    }

    #[must_use]
    pub fn with_env(env: Arc<dyn EnvProvider>) -> Self {
        Self { env }
    }

    /// First npm executable found, if any.
    #[must_use]
    pub fn try_find(&self) -> Option<PathBuf> {
        self.from_explicit_env()
            .or_else(|| self.from_dir_var(NVM_BIN))
            .or_else(|| self.from_dir_var(NVM_SYMLINK))
            .or_else(|| self.from_path())
    }

    /// Describes where [`Self::try_find`] looks and how to configure npm
    /// explicitly instead.
    #[must_use]
    pub fn explain_message() -> String {
        format!(
            "npm is looked for in the following places, in order:\n\
             - the executable named by the environment variable {NPM_ENV_VAR}\n\
             - the directory named by the environment variable {NVM_BIN} (set by nvm)\n\
             - the directory named by the environment variable {NVM_SYMLINK} (set by nvm-windows)\n\
             - the directories on the PATH\n\
             \n\
             If npm is installed somewhere else, set {NPM_ENV_VAR}, or configure the executable \
             explicitly with `executable` in the [npm] section of stylist.toml or the \
             `--executable` flag."
        )
    }

    fn from_explicit_env(&self) -> Option<PathBuf> {
        let npm = PathBuf::from(self.env.var_non_empty(NPM_ENV_VAR)?);

        if npm.is_file() {
            log::debug!("Using npm from {NPM_ENV_VAR}: {}", npm.display());
            return Some(npm);
        }

        log::warn!(
            "{NPM_ENV_VAR} is set to '{}' but no such file exists",
            npm.display()
        );
        None
    }

    fn from_dir_var(&self, name: &str) -> Option<PathBuf> {
        let dir = PathBuf::from(self.env.var_non_empty(name)?);
        let npm = find_in_dir(&dir);

        match &npm {
            Some(npm) => log::debug!("Using npm from {name}: {}", npm.display()),
            None => log::trace!("{name} is set but {} has no npm", dir.display()),
        }

        npm
    }

    fn from_path(&self) -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;

        match which::which_in("npm", self.env.var_non_empty("PATH"), cwd) {
            Ok(npm) => {
                log::debug!("Using npm from PATH: {}", npm.display());
                Some(npm)
            }
            Err(e) => {
                log::trace!("npm not found on PATH: {e}");
                None
            }
        }
    }
}

impl Default for NpmExecutableResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn find_in_dir(dir: &Path) -> Option<PathBuf> {
    NPM_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}
