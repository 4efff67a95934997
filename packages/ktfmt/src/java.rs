//! Runs a provisioned ktfmt artifact through its command line with `java`.
//!
//! Each loaded artifact is one [`JavaCliApi`]: the java executable, the
//! artifact's classpath and the ktfmt version, which decides which options
//! accessors exist. Every format call is a separate JVM process reading the
//! source from stdin, so calls share nothing and may run in parallel.

use std::{
    ffi::OsString,
    fmt,
    io::Write as _,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    str::FromStr,
    sync::Arc,
};

use stylist_env::{EnvProvider, standard::StandardEnv};
use stylist_step::{ArtifactBundle, DelegateError};
use thiserror::Error;

use crate::{Format, FormattingOptions, KtfmtApi, KtfmtLoader, LookupError, StyleMethod};

#[derive(Debug, Error)]
pub enum JavaCliError {
    #[error(
        "Can't find a java executable. Set JAVA_HOME, put java on the PATH or configure an explicit java path."
    )]
    JavaNotFound,
    #[error("Invalid ktfmt version '{0}'")]
    InvalidVersion(String),
    #[error("Invalid classpath: {0}")]
    Classpath(#[from] std::env::JoinPathsError),
    #[error("Failed to start '{}': {source}", .java.display())]
    Spawn {
        java: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ktfmt exited with {}: {stderr}", .code.map_or_else(|| "a signal".to_string(), |code| format!("status {code}")))]
    Exit { code: Option<i32>, stderr: String },
    #[error("ktfmt produced output that is not valid UTF-8")]
    NonUtf8Output(#[from] std::string::FromUtf8Error),
    #[error("The thread writing to ktfmt's stdin panicked")]
    WriterPanicked,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A parsed `major.minor[.patch]` ktfmt version. Qualifiers such as
/// `-SNAPSHOT` are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KtfmtVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl KtfmtVersion {
    /// First release with the `*_FORMAT` constants.
    pub const FORMAT_CONSTANTS: Self = Self::new(0, 19, 0);
    /// First release with `KOTLINLANG_FORMAT`.
    pub const KOTLINLANG: Self = Self::new(0, 21, 0);
    /// First release with the `com.facebook.ktfmt.cli` package.
    pub const CLI_PACKAGE: Self = Self::new(0, 31, 0);

    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Whether this version has the given `*_FORMAT` constant.
    #[must_use]
    pub fn has_format_constant(self, format: Format) -> bool {
        match format {
            Format::Dropbox | Format::Google => self >= Self::FORMAT_CONSTANTS,
            Format::Kotlinlang => self >= Self::KOTLINLANG,
        }
    }

    #[must_use]
    pub fn main_class(self) -> &'static str {
        if self >= Self::CLI_PACKAGE {
            "com.facebook.ktfmt.cli.Main"
        } else {
            "com.facebook.ktfmt.MainKt"
        }
    }
}

impl fmt::Display for KtfmtVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for KtfmtVersion {
    type Err = JavaCliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || JavaCliError::InvalidVersion(s.to_string());
        let release = s.trim().split(['-', '+']).next().unwrap_or_default();
        let mut parts = release.split('.');

        let mut next = |required: bool| -> Result<u32, JavaCliError> {
            match parts.next() {
                Some(part) => part.parse().map_err(|_| invalid()),
                None if required => Err(invalid()),
                None => Ok(0),
            }
        };

        let version = Self::new(next(true)?, next(true)?, next(false)?);

        if parts.next().is_some() {
            return Err(invalid());
        }

        Ok(version)
    }
}

/// Loads ktfmt artifacts as [`JavaCliApi`]s.
pub struct JavaCliLoader {
    java: Option<PathBuf>,
    main_class: Option<String>,
    env: Arc<dyn EnvProvider>,
}

impl JavaCliLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::with_env(Arc::new(StandardEnv::new()))
    }

    #[must_use]
    pub fn with_env(env: Arc<dyn EnvProvider>) -> Self {
        Self {
            java: None,
            main_class: None,
            env,
        }
    }

    /// Uses this java executable instead of looking one up.
    #[must_use]
    pub fn java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = Some(java.into());
        self
    }

    /// Overrides the main class derived from the ktfmt version.
    #[must_use]
    pub fn main_class(mut self, main_class: impl Into<String>) -> Self {
        self.main_class = Some(main_class.into());
        self
    }

    /// Explicit path, then `$JAVA_HOME/bin/java`, then `java` on the `PATH`.
    ///
    /// # Errors
    ///
    /// * [`JavaCliError::JavaNotFound`] if none of those yields an executable
    pub fn resolve_java(&self) -> Result<PathBuf, JavaCliError> {
        if let Some(java) = &self.java {
            return Ok(java.clone());
        }

        let binary = if cfg!(windows) { "java.exe" } else { "java" };

        if let Some(java_home) = self.env.var_non_empty("JAVA_HOME") {
            let java = Path::new(&java_home).join("bin").join(binary);
            if java.is_file() {
                log::debug!("Using java from JAVA_HOME: {}", java.display());
                return Ok(java);
            }
            log::warn!(
                "JAVA_HOME is set to '{java_home}' but {} does not exist",
                java.display()
            );
        }

        let cwd = std::env::current_dir()?;

        which::which_in("java", self.env.var_non_empty("PATH"), cwd).map_err(|e| {
            log::debug!("java not found on PATH: {e}");
            JavaCliError::JavaNotFound
        })
    }
}

impl Default for JavaCliLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl KtfmtLoader for JavaCliLoader {
    fn load(&self, bundle: &ArtifactBundle) -> Result<Arc<dyn KtfmtApi>, DelegateError> {
        let version: KtfmtVersion = bundle.coordinate().version.parse()?;
        let java = self.resolve_java()?;
        let classpath = std::env::join_paths(bundle.files()).map_err(JavaCliError::from)?;
        let main_class = self
            .main_class
            .clone()
            .unwrap_or_else(|| version.main_class().to_string());

        log::debug!(
            "Loaded ktfmt {version} with {} ({main_class})",
            java.display()
        );

        Ok(Arc::new(JavaCliApi {
            java,
            classpath,
            main_class,
            version,
        }))
    }
}

/// One loaded ktfmt artifact, invoked as `java -cp <jars> <main> [flag] -`.
#[derive(Debug, Clone)]
pub struct JavaCliApi {
    java: PathBuf,
    classpath: OsString,
    main_class: String,
    version: KtfmtVersion,
}

impl JavaCliApi {
    #[must_use]
    pub const fn version(&self) -> KtfmtVersion {
        self.version
    }

    fn run(&self, flag: Option<&str>, input: &str) -> Result<String, JavaCliError> {
        let mut command = Command::new(&self.java);
        command.arg("-cp").arg(&self.classpath).arg(&self.main_class);
        if let Some(flag) = flag {
            command.arg(flag);
        }
        command
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        log::trace!("Running {command:?}");

        let mut child = command.spawn().map_err(|source| JavaCliError::Spawn {
            java: self.java.clone(),
            source,
        })?;
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("ktfmt stdin was not captured"))?;

        // The child may fill its stdout pipe before it has read all of stdin.
        let (written, output) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(input.as_bytes()));
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output = output?;

        if !output.status.success() {
            return Err(JavaCliError::Exit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        written.map_err(|_| JavaCliError::WriterPanicked)??;

        Ok(String::from_utf8(output.stdout)?)
    }
}

impl KtfmtApi for JavaCliApi {
    fn format(&self, input: &str) -> Result<String, DelegateError> {
        Ok(self.run(None, input)?)
    }

    /// The ktfmt command line only accepts a style flag, so `options` is
    /// reduced to [`FormattingOptions::cli_flag`]. `max_width`,
    /// `continuation_indent` and `remove_unused_imports` take the values of
    /// that flag's preset ([`FormattingOptions::cli_preset`]).
    fn format_with_options(
        &self,
        options: &FormattingOptions,
        input: &str,
    ) -> Result<String, DelegateError> {
        if !options.is_cli_preset() {
            log::warn!(
                "ktfmt command line can't express {options:?}; formatting with {:?} instead",
                options.cli_preset()
            );
        }
        Ok(self.run(options.cli_flag(), input)?)
    }

    fn format_constant(&self, format: Format) -> Result<FormattingOptions, LookupError> {
        if !self.version.has_format_constant(format) {
            return Err(LookupError::FieldNotFound(format.field_name().to_string()));
        }

        Ok(match format {
            Format::Dropbox => FormattingOptions::dropbox(),
            Format::Google => FormattingOptions::google(),
            Format::Kotlinlang => FormattingOptions::kotlinlang(),
        })
    }

    fn companion_style(&self, method: StyleMethod) -> Result<FormattingOptions, LookupError> {
        match method {
            StyleMethod::Dropbox => Ok(FormattingOptions::dropbox()),
            StyleMethod::Google => Ok(FormattingOptions::google()),
            StyleMethod::Kotlinlang => Err(LookupError::MethodNotFound(
                method.method_name().to_string(),
            )),
        }
    }
}
