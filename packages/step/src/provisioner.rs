use std::path::{Path, PathBuf};

use stylist_env::EnvProvider;

use crate::{ArtifactBundle, ArtifactCoordinate, ProvisionError};

/// Fetches the files of an artifact so it can be loaded.
pub trait Provisioner: Send + Sync {
    /// # Errors
    ///
    /// * If the artifact cannot be located or fetched
    fn provision(&self, coordinate: &ArtifactCoordinate) -> Result<ArtifactBundle, ProvisionError>;
}

impl<F> Provisioner for F
where
    F: Fn(&ArtifactCoordinate) -> Result<ArtifactBundle, ProvisionError> + Send + Sync,
{
    fn provision(&self, coordinate: &ArtifactCoordinate) -> Result<ArtifactBundle, ProvisionError> {
        self(coordinate)
    }
}

/// Resolves artifacts from a Maven-layout repository on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepositoryProvisioner {
    root: PathBuf,
}

impl LocalRepositoryProvisioner {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Uses `$M2_REPO` when set, otherwise `~/.m2/repository`.
    ///
    /// # Errors
    ///
    /// * If neither `M2_REPO` nor a home directory is available
    pub fn from_env(env: &dyn EnvProvider) -> Result<Self, ProvisionError> {
        Self::default_root(env)
            .map(Self::new)
            .ok_or(ProvisionError::NoRepository)
    }

    #[must_use]
    pub fn default_root(env: &dyn EnvProvider) -> Option<PathBuf> {
        env.var_non_empty("M2_REPO").map(PathBuf::from).or_else(|| {
            home::home_dir().map(|home| home.join(".m2").join("repository"))
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Provisioner for LocalRepositoryProvisioner {
    fn provision(&self, coordinate: &ArtifactCoordinate) -> Result<ArtifactBundle, ProvisionError> {
        let path = self.root.join(coordinate.repository_path());

        log::debug!("Provisioning {coordinate} from {}", path.display());

        if !path.is_file() {
            return Err(ProvisionError::NotFound {
                coordinate: coordinate.clone(),
                path,
            });
        }

        Ok(ArtifactBundle::new(coordinate.clone(), vec![path]))
    }
}
