use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ProvisionError;

/// A `group:artifact:version[:classifier]` triple identifying an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactCoordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

impl ArtifactCoordinate {
    #[must_use]
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            classifier: None,
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// The jar file name, e.g. `ktfmt-0.21.jar`.
    #[must_use]
    pub fn file_name(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!("{}-{}-{classifier}.jar", self.artifact, self.version),
            None => format!("{}-{}.jar", self.artifact, self.version),
        }
    }

    /// The `-Dartifact` form understood by `mvn dependency:get`, which puts
    /// the packaging before the classifier.
    #[must_use]
    pub fn maven_artifact(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}:{}:{}:jar:{classifier}",
                self.group, self.artifact, self.version
            ),
            None => format!("{}:{}:{}", self.group, self.artifact, self.version),
        }
    }

    /// Path of the jar relative to the root of a Maven-layout repository.
    #[must_use]
    pub fn repository_path(&self) -> PathBuf {
        let mut path: PathBuf = self.group.split('.').collect();
        path.push(&self.artifact);
        path.push(&self.version);
        path.push(self.file_name());
        path
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        Ok(())
    }
}

impl FromStr for ArtifactCoordinate {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(':').map(str::trim).collect::<Vec<_>>();

        if parts.iter().any(|part| part.is_empty()) {
            return Err(ProvisionError::InvalidCoordinate(s.to_string()));
        }

        match parts.as_slice() {
            [group, artifact, version] => Ok(Self::new(*group, *artifact, *version)),
            [group, artifact, version, classifier] => {
                Ok(Self::new(*group, *artifact, *version).with_classifier(*classifier))
            }
            _ => Err(ProvisionError::InvalidCoordinate(s.to_string())),
        }
    }
}

/// The files an artifact resolved to, in classpath order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactBundle {
    coordinate: ArtifactCoordinate,
    files: Vec<PathBuf>,
}

impl ArtifactBundle {
    #[must_use]
    pub const fn new(coordinate: ArtifactCoordinate, files: Vec<PathBuf>) -> Self {
        Self { coordinate, files }
    }

    #[must_use]
    pub const fn coordinate(&self) -> &ArtifactCoordinate {
        &self.coordinate
    }

    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}
