use std::path::{Path, PathBuf};

use stylist_env::EnvProvider;

/// Picks the first existing `.npmrc` among an ordered list of locations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NpmrcResolver {
    locations: Vec<PathBuf>,
}

impl NpmrcResolver {
    #[must_use]
    pub const fn new(locations: Vec<PathBuf>) -> Self {
        Self { locations }
    }

    /// The locations npm itself reads, most specific first: the project's
    /// `.npmrc`, `$NPM_CONFIG_USERCONFIG` and `~/.npmrc`.
    #[must_use]
    pub fn default_locations(env: &dyn EnvProvider, project_dir: &Path) -> Vec<PathBuf> {
        let mut locations = vec![project_dir.join(".npmrc")];

        if let Some(user_config) = env.var_non_empty("NPM_CONFIG_USERCONFIG") {
            locations.push(PathBuf::from(user_config));
        }
        if let Some(home) = env
            .var_non_empty("HOME")
            .map(PathBuf::from)
            .or_else(home::home_dir)
        {
            locations.push(home.join(".npmrc"));
        }

        locations
    }

    #[must_use]
    pub fn locations(&self) -> &[PathBuf] {
        &self.locations
    }

    #[must_use]
    pub fn try_find(&self) -> Option<PathBuf> {
        let found = self
            .locations
            .iter()
            .find(|location| location.is_file())
            .cloned();

        match &found {
            Some(npmrc) => log::debug!("Using npmrc {}", npmrc.display()),
            None => log::trace!("No npmrc among {} location(s)", self.locations.len()),
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use stylist_env::simulator::SimulatorEnv;

    use super::*;

    #[test_log::test]
    fn first_existing_location_wins() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing/.npmrc");
        let first = dir.path().join("first.npmrc");
        let second = dir.path().join("second.npmrc");
        fs::write(&first, "a").unwrap();
        fs::write(&second, "b").unwrap();

        let resolver = NpmrcResolver::new(vec![missing, first.clone(), second]);

        assert_eq!(resolver.try_find(), Some(first));
    }

    #[test_log::test]
    fn directories_are_not_npmrc_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".npmrc")).unwrap();

        let resolver = NpmrcResolver::new(vec![dir.path().join(".npmrc")]);

        assert_eq!(resolver.try_find(), None);
    }

    #[test_log::test]
    fn default_locations_follow_npm_precedence() {
        let env = SimulatorEnv::with_vars([
            ("HOME", "/home/me"),
            ("NPM_CONFIG_USERCONFIG", "/etc/npm/userrc"),
        ]);

        assert_eq!(
            NpmrcResolver::default_locations(&env, Path::new("/work/app")),
            vec![
                PathBuf::from("/work/app/.npmrc"),
                PathBuf::from("/etc/npm/userrc"),
                PathBuf::from("/home/me/.npmrc"),
            ]
        );
    }

    #[test_log::test]
    fn default_locations_skip_unset_variables() {
        let env = SimulatorEnv::with_vars([("NPM_CONFIG_USERCONFIG", "  "), ("HOME", "/home/me")]);

        assert_eq!(
            NpmrcResolver::default_locations(&env, Path::new("/work/app")),
            vec![
                PathBuf::from("/work/app/.npmrc"),
                PathBuf::from("/home/me/.npmrc"),
            ]
        );
    }

    #[test_log::test]
    fn default_locations_fall_back_to_platform_home_dir() {
        let env = SimulatorEnv::empty();

        let mut expected = vec![PathBuf::from("/work/app/.npmrc")];
        expected.extend(home::home_dir().map(|home| home.join(".npmrc")));

        assert_eq!(
            NpmrcResolver::default_locations(&env, Path::new("/work/app")),
            expected
        );
    }
}
