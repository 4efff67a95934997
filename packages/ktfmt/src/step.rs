use std::sync::Arc;

use serde::Serialize;
use stylist_step::{ArtifactCoordinate, FormatterFunc, FormatterStep, Provisioner, StepError};

use crate::{
    FormattingOptions, KtfmtApi, KtfmtLoader, LookupError, MAVEN_COORDINATE, NAME,
    SELF_CONTAINED_CLASSIFIER, Style, default_version, java::JavaCliLoader,
};

/// Which accessor family produced a style's options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsSource {
    /// A `*_FORMAT` constant (ktfmt 0.19 and later).
    FormatConstant,
    /// A `FormattingOptions.Companion` factory (older ktfmt).
    CompanionFactory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub options: FormattingOptions,
    pub source: OptionsSource,
}

/// Looks up the options object for `style` on a loaded module.
///
/// The format constant is tried first. Only a missing constant
/// ([`LookupError::FieldNotFound`]) falls back to the companion factory; any
/// other lookup failure is returned as is. [`Style::Default`] needs no
/// options and yields `None`.
///
/// # Errors
///
/// * If the constant lookup fails for a reason other than a missing field
/// * If the companion factory fallback fails
pub fn resolve_style_options(
    api: &dyn KtfmtApi,
    style: Style,
) -> Result<Option<ResolvedOptions>, LookupError> {
    let Some((format, method)) = style.accessors() else {
        return Ok(None);
    };

    match api.format_constant(format) {
        Ok(options) => {
            log::debug!("Using {} for ktfmt style {style}", format.field_name());
            Ok(Some(ResolvedOptions {
                options,
                source: OptionsSource::FormatConstant,
            }))
        }
        Err(LookupError::FieldNotFound(field)) => {
            log::debug!(
                "ktfmt has no {field}, falling back to FormattingOptions.Companion.{}()",
                method.method_name()
            );
            let options = api.companion_style(method)?;
            Ok(Some(ResolvedOptions {
                options,
                source: OptionsSource::CompanionFactory,
            }))
        }
        Err(e) => Err(e),
    }
}

/// Wraps up ktfmt as a [`FormatterStep`].
pub struct KtfmtStep;

impl KtfmtStep {
    /// Step with the default version and style.
    ///
    /// # Errors
    ///
    /// * If the step configuration is invalid
    pub fn create(provisioner: Arc<dyn Provisioner>) -> Result<FormatterStep, StepError> {
        Self::create_with_version(default_version(), provisioner)
    }

    /// Step with the default style.
    ///
    /// # Errors
    ///
    /// * If `version` is empty
    pub fn create_with_version(
        version: &str,
        provisioner: Arc<dyn Provisioner>,
    ) -> Result<FormatterStep, StepError> {
        Self::create_with_style(version, provisioner, Style::Default)
    }

    /// # Errors
    ///
    /// * If `version` is empty
    pub fn create_with_style(
        version: &str,
        provisioner: Arc<dyn Provisioner>,
        style: Style,
    ) -> Result<FormatterStep, StepError> {
        Self::builder()
            .version(version)
            .provisioner(provisioner)
            .style(style)
            .build()
    }

    #[must_use]
    pub fn builder() -> KtfmtStepBuilder {
        KtfmtStepBuilder::default()
    }
}

pub struct KtfmtStepBuilder {
    version: Option<String>,
    provisioner: Option<Arc<dyn Provisioner>>,
    style: Option<Style>,
    loader: Option<Arc<dyn KtfmtLoader>>,
    classifier: Option<String>,
}

impl Default for KtfmtStepBuilder {
    fn default() -> Self {
        Self {
            version: None,
            provisioner: None,
            style: None,
            loader: None,
            classifier: Some(SELF_CONTAINED_CLASSIFIER.to_string()),
        }
    }
}

impl KtfmtStepBuilder {
    #[must_use]
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    #[must_use]
    pub fn provisioner(mut self, provisioner: Arc<dyn Provisioner>) -> Self {
        self.provisioner = Some(provisioner);
        self
    }

    #[must_use]
    pub const fn style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Overrides how the provisioned artifact is loaded. Defaults to
    /// [`JavaCliLoader`].
    #[must_use]
    pub fn loader(mut self, loader: Arc<dyn KtfmtLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Classifier of the ktfmt jar to provision. Defaults to
    /// [`SELF_CONTAINED_CLASSIFIER`]; `None` asks for the plain jar, which only
    /// runs when the provisioner also supplies ktfmt's dependencies.
    #[must_use]
    pub fn classifier(mut self, classifier: Option<String>) -> Self {
        self.classifier = classifier.filter(|classifier| !classifier.trim().is_empty());
        self
    }

    /// Validates the configuration and returns the (uninitialized) step.
    /// Nothing is fetched or loaded until the first `format`.
    ///
    /// # Errors
    ///
    /// * [`StepError::MissingArgument`] if the version, provisioner or style is missing
    pub fn build(self) -> Result<FormatterStep, StepError> {
        let version = self
            .version
            .filter(|version| !version.trim().is_empty())
            .ok_or(StepError::MissingArgument("version"))?;
        let provisioner = self
            .provisioner
            .ok_or(StepError::MissingArgument("provisioner"))?;
        let style = self.style.ok_or(StepError::MissingArgument("style"))?;
        let loader = self
            .loader
            .unwrap_or_else(|| Arc::new(JavaCliLoader::new()) as Arc<dyn KtfmtLoader>);

        let mut coordinate: ArtifactCoordinate = format!("{MAVEN_COORDINATE}{}", version.trim())
            .parse()
            .map_err(StepError::Provision)?;
        if let Some(classifier) = self.classifier {
            coordinate = coordinate.with_classifier(classifier.trim());
        }

        let state = State {
            coordinate,
            style,
            provisioner,
            loader,
        };

        FormatterStep::create_lazy(NAME, state, State::create_format)
    }
}

#[derive(Serialize)]
struct State {
    coordinate: ArtifactCoordinate,
    style: Style,
    #[serde(skip_serializing)]
    provisioner: Arc<dyn Provisioner>,
    #[serde(skip_serializing)]
    loader: Arc<dyn KtfmtLoader>,
}

impl State {
    fn create_format(&self) -> Result<Arc<dyn FormatterFunc>, StepError> {
        let bundle = self.provisioner.provision(&self.coordinate)?;
        let api = self.loader.load(&bundle).map_err(StepError::Load)?;

        log::debug!(
            "Loaded {} from {} file(s)",
            self.coordinate,
            bundle.files().len()
        );

        let resolved = resolve_style_options(api.as_ref(), self.style)
            .map_err(|e| StepError::Load(Box::new(e)))?;

        let func: Arc<dyn FormatterFunc> = match resolved {
            None => Arc::new(move |input: &str| api.format(input)),
            Some(ResolvedOptions { options, .. }) => {
                Arc::new(move |input: &str| api.format_with_options(&options, input))
            }
        };

        Ok(func)
    }
}
