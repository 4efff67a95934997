use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use pretty_assertions::assert_eq;
use stylist_ktfmt::{
    Format, FormattingOptions, KtfmtApi, KtfmtLoader, KtfmtStep, LookupError, OptionsSource,
    Style, StyleMethod, resolve_style_options,
};
use stylist_step::{
    ArtifactBundle, ArtifactCoordinate, DelegateError, FormatError, LocalRepositoryProvisioner,
    ProvisionError, Provisioner, StepError,
};

/// Which accessor family a stub artifact exposes.
#[derive(Clone, Copy)]
enum Generation {
    /// ktfmt 0.19+: `*_FORMAT` constants.
    Fields,
    /// Older ktfmt: only `FormattingOptions.Companion` factories.
    Legacy,
    /// A constant that exists but can't be read.
    BrokenField,
}

const LEGACY_MARKER: u32 = 7;

#[derive(Default)]
struct Calls {
    format: AtomicUsize,
    format_with_options: AtomicUsize,
    format_constant: AtomicUsize,
    companion_style: AtomicUsize,
}

struct StubKtfmt {
    generation: Generation,
    calls: Arc<Calls>,
}

impl KtfmtApi for StubKtfmt {
    fn format(&self, input: &str) -> Result<String, DelegateError> {
        self.calls.format.fetch_add(1, Ordering::SeqCst);
        if input.contains("syntax error") {
            return Err("Expecting an expression".into());
        }
        Ok(input.replace('=', " = "))
    }

    fn format_with_options(
        &self,
        options: &FormattingOptions,
        input: &str,
    ) -> Result<String, DelegateError> {
        self.calls.format_with_options.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "[{:?} indent={} width={}] {input}",
            options.style, options.block_indent, options.max_width
        ))
    }

    fn format_constant(&self, format: Format) -> Result<FormattingOptions, LookupError> {
        self.calls.format_constant.fetch_add(1, Ordering::SeqCst);
        match self.generation {
            Generation::Fields => Ok(match format {
                Format::Dropbox => FormattingOptions::dropbox(),
                Format::Google => FormattingOptions::google(),
                Format::Kotlinlang => FormattingOptions::kotlinlang(),
            }),
            Generation::Legacy => Err(LookupError::FieldNotFound(format.field_name().to_string())),
            Generation::BrokenField => Err(LookupError::Inaccessible {
                name: format.field_name().to_string(),
                reason: "IllegalAccessException".to_string(),
            }),
        }
    }

    fn companion_style(&self, method: StyleMethod) -> Result<FormattingOptions, LookupError> {
        self.calls.companion_style.fetch_add(1, Ordering::SeqCst);
        match method {
            StyleMethod::Dropbox => Ok(FormattingOptions {
                max_width: LEGACY_MARKER,
                ..FormattingOptions::dropbox()
            }),
            StyleMethod::Google => Ok(FormattingOptions {
                max_width: LEGACY_MARKER,
                ..FormattingOptions::google()
            }),
            StyleMethod::Kotlinlang => Err(LookupError::MethodNotFound(
                method.method_name().to_string(),
            )),
        }
    }
}

#[derive(Default)]
struct CountingProvisioner {
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl Provisioner for CountingProvisioner {
    fn provision(&self, coordinate: &ArtifactCoordinate) -> Result<ArtifactBundle, ProvisionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(coordinate.to_string());
        Ok(ArtifactBundle::new(
            coordinate.clone(),
            vec![format!("/repo/{}", coordinate.file_name()).into()],
        ))
    }
}

struct StubLoader {
    generation: Generation,
    calls: Arc<Calls>,
    loads: AtomicUsize,
}

impl StubLoader {
    fn new(generation: Generation) -> Self {
        Self {
            generation,
            calls: Arc::default(),
            loads: AtomicUsize::new(0),
        }
    }
}

impl KtfmtLoader for StubLoader {
    fn load(&self, _bundle: &ArtifactBundle) -> Result<Arc<dyn KtfmtApi>, DelegateError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(StubKtfmt {
            generation: self.generation,
            calls: Arc::clone(&self.calls),
        }))
    }
}

fn step(
    version: &str,
    style: Style,
    provisioner: &Arc<CountingProvisioner>,
    loader: &Arc<StubLoader>,
) -> stylist_step::FormatterStep {
    KtfmtStep::builder()
        .version(version)
        .provisioner(Arc::clone(provisioner) as Arc<dyn Provisioner>)
        .style(style)
        .loader(Arc::clone(loader) as Arc<dyn KtfmtLoader>)
        .build()
        .unwrap()
}

#[test_log::test]
fn default_style_calls_single_argument_entry_point() {
    let provisioner = Arc::new(CountingProvisioner::default());
    let loader = Arc::new(StubLoader::new(Generation::Fields));
    let step = step("0.21", Style::Default, &provisioner, &loader);

    assert_eq!(step.format("val x=1").unwrap(), "val x = 1");

    assert_eq!(loader.calls.format.load(Ordering::SeqCst), 1);
    assert_eq!(loader.calls.format_with_options.load(Ordering::SeqCst), 0);
    assert_eq!(loader.calls.format_constant.load(Ordering::SeqCst), 0);
    assert_eq!(loader.calls.companion_style.load(Ordering::SeqCst), 0);
    assert_eq!(
        *provisioner.requested.lock().unwrap(),
        vec!["com.facebook:ktfmt:0.21:jar-with-dependencies".to_string()]
    );
}

#[test_log::test]
fn newer_artifact_uses_format_constant() {
    let provisioner = Arc::new(CountingProvisioner::default());
    let loader = Arc::new(StubLoader::new(Generation::Fields));
    let step = step("0.21", Style::Dropbox, &provisioner, &loader);

    assert_eq!(
        step.format("val x=1").unwrap(),
        "[Dropbox indent=4 width=100] val x=1"
    );

    assert_eq!(loader.calls.format_constant.load(Ordering::SeqCst), 1);
    assert_eq!(loader.calls.companion_style.load(Ordering::SeqCst), 0);
}

#[test_log::test]
fn legacy_artifact_falls_back_to_companion_factory() {
    let provisioner = Arc::new(CountingProvisioner::default());
    let loader = Arc::new(StubLoader::new(Generation::Legacy));
    let step = step("0.18", Style::Dropbox, &provisioner, &loader);

    assert_eq!(
        step.format("val x=1").unwrap(),
        format!("[Dropbox indent=4 width={LEGACY_MARKER}] val x=1")
    );

    assert_eq!(loader.calls.format_constant.load(Ordering::SeqCst), 1);
    assert_eq!(loader.calls.companion_style.load(Ordering::SeqCst), 1);
}

#[test_log::test]
fn resolve_reports_which_accessor_was_used() {
    let calls = Arc::new(Calls::default());
    let fields = StubKtfmt {
        generation: Generation::Fields,
        calls: Arc::clone(&calls),
    };
    let legacy = StubKtfmt {
        generation: Generation::Legacy,
        calls,
    };

    for style in [Style::Dropbox, Style::Google] {
        let resolved = resolve_style_options(&fields, style).unwrap().unwrap();
        assert_eq!(resolved.source, OptionsSource::FormatConstant);

        let resolved = resolve_style_options(&legacy, style).unwrap().unwrap();
        assert_eq!(resolved.source, OptionsSource::CompanionFactory);
        assert_eq!(resolved.options.max_width, LEGACY_MARKER);
    }

    assert_eq!(resolve_style_options(&fields, Style::Default).unwrap(), None);
}

#[test_log::test]
fn other_lookup_failures_do_not_fall_back() {
    let api = StubKtfmt {
        generation: Generation::BrokenField,
        calls: Arc::default(),
    };

    let err = resolve_style_options(&api, Style::Google).unwrap_err();

    assert!(matches!(err, LookupError::Inaccessible { .. }));
    assert_eq!(api.calls.companion_style.load(Ordering::SeqCst), 0);
}

#[test_log::test]
fn missing_companion_factory_is_fatal() {
    let provisioner = Arc::new(CountingProvisioner::default());
    let loader = Arc::new(StubLoader::new(Generation::Legacy));
    let step = step("0.18", Style::Kotlinlang, &provisioner, &loader);

    let err = step.format("val x=1").unwrap_err();

    match err {
        FormatError::Initialization(cause) => {
            assert!(matches!(*cause, StepError::Load(_)));
            assert!(cause.to_string().contains("kotlinlangStyle"), "{cause}");
        }
        FormatError::Delegate(e) => panic!("unexpected delegate error: {e}"),
    }
}

#[test_log::test]
fn delegate_failures_surface_unwrapped() {
    let provisioner = Arc::new(CountingProvisioner::default());
    let loader = Arc::new(StubLoader::new(Generation::Fields));
    let step = step("0.21", Style::Default, &provisioner, &loader);

    let err = step.format("val = syntax error").unwrap_err();

    assert!(matches!(err, FormatError::Delegate(_)));
    assert_eq!(err.to_string(), "Expecting an expression");
}

#[test_log::test]
fn provisioning_happens_once_across_repeated_calls() {
    let provisioner = Arc::new(CountingProvisioner::default());
    let loader = Arc::new(StubLoader::new(Generation::Legacy));
    let step = step("0.18", Style::Google, &provisioner, &loader);

    assert_eq!(provisioner.calls.load(Ordering::SeqCst), 0);

    for _ in 0..5 {
        step.format("val x=1").unwrap();
    }

    assert_eq!(provisioner.calls.load(Ordering::SeqCst), 1);
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    assert_eq!(loader.calls.companion_style.load(Ordering::SeqCst), 1);
    assert_eq!(loader.calls.format_with_options.load(Ordering::SeqCst), 5);
}

#[test_log::test]
fn provisioning_happens_once_across_threads() {
    let provisioner = Arc::new(CountingProvisioner::default());
    let loader = Arc::new(StubLoader::new(Generation::Fields));
    let step = Arc::new(step("0.21", Style::Kotlinlang, &provisioner, &loader));

    std::thread::scope(|scope| {
        for i in 0..8 {
            let step = Arc::clone(&step);
            scope.spawn(move || {
                let output = step.format(&format!("val x{i}=1")).unwrap();
                assert!(output.starts_with("[Google indent=4"), "{output}");
            });
        }
    });

    assert_eq!(provisioner.calls.load(Ordering::SeqCst), 1);
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    assert_eq!(loader.calls.format_with_options.load(Ordering::SeqCst), 8);
}

#[test_log::test]
fn provisioning_failure_surfaces_to_caller() {
    let provisioner: Arc<dyn Provisioner> =
        Arc::new(|coordinate: &ArtifactCoordinate| -> Result<ArtifactBundle, ProvisionError> {
            Err(ProvisionError::NotFound {
                coordinate: coordinate.clone(),
                path: "/nowhere".into(),
            })
        });

    let step = KtfmtStep::builder()
        .version("0.21")
        .provisioner(provisioner)
        .style(Style::Default)
        .loader(Arc::new(StubLoader::new(Generation::Fields)))
        .build()
        .unwrap();

    let err = step.format("val x=1").unwrap_err();

    assert!(matches!(
        err,
        FormatError::Initialization(ref cause)
            if matches!(**cause, StepError::Provision(ProvisionError::NotFound { .. }))
    ));
    assert!(err.to_string().contains("com.facebook:ktfmt:0.21"));
}

#[test_log::test]
fn missing_arguments_fail_before_any_io() {
    let provisioner = Arc::new(CountingProvisioner::default());

    let missing_version = KtfmtStep::builder()
        .provisioner(Arc::clone(&provisioner) as Arc<dyn Provisioner>)
        .style(Style::Default)
        .build();
    let empty_version = KtfmtStep::create_with_style(
        " ",
        Arc::clone(&provisioner) as Arc<dyn Provisioner>,
        Style::Google,
    );
    let missing_provisioner = KtfmtStep::builder().version("0.21").style(Style::Default).build();
    let missing_style = KtfmtStep::builder()
        .version("0.21")
        .provisioner(Arc::clone(&provisioner) as Arc<dyn Provisioner>)
        .build();

    assert!(matches!(missing_version, Err(StepError::MissingArgument("version"))));
    assert!(matches!(empty_version, Err(StepError::MissingArgument("version"))));
    assert!(matches!(
        missing_provisioner,
        Err(StepError::MissingArgument("provisioner"))
    ));
    assert!(matches!(missing_style, Err(StepError::MissingArgument("style"))));
    assert_eq!(provisioner.calls.load(Ordering::SeqCst), 0);
}

#[test_log::test]
fn step_identity_is_version_and_style() {
    let provisioner = Arc::new(CountingProvisioner::default());
    let loader = Arc::new(StubLoader::new(Generation::Fields));

    let a = step("0.21", Style::Google, &provisioner, &loader);
    let b = step("0.21", Style::Google, &provisioner, &loader);
    let c = step("0.21", Style::Dropbox, &provisioner, &loader);

    assert_eq!(a.name(), "ktfmt");
    assert_eq!(
        a.key(),
        r#"{"coordinate":{"group":"com.facebook","artifact":"ktfmt","version":"0.21","classifier":"jar-with-dependencies"},"style":"GOOGLE"}"#
    );
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test_log::test]
fn create_uses_default_version_and_style() {
    let provisioner = Arc::new(CountingProvisioner::default());

    let step = KtfmtStep::create(Arc::clone(&provisioner) as Arc<dyn Provisioner>).unwrap();

    assert!(step.key().contains(r#""version":"0.21""#));
    assert!(step.key().contains(r#""style":"DEFAULT""#));
    assert!(!step.is_initialized());
}

/// Loader that remembers the classpath it was handed.
#[derive(Default)]
struct RecordingLoader {
    files: Mutex<Vec<std::path::PathBuf>>,
}

impl KtfmtLoader for RecordingLoader {
    fn load(&self, bundle: &ArtifactBundle) -> Result<Arc<dyn KtfmtApi>, DelegateError> {
        self.files.lock().unwrap().extend_from_slice(bundle.files());
        Ok(Arc::new(StubKtfmt {
            generation: Generation::Fields,
            calls: Arc::default(),
        }))
    }
}

fn install(repo: &std::path::Path, coordinate: &ArtifactCoordinate) -> std::path::PathBuf {
    let jar = repo.join(coordinate.repository_path());
    std::fs::create_dir_all(jar.parent().unwrap()).unwrap();
    std::fs::write(&jar, b"PK").unwrap();
    jar
}

#[test_log::test]
fn default_step_runs_from_the_self_contained_jar() {
    let repo = tempfile::tempdir().unwrap();
    let thin = ArtifactCoordinate::new("com.facebook", "ktfmt", "0.21");
    install(repo.path(), &thin);
    let fat = install(
        repo.path(),
        &thin.clone().with_classifier("jar-with-dependencies"),
    );

    let loader = Arc::new(RecordingLoader::default());
    let step = KtfmtStep::builder()
        .version("0.21")
        .style(Style::Default)
        .provisioner(Arc::new(LocalRepositoryProvisioner::new(repo.path())))
        .loader(Arc::clone(&loader) as Arc<dyn KtfmtLoader>)
        .build()
        .unwrap();

    step.initialize().unwrap();

    assert_eq!(*loader.files.lock().unwrap(), vec![fat]);
    assert!(
        loader.files.lock().unwrap()[0]
            .ends_with("com/facebook/ktfmt/0.21/ktfmt-0.21-jar-with-dependencies.jar")
    );
}

#[test_log::test]
fn classifier_can_be_cleared_for_a_plain_jar() {
    let provisioner = Arc::new(CountingProvisioner::default());

    let step = KtfmtStep::builder()
        .version("0.21")
        .style(Style::Default)
        .classifier(None)
        .provisioner(Arc::clone(&provisioner) as Arc<dyn Provisioner>)
        .loader(Arc::new(StubLoader::new(Generation::Fields)))
        .build()
        .unwrap();

    step.initialize().unwrap();

    assert_eq!(
        *provisioner.requested.lock().unwrap(),
        vec!["com.facebook:ktfmt:0.21".to_string()]
    );
    assert!(!step.key().contains("classifier"));
}
