//! The render session controller.
//!
//! A [`RenderSession`] owns the description buffer and the current
//! [`Snapshot`]. Every edit or replacement takes the next [`Version`] and
//! starts a fresh pipeline run:
//!
//! 1. empty text publishes an idle snapshot with no outcome;
//! 2. a document is published as [`RenderOutcome::DocumentPreview`] at once;
//! 3. a DSL description is validated, then rendered, with the outcome
//!    published after each step.
//!
//! Runs are never aborted. A run whose version is no longer the buffer's
//! version when one of its calls returns is stale: its result is dropped
//! and it makes no further engine calls. The staleness check and the
//! publication happen while the buffer is read-locked, so an edit can never
//! slip in between them and the published version only moves forward.

use std::{future::Future, sync::Arc, time::Duration};

use log::{debug, info, warn};
use tokio::{runtime::Handle, sync::watch, time};

use diagramcraft_parser::DescriptionKind;

use crate::{
    catalog::DiagramKind,
    config::AppConfig,
    description::{DiagramDescription, Version},
    engine::{RenderHandle, Renderer, Validator},
    error::DiagramcraftError,
    export::{Artifact, ExportError, ExportRequest, Exporter},
    generation::{GeneratedDiagram, GenerationError},
    outcome::{RenderError, RenderOutcome, Snapshot, Stage, SyntaxError},
};

/// Live-edit controller for one diagram.
///
/// Cloning is cheap; clones share the same buffer and outcome.
pub struct RenderSession<E> {
    inner: Arc<Inner<E>>,
}

impl<E> Clone for RenderSession<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<E> {
    engine: E,
    timeout: Option<Duration>,
    exporter: Exporter,
    runtime: Handle,
    buffer: watch::Sender<DiagramDescription>,
    snapshot: watch::Sender<Snapshot>,
}

impl<E: Validator + Renderer> RenderSession<E> {
    /// Create a session with an empty buffer.
    ///
    /// Runs are spawned on the Tokio runtime this is called from.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramcraftError::Config`] if the export configuration is
    /// invalid or no Tokio runtime is running.
    pub fn new(engine: E, config: &AppConfig) -> Result<Self, DiagramcraftError> {
        let exporter = Exporter::new(config.export()).map_err(DiagramcraftError::Config)?;
        let runtime = Handle::try_current().map_err(|err| {
            DiagramcraftError::Config(format!("render session needs a Tokio runtime: {err}"))
        })?;
        let (buffer, _) = watch::channel(DiagramDescription::empty());
        let (snapshot, _) = watch::channel(Snapshot::idle());

        Ok(Self {
            inner: Arc::new(Inner {
                engine,
                timeout: config.render().timeout(),
                exporter,
                runtime,
                buffer,
                snapshot,
            }),
        })
    }

    /// Apply a user edit of the live buffer.
    pub fn edit(&self, text: impl Into<Arc<str>>) -> Version {
        self.submit(text.into(), None, "edit")
    }

    /// Replace the buffer with an externally produced description.
    ///
    /// A `hint` naming the kind the description was requested as is kept on
    /// the description; a mismatch with the detected dialect is logged.
    pub fn replace(&self, text: impl Into<Arc<str>>, hint: Option<DiagramKind>) -> Version {
        self.submit(text.into(), hint, "replace")
    }

    /// Apply the result of a generation call.
    ///
    /// A generated description replaces the buffer. A failure is returned
    /// unchanged and leaves buffer and outcome untouched.
    pub fn apply_generation(
        &self,
        result: Result<GeneratedDiagram, GenerationError>,
    ) -> Result<Version, GenerationError> {
        match result {
            Ok(diagram) => {
                let hint = diagram.kind();
                Ok(self.replace(diagram.mermaid_code, hint))
            }
            Err(err) => {
                warn!(err:% = err; "Generation failed");
                Err(err)
            }
        }
    }

    fn submit(&self, text: Arc<str>, hint: Option<DiagramKind>, origin: &'static str) -> Version {
        let mut description = DiagramDescription::empty();
        self.inner.buffer.send_modify(|current| {
            let next = DiagramDescription::new(text, current.version().next(), hint);
            description = next.clone();
            *current = next;
        });

        let version = description.version();
        info!(
            version:% = version,
            origin = origin,
            kind:% = description.kind(),
            bytes = description.text().len();
            "Description accepted"
        );
        if let Some(kind) = hint.filter(|kind| !kind.accepts(&description)) {
            warn!(version:% = version, hint:% = kind; "Description does not match the requested diagram kind");
        }

        if description.is_empty() {
            self.inner.commit(version, Stage::Idle, None);
        } else if description.kind() == DescriptionKind::Document {
            let text = description.shared_text();
            self.inner.commit(
                version,
                Stage::DocumentPreview,
                Some(RenderOutcome::DocumentPreview { text }),
            );
        } else if self
            .inner
            .commit(version, Stage::Validating, Some(RenderOutcome::Pending))
        {
            let inner = Arc::clone(&self.inner);
            self.inner.runtime.spawn(inner.run(description));
        }
        version
    }
}

impl<E> RenderSession<E> {
    /// The current description.
    pub fn description(&self) -> DiagramDescription {
        self.inner.buffer.borrow().clone()
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Watch snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.inner.snapshot.subscribe()
    }

    /// Wait until the run for `version` has finished or a newer version is published.
    pub async fn settled(&self, version: Version) -> Snapshot {
        let mut snapshots = self.inner.snapshot.subscribe();
        let settled = snapshots
            .wait_for(|snapshot| {
                snapshot.version() > version
                    || (snapshot.version() == version && snapshot.is_settled())
            })
            .await
            .map(|snapshot| (*snapshot).clone());
        // The sender lives as long as `self`, so the channel cannot close here.
        settled.unwrap_or_else(|_| self.snapshot())
    }

    /// The buffer text as a source artifact. Never fails, even when empty.
    pub fn export_source(&self) -> Artifact {
        let artifact = self.inner.exporter.source(self.inner.buffer.borrow().text());
        info!(file = artifact.file_name(), bytes = artifact.bytes().len(); "Source exported");
        artifact
    }

    /// Rasterize the current rendering, at the configured scale by default.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NotRendered`] unless the current snapshot holds
    /// a rendered SVG, or the conversion error.
    pub async fn export_raster(&self, scale: Option<f32>) -> Result<Artifact, ExportError> {
        let svg = {
            let snapshot = self.inner.snapshot.borrow();
            match snapshot.outcome() {
                Some(RenderOutcome::Rendered { svg }) => Arc::clone(svg),
                _ => {
                    return Err(ExportError::NotRendered {
                        state: snapshot.stage(),
                    });
                }
            }
        };
        let scale = scale.unwrap_or_else(|| self.inner.exporter.default_scale());
        self.inner.exporter.raster(svg, scale).await
    }

    /// Export the artifact named by `request`.
    ///
    /// # Errors
    ///
    /// Raster requests fail as [`RenderSession::export_raster`] does; source
    /// requests never fail.
    pub async fn export(&self, request: ExportRequest) -> Result<Artifact, ExportError> {
        match request {
            ExportRequest::Source => Ok(self.export_source()),
            ExportRequest::Raster { scale } => self.export_raster(Some(scale)).await,
        }
    }
}

impl<E> Inner<E> {
    /// Publish `outcome` for `version` unless the buffer has moved past it.
    ///
    /// Returns `false` for a stale version.
    fn commit(&self, version: Version, stage: Stage, outcome: Option<RenderOutcome>) -> bool {
        let buffer = self.buffer.borrow();
        if buffer.version() != version {
            debug!(version:% = version, current:% = buffer.version(), stage:% = stage; "Discarding stale result");
            return false;
        }

        let published = self.snapshot.send_if_modified(|snapshot| {
            if snapshot.version() > version {
                return false;
            }
            *snapshot = Snapshot::new(version, stage, outcome);
            true
        });
        drop(buffer);

        if published {
            if stage.is_settled() {
                info!(version:% = version, stage:% = stage; "Outcome committed");
            } else {
                debug!(version:% = version, stage:% = stage; "Stage entered");
            }
        }
        published
    }
}

impl<E: Validator + Renderer> Inner<E> {
    async fn run(self: Arc<Self>, description: DiagramDescription) {
        let version = description.version();
        let source = description.shared_text();

        let validated = Self::validate_isolated(&self, Arc::clone(&source), version).await;
        if let Err(err) = validated {
            self.commit(
                version,
                Stage::SyntaxError,
                Some(RenderOutcome::SyntaxError(err)),
            );
            return;
        }
        if !self.commit(version, Stage::Rendering, Some(RenderOutcome::Pending)) {
            return;
        }

        match Self::render_isolated(&self, source, version).await {
            Ok(svg) => self.commit(
                version,
                Stage::Rendered,
                Some(RenderOutcome::Rendered { svg: svg.into() }),
            ),
            Err(err) => self.commit(
                version,
                Stage::RenderError,
                Some(RenderOutcome::RenderError(err)),
            ),
        };
    }

    /// Validate on a task of its own; a panic becomes the syntax error.
    async fn validate_isolated(
        this: &Arc<Self>,
        source: Arc<str>,
        version: Version,
    ) -> Result<(), SyntaxError> {
        let inner = Arc::clone(this);
        let call = async move {
            bounded(inner.timeout, inner.engine.validate(source, version), |limit| {
                SyntaxError::new(format!("validation timed out after {} ms", limit.as_millis()))
            })
            .await
        };
        this.runtime.spawn(call).await.unwrap_or_else(|err| {
            warn!(version:% = version, err:% = err; "Validator failed");
            Err(SyntaxError::new(format!("validator stopped unexpectedly: {err}")))
        })
    }

    /// Render on a task of its own; a panic becomes the render error.
    async fn render_isolated(
        this: &Arc<Self>,
        source: Arc<str>,
        version: Version,
    ) -> Result<String, RenderError> {
        let inner = Arc::clone(this);
        let call = async move {
            let handle = RenderHandle::generate();
            bounded(inner.timeout, inner.engine.render(source, handle, version), |limit| {
                RenderError::new(format!("rendering timed out after {} ms", limit.as_millis()))
            })
            .await
        };
        this.runtime.spawn(call).await.unwrap_or_else(|err| {
            warn!(version:% = version, err:% = err; "Renderer failed");
            Err(RenderError::new(format!("renderer stopped unexpectedly: {err}")))
        })
    }
}

/// Await `call`, giving up after `limit` if one is set.
async fn bounded<T, E>(
    limit: Option<Duration>,
    call: impl Future<Output = Result<T, E>>,
    on_timeout: impl FnOnce(Duration) -> E,
) -> Result<T, E> {
    let Some(limit) = limit else {
        return call.await;
    };
    match time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(on_timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Mutex};

    use tokio::sync::oneshot;

    use super::*;
    use crate::config::{ExportConfig, GeneratorConfig, RenderConfig};

    /// Engine whose calls can be held open until a test releases them.
    ///
    /// Text containing `BAD` fails validation, text containing `BROKEN`
    /// fails rendering. `PANIC` and `CRASH` make the respective call panic. Renders produce a small SVG naming the source.
    #[derive(Default)]
    struct ScriptedEngine {
        validate_gates: Mutex<HashMap<Version, oneshot::Receiver<()>>>,
        render_gates: Mutex<HashMap<Version, oneshot::Receiver<()>>>,
        validated: Mutex<Vec<Version>>,
        rendered: Mutex<Vec<Version>>,
        finished: Mutex<Vec<(&'static str, Version)>>,
    }

    impl ScriptedEngine {
        fn hold_validation(&self, version: u64) -> oneshot::Sender<()> {
            let (release, gate) = oneshot::channel();
            self.validate_gates
                .lock()
                .unwrap()
                .insert(Version::from(version), gate);
            release
        }

        fn hold_render(&self, version: u64) -> oneshot::Sender<()> {
            let (release, gate) = oneshot::channel();
            self.render_gates
                .lock()
                .unwrap()
                .insert(Version::from(version), gate);
            release
        }

        fn validated(&self) -> Vec<Version> {
            self.validated.lock().unwrap().clone()
        }

        fn rendered(&self) -> Vec<Version> {
            self.rendered.lock().unwrap().clone()
        }

        fn has_finished(&self, call: &'static str, version: Version) -> bool {
            self.finished.lock().unwrap().contains(&(call, version))
        }
    }

    impl Validator for Arc<ScriptedEngine> {
        fn validate(
            &self,
            source: Arc<str>,
            version: Version,
        ) -> impl Future<Output = Result<(), SyntaxError>> + Send {
            let engine = Arc::clone(self);
            async move {
                engine.validated.lock().unwrap().push(version);
                let gate = engine.validate_gates.lock().unwrap().remove(&version);
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                assert!(!source.contains("PANIC"), "validator crashed at {version}");
                let result = if source.contains("BAD") {
                    Err(SyntaxError::new(format!("bad description at {version}")))
                } else {
                    Ok(())
                };
                engine.finished.lock().unwrap().push(("validate", version));
                result
            }
        }
    }

    impl Renderer for Arc<ScriptedEngine> {
        fn render(
            &self,
            source: Arc<str>,
            handle: RenderHandle,
            version: Version,
        ) -> impl Future<Output = Result<String, RenderError>> + Send {
            let engine = Arc::clone(self);
            async move {
                engine.rendered.lock().unwrap().push(version);
                let gate = engine.render_gates.lock().unwrap().remove(&version);
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                assert!(!source.contains("CRASH"), "renderer crashed at {version}");
                let result = if source.contains("BROKEN") {
                    Err(RenderError::new("layout failed"))
                } else {
                    Ok(format!(
                        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{handle}" width="8" height="8"><desc>{source}</desc></svg>"#
                    ))
                };
                engine.finished.lock().unwrap().push(("render", version));
                result
            }
        }
    }

    fn session() -> (RenderSession<Arc<ScriptedEngine>>, Arc<ScriptedEngine>) {
        session_with(AppConfig::default())
    }

    fn session_with(
        config: AppConfig,
    ) -> (RenderSession<Arc<ScriptedEngine>>, Arc<ScriptedEngine>) {
        let engine = Arc::new(ScriptedEngine::default());
        let session = RenderSession::new(Arc::clone(&engine), &config).unwrap();
        (session, engine)
    }

    /// Yield to the spawned runs until `condition` holds.
    async fn until(condition: impl Fn() -> bool) {
        time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }

    fn rendered_svg(snapshot: &Snapshot) -> &str {
        snapshot
            .outcome()
            .and_then(RenderOutcome::svg)
            .unwrap_or_else(|| panic!("expected a rendering, got {snapshot:?}"))
    }

    #[tokio::test]
    async fn test_dsl_is_validated_then_rendered() {
        let (session, engine) = session();

        let version = session.edit("graph TD\nA-->B");
        let snapshot = session.settled(version).await;

        assert_eq!(snapshot.version(), version);
        assert_eq!(snapshot.stage(), Stage::Rendered);
        assert!(rendered_svg(&snapshot).contains("A-->B"));
        assert_eq!(engine.validated(), vec![version]);
        assert_eq!(engine.rendered(), vec![version]);
    }

    #[tokio::test]
    async fn test_pending_until_validation_returns() {
        let (session, engine) = session();
        let release = engine.hold_validation(1);

        let version = session.edit("graph TD\nA-->B");
        let snapshot = session.snapshot();
        assert_eq!(snapshot.stage(), Stage::Validating);
        assert_eq!(snapshot.outcome(), Some(&RenderOutcome::Pending));

        release.send(()).unwrap();
        assert_eq!(session.settled(version).await.stage(), Stage::Rendered);
    }

    #[tokio::test]
    async fn test_document_is_never_validated() {
        let (session, engine) = session();

        let version = session.edit("\\documentclass{standalone}\n\\begin{document}x\\end{document}");
        let snapshot = session.snapshot();

        assert_eq!(snapshot.version(), version);
        assert_eq!(snapshot.stage(), Stage::DocumentPreview);
        assert!(matches!(
            snapshot.outcome(),
            Some(RenderOutcome::DocumentPreview { text }) if text.starts_with("\\documentclass")
        ));
        tokio::task::yield_now().await;
        assert!(engine.validated().is_empty());
        assert!(engine.rendered().is_empty());
    }

    #[tokio::test]
    async fn test_empty_buffer_has_no_outcome() {
        let (session, engine) = session();

        let version = session.edit("  \n ");
        let snapshot = session.snapshot();

        assert_eq!(snapshot.version(), version);
        assert_eq!(snapshot.stage(), Stage::Idle);
        assert_eq!(snapshot.outcome(), None);
        assert!(engine.validated().is_empty());
    }

    #[tokio::test]
    async fn test_syntax_error_skips_renderer() {
        let (session, engine) = session();

        let version = session.edit("graph TD\nBAD-->");
        let snapshot = session.settled(version).await;

        assert_eq!(snapshot.stage(), Stage::SyntaxError);
        assert_eq!(
            snapshot.outcome().and_then(RenderOutcome::error_message),
            Some("bad description at v1")
        );
        assert!(engine.rendered().is_empty());
    }

    #[tokio::test]
    async fn test_render_error_is_published() {
        let (session, _engine) = session();

        let version = session.edit("graph TD\nBROKEN-->B");
        let snapshot = session.settled(version).await;

        assert_eq!(snapshot.stage(), Stage::RenderError);
        assert_eq!(
            snapshot.outcome().and_then(RenderOutcome::error_message),
            Some("layout failed")
        );
    }

    #[tokio::test]
    async fn test_late_render_never_overwrites_newer_outcome() {
        let (session, engine) = session();
        let release_first = engine.hold_render(1);

        let first = session.edit("graph TD\nA-->B");
        until(|| engine.rendered().contains(&first)).await;
        assert_eq!(session.snapshot().stage(), Stage::Rendering);

        let second = session.edit("graph TD\nX-->Y");
        let snapshot = session.settled(second).await;
        assert_eq!(snapshot.version(), second);
        assert!(rendered_svg(&snapshot).contains("X-->Y"));

        let updates = session.subscribe();
        release_first.send(()).unwrap();
        until(|| engine.has_finished("render", first)).await;

        assert!(!updates.has_changed().unwrap());
        assert!(rendered_svg(&session.snapshot()).contains("X-->Y"));
    }

    #[tokio::test]
    async fn test_stale_validation_never_reaches_renderer() {
        let (session, engine) = session();
        let release_first = engine.hold_validation(1);

        let first = session.edit("graph TD\nA-->B");
        until(|| engine.validated().contains(&first)).await;
        let second = session.edit("graph TD\nX-->Y");
        session.settled(second).await;

        release_first.send(()).unwrap();
        until(|| engine.has_finished("validate", first)).await;
        tokio::task::yield_now().await;

        assert_eq!(engine.validated(), vec![first, second]);
        assert_eq!(engine.rendered(), vec![second]);
        assert_eq!(session.snapshot().version(), second);
    }

    #[tokio::test]
    async fn test_out_of_order_completion_settles_on_last_edit() {
        let (session, engine) = session();
        let mut releases = Vec::new();
        let mut versions = Vec::new();

        for index in 1..=5u64 {
            releases.push(engine.hold_render(index));
            let version = session.edit(format!("graph TD\nN{index}-->M{index}"));
            until(|| engine.rendered().contains(&version)).await;
            versions.push(version);
        }
        let last = versions[4];

        // Newest first, so every older render returns after a newer one.
        releases.pop().unwrap().send(()).unwrap();
        let snapshot = session.settled(last).await;
        assert!(rendered_svg(&snapshot).contains("N5-->M5"));

        let updates = session.subscribe();
        while let Some(release) = releases.pop() {
            release.send(()).unwrap();
        }
        for version in &versions {
            until(|| engine.has_finished("render", *version)).await;
        }

        assert!(!updates.has_changed().unwrap());
        assert_eq!(session.snapshot().version(), last);
        assert!(rendered_svg(&session.snapshot()).contains("N5-->M5"));
    }

    #[tokio::test]
    async fn test_raster_export_requires_rendering() {
        let (session, engine) = session();
        let release = engine.hold_validation(1);

        let version = session.edit("graph TD\nA-->B");
        let err = session.export_raster(None).await.unwrap_err();
        assert_eq!(
            err,
            ExportError::NotRendered {
                state: Stage::Validating
            }
        );

        release.send(()).unwrap();
        session.settled(version).await;
        let artifact = session.export_raster(None).await.unwrap();
        assert_eq!(artifact.file_name(), "diagram.png");
        assert!(artifact.bytes().starts_with(b"\x89PNG"));
    }

    #[tokio::test]
    async fn test_raster_export_rejected_after_syntax_error() {
        let (session, _engine) = session();

        let version = session.edit("BAD");
        session.settled(version).await;

        let err = session.export(ExportRequest::Raster { scale: 2.0 }).await;
        assert_eq!(
            err.unwrap_err(),
            ExportError::NotRendered {
                state: Stage::SyntaxError
            }
        );
    }

    #[tokio::test]
    async fn test_source_export() {
        let (session, _engine) = session();
        assert!(session.export_source().bytes().is_empty());

        session.edit("pie\n\"a\" : 1");
        let artifact = session.export(ExportRequest::Source).await.unwrap();
        assert_eq!(artifact.file_name(), "diagram.mmd");
        assert_eq!(artifact.bytes(), b"pie\n\"a\" : 1");
    }

    #[tokio::test]
    async fn test_generation_result_replaces_buffer() {
        let (session, _engine) = session();
        let diagram = GeneratedDiagram {
            id: "1".to_string(),
            mermaid_code: "sequenceDiagram\nA->>B: hi".to_string(),
            diagram_type: "sequence".to_string(),
            prompt: "hello".to_string(),
            created_at: "2024-01-01T12:00:00Z".to_string(),
        };

        let version = session.apply_generation(Ok(diagram)).unwrap();
        let description = session.description();

        assert_eq!(description.version(), version);
        assert_eq!(description.hint(), Some(DiagramKind::Sequence));
        assert_eq!(session.settled(version).await.stage(), Stage::Rendered);
    }

    #[tokio::test]
    async fn test_generation_failure_leaves_state_untouched() {
        let (session, _engine) = session();
        let version = session.edit("graph TD\nA-->B");
        let before = session.settled(version).await;

        let err = GenerationError::Rejected {
            status: 500,
            detail: "model unavailable".to_string(),
        };
        assert_eq!(session.apply_generation(Err(err.clone())), Err(err));
        assert_eq!(session.description().version(), version);
        assert_eq!(session.snapshot(), before);
    }

    #[tokio::test]
    async fn test_validator_panic_becomes_syntax_error() {
        let (session, engine) = session();

        let version = session.edit("graph TD\nPANIC-->B");
        let snapshot = session.settled(version).await;

        assert_eq!(snapshot.stage(), Stage::SyntaxError);
        let message = snapshot.outcome().and_then(RenderOutcome::error_message).unwrap();
        assert!(message.starts_with("validator stopped unexpectedly"), "{message}");
        assert!(engine.rendered().is_empty());
    }

    #[tokio::test]
    async fn test_renderer_panic_becomes_render_error() {
        let (session, _engine) = session();

        let version = session.edit("graph TD\nCRASH-->B");
        let snapshot = session.settled(version).await;

        assert_eq!(snapshot.stage(), Stage::RenderError);
        let message = snapshot.outcome().and_then(RenderOutcome::error_message).unwrap();
        assert!(message.starts_with("renderer stopped unexpectedly"), "{message}");

        let next = session.edit("graph TD\nA-->B");
        assert_eq!(session.settled(next).await.stage(), Stage::Rendered);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_stage_error() {
        let config = AppConfig::new(
            RenderConfig::default().with_timeout(Some(Duration::from_millis(50))),
            ExportConfig::default(),
            GeneratorConfig::default(),
        );
        let (session, engine) = session_with(config);
        let _held = engine.hold_validation(1);

        let version = session.edit("graph TD\nA-->B");
        let snapshot = session.settled(version).await;

        assert_eq!(snapshot.stage(), Stage::SyntaxError);
        assert_eq!(
            snapshot.outcome().and_then(RenderOutcome::error_message),
            Some("validation timed out after 50 ms")
        );
    }

    #[test]
    fn test_new_requires_runtime() {
        let engine = Arc::new(ScriptedEngine::default());
        assert!(matches!(
            RenderSession::new(engine, &AppConfig::default()),
            Err(DiagramcraftError::Config(_))
        ));
    }
}
