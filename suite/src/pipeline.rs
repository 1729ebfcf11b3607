//! Ordered execution of checkers over one artefact.
//!
//! The pipeline runs every enabled checker in configuration order and folds
//! the results: `passed` is the AND of every checker that ran, and
//! diagnostics keep checker order. Fail-fast mode stops after the first
//! failing checker. A [`Deadline`] is consulted only between checkers, so a
//! checker that has started always finishes.

use log::{debug, trace, warn};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use vetting_common::{CheckContext, CheckResult, Checker, DiagnosticKind, SourceArtifact, report};

/// Checker name recorded on diagnostics the pipeline itself emits.
pub const PIPELINE_NAME: &str = "pipeline";

/// A cloneable cancellation token checked at checker boundaries.
///
/// A deadline expires when its instant passes or when any clone calls
/// [`Deadline::cancel`].
#[derive(Clone, Debug, Default)]
pub struct Deadline {
    at: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl Deadline {
    /// A deadline that only expires when cancelled.
    #[must_use]
    pub fn never() -> Self {
        Self::default()
    }

    /// A deadline that expires at `instant`.
    #[must_use]
    pub fn at(instant: Instant) -> Self {
        Self {
            at: Some(instant),
            ..Self::default()
        }
    }

    /// A deadline that expires `budget` from now.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Instant::now()
            .checked_add(budget)
            .map_or_else(Self::never, Self::at)
    }

    /// Expires the deadline for every clone.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once the deadline has passed or been cancelled.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst) || self.at.is_some_and(|at| Instant::now() >= at)
    }
}

/// An ordered list of checkers run as one unit.
///
/// A pipeline holds no per-run state, so one instance may serve many
/// threads at once.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use syntax_checker::SyntaxChecker;
/// use vetting_common::{CheckContext, SourceArtifact};
/// use vetting_suite::CheckerPipeline;
///
/// let mut pipeline = CheckerPipeline::new();
/// pipeline.push(SyntaxChecker::default());
///
/// let result = pipeline.run(&SourceArtifact::python("def f(:\n"), &CheckContext::new());
/// assert!(!result.passed());
/// ```
#[derive(Clone, Default)]
pub struct CheckerPipeline {
    checkers: Vec<Arc<dyn Checker>>,
    fail_fast: bool,
}

impl CheckerPipeline {
    /// Creates an empty, run-all pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the run stops at the first failing checker.
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Returns `true` in fail-fast mode.
    #[must_use]
    pub const fn fail_fast(&self) -> bool {
        self.fail_fast
    }

    /// Appends checkers in order. The same checker may appear more than
    /// once and then runs once per appearance.
    pub fn add<I>(&mut self, checkers: I) -> &mut Self
    where
        I: IntoIterator<Item = Arc<dyn Checker>>,
    {
        self.checkers.extend(checkers);
        self
    }

    /// Appends one checker.
    pub fn push(&mut self, checker: impl Checker + 'static) -> &mut Self {
        self.checkers.push(Arc::new(checker));
        self
    }

    /// Returns the configured checker names in run order.
    #[must_use]
    pub fn checker_names(&self) -> Vec<&'static str> {
        self.checkers.iter().map(|checker| checker.name()).collect()
    }

    /// Returns the number of configured checkers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    /// Returns `true` when no checker is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    /// Runs every configured checker over `artifact`.
    #[must_use]
    pub fn run(&self, artifact: &SourceArtifact, context: &CheckContext) -> CheckResult {
        self.run_with_deadline(artifact, context, &Deadline::never())
    }

    /// Runs the pipeline, skipping the remaining checkers once `deadline`
    /// has expired.
    ///
    /// Skipped checkers are named in one blocking
    /// [`DiagnosticKind::Cancelled`] diagnostic, so a truncated run never
    /// passes by omission.
    #[must_use]
    pub fn run_with_deadline(
        &self,
        artifact: &SourceArtifact,
        context: &CheckContext,
        deadline: &Deadline,
    ) -> CheckResult {
        let mut result = CheckResult::pass();

        for (index, checker) in self.checkers.iter().enumerate() {
            if deadline.is_expired() {
                let skipped: Vec<_> = self.checkers[index..]
                    .iter()
                    .filter(|pending| pending.is_enabled())
                    .map(|pending| pending.name())
                    .collect();
                if !skipped.is_empty() {
                    debug!(target: PIPELINE_NAME, "deadline expired; skipping {skipped:?}");
                    result.push(
                        report(
                            PIPELINE_NAME,
                            DiagnosticKind::Cancelled,
                            format!("deadline expired before {} ran", skipped.join(", ")),
                        )
                        .build(),
                    );
                }
                break;
            }
            if !checker.is_enabled() {
                trace!(target: PIPELINE_NAME, "`{}` is disabled", checker.name());
                continue;
            }

            let started = Instant::now();
            let outcome = run_contained(checker.as_ref(), artifact, context);
            let failed = !outcome.passed();
            debug!(
                target: PIPELINE_NAME,
                "`{}` finished in {:?} with {} diagnostic(s)",
                checker.name(),
                started.elapsed(),
                outcome.diagnostics().len()
            );
            result.absorb(outcome);

            if failed && self.fail_fast {
                debug!(target: PIPELINE_NAME, "`{}` failed; stopping early", checker.name());
                break;
            }
        }

        result
    }
}

impl fmt::Debug for CheckerPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckerPipeline")
            .field("checkers", &self.checker_names())
            .field("fail_fast", &self.fail_fast)
            .finish()
    }
}

/// Runs one checker, turning a panic into a blocking internal error.
fn run_contained(
    checker: &dyn Checker,
    artifact: &SourceArtifact,
    context: &CheckContext,
) -> CheckResult {
    panic::catch_unwind(AssertUnwindSafe(|| checker.check(artifact, context))).unwrap_or_else(
        |payload| {
            let message = panic_message(payload.as_ref());
            warn!(target: PIPELINE_NAME, "`{}` panicked: {message}", checker.name());
            CheckResult::from_diagnostics(vec![
                report(
                    checker.name(),
                    DiagnosticKind::InternalError,
                    format!("checker panicked: {message}"),
                )
                .build(),
            ])
        },
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic with a non-string payload".to_owned()
    }
}
