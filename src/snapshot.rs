use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};

use crate::rule::{NoOpRule, Rule};
use crate::{CompileError, EvaluationError, FunctionRegistry, RuleResult, StageConfig};

/// One compiled, immutable rule set for a pipeline stage.
pub struct StageSnapshot<T, C> {
    timestamp: DateTime<Utc>,
    rule: Arc<dyn Rule<T, C>>,
}

impl<T, C> StageSnapshot<T, C> {
    pub fn new(timestamp: DateTime<Utc>, rule: Arc<dyn Rule<T, C>>) -> Self {
        Self { timestamp, rule }
    }

    /// A snapshot that lets every value through.
    #[must_use]
    pub fn passthrough(timestamp: DateTime<Utc>) -> Self
    where
        T: 'static,
        C: 'static,
    {
        Self::new(timestamp, Arc::new(NoOpRule))
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn rule(&self) -> &Arc<dyn Rule<T, C>> {
        &self.rule
    }

    /// Evaluate the stage's rule.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] if a result function fails.
    pub fn process(&self, value: T, context: &C) -> Result<RuleResult<T>, EvaluationError> {
        self.rule.process(value, context)
    }
}

impl<T, C> fmt::Debug for StageSnapshot<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageSnapshot")
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

/// The live rule set for a stage, replaceable while evaluations are running.
///
/// Readers load the current snapshot without locking; an evaluation keeps the
/// snapshot it started with even if a new one is published mid-flight.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use rulestage::{LiveStage, StageSnapshot};
///
/// let stage: LiveStage<u32, ()> = LiveStage::new(StageSnapshot::passthrough(Utc::now()));
/// let result = stage.process(7, &()).unwrap();
/// assert_eq!(result.value(), Some(&7));
/// ```
pub struct LiveStage<T, C> {
    current: ArcSwap<StageSnapshot<T, C>>,
}

impl<T, C> LiveStage<T, C> {
    pub fn new(snapshot: StageSnapshot<T, C>) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// The snapshot new evaluations will use.
    #[must_use]
    pub fn snapshot(&self) -> Arc<StageSnapshot<T, C>> {
        self.current.load_full()
    }

    /// Replace the live snapshot, returning the previous one.
    pub fn publish(&self, snapshot: StageSnapshot<T, C>) -> Arc<StageSnapshot<T, C>> {
        let current = snapshot.timestamp();
        let previous = self.current.swap(Arc::new(snapshot));
        tracing::info!(
            previous = %previous.timestamp(),
            current = %current,
            "published stage snapshot"
        );
        previous
    }

    /// Evaluate against the current snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] if a result function fails.
    pub fn process(&self, value: T, context: &C) -> Result<RuleResult<T>, EvaluationError> {
        self.current.load().process(value, context)
    }

    /// Recompile from `config` and publish if it is newer than the live
    /// snapshot. A config without a timestamp always recompiles.
    ///
    /// Returns whether a new snapshot was published. A concurrent publish
    /// that lands between the check and the swap wins; this call then
    /// returns `false`.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError`] if `config` fails to compile; the live
    /// snapshot is left untouched.
    pub fn refresh(
        &self,
        config: &StageConfig,
        registry: &FunctionRegistry<T, C>,
    ) -> Result<bool, CompileError>
    where
        T: Clone + 'static,
        C: 'static,
    {
        let current = self.current.load_full();
        if let Some(incoming) = config.timestamp {
            if incoming <= current.timestamp() {
                tracing::debug!(
                    live = %current.timestamp(),
                    %incoming,
                    "stage config is not newer than live snapshot; skipping"
                );
                return Ok(false);
            }
        }

        let snapshot = match config.compile(registry) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(error = %err, "stage config failed to compile; keeping live snapshot");
                return Err(err);
            }
        };

        let timestamp = snapshot.timestamp();
        let previous = self.current.compare_and_swap(&current, Arc::new(snapshot));
        let swapped = Arc::ptr_eq(&*previous, &current);
        if swapped {
            tracing::info!(
                previous = %current.timestamp(),
                current = %timestamp,
                "published stage snapshot"
            );
        } else {
            tracing::debug!("another snapshot was published concurrently; discarding refresh");
        }
        Ok(swapped)
    }
}

impl<T, C> fmt::Debug for LiveStage<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveStage")
            .field("current", &*self.current.load())
            .finish()
    }
}
