//! Weighted encounter selection and the cycling "spin" that reveals it.
//!
//! Selection is a pure weighted draw. The spin is a separate, finite frame
//! sequence a host plays on a timer: it cycles the highlight through the
//! pool with an ease-out delay and lands on the already-drawn result.
use crate::constants::{LOG_TARGET_SELECTOR, SPIN_BASE_DELAY_MS, SPIN_CYCLES, SPIN_EASE_DELAY_MS};
use crate::error::{GameError, GameResult};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// A labelled candidate with a non-negative draw weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedOption {
    pub label: String,
    pub weight: u32,
}

impl WeightedOption {
    #[must_use]
    pub fn new(label: impl Into<String>, weight: u32) -> Self {
        Self {
            label: label.into(),
            weight,
        }
    }
}

#[must_use]
pub fn total_weight(pool: &[WeightedOption]) -> u64 {
    pool.iter().map(|option| u64::from(option.weight)).sum()
}

/// Share of the pool's total weight held by `index`, in `[0, 1]`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn chance(pool: &[WeightedOption], index: usize) -> f64 {
    let total = total_weight(pool);
    match pool.get(index) {
        Some(option) if total > 0 => f64::from(option.weight) / total as f64,
        _ => 0.0,
    }
}

/// Draw one index from `pool`, proportional to weight.
///
/// Rolls `r` in `[0, W)` and returns the first entry whose cumulative weight
/// exceeds `r`. Zero-weight entries are skipped and can never win.
///
/// # Errors
///
/// Returns `InvariantViolation` when the pool is empty or every weight is 0.
pub fn select<R: Rng + ?Sized>(pool: &[WeightedOption], rng: &mut R) -> GameResult<usize> {
    if pool.is_empty() {
        return Err(GameError::invariant("encounter pool is empty"));
    }
    let total = total_weight(pool);
    if total == 0 {
        return Err(GameError::invariant(
            "every entry in the encounter pool has weight 0",
        ));
    }

    let roll = rng.gen_range(0..total);
    let mut cumulative = 0_u64;
    for (idx, option) in pool.iter().enumerate() {
        if option.weight == 0 {
            continue;
        }
        cumulative += u64::from(option.weight);
        if roll < cumulative {
            log::debug!(
                target: LOG_TARGET_SELECTOR,
                "weighted draw | roll {roll}/{total} -> {} (#{idx})",
                option.label
            );
            return Ok(idx);
        }
    }

    Err(GameError::invariant(format!(
        "weighted draw overran the pool (roll {roll}, total {total})"
    )))
}

/// One step of a spin as seen by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum SpinFrame {
    /// Highlight `index` and hold it for `delay` before asking for the next frame.
    Highlight { index: usize, delay: Duration },
    /// Terminal frame, emitted exactly once per completed spin.
    Settled { index: usize, option: WeightedOption },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpinPhase {
    Running,
    Done,
    Cancelled,
}

/// Cloneable handle that stops a spin from another task.
#[derive(Debug, Clone, Default)]
pub struct SpinCancel(Arc<AtomicBool>);

impl SpinCancel {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Default)]
struct SurfaceShared {
    busy: AtomicBool,
    highlight: AtomicUsize,
}

#[derive(Debug)]
struct SurfaceGuard(Arc<SurfaceShared>);

impl Drop for SurfaceGuard {
    fn drop(&mut self) {
        self.0.busy.store(false, Ordering::Release);
    }
}

/// A single, non-restartable spin over a drawn result.
#[derive(Debug)]
pub struct Spin {
    pool: Vec<WeightedOption>,
    result: usize,
    current: usize,
    total_steps: usize,
    steps_taken: usize,
    phase: SpinPhase,
    cancel: SpinCancel,
    guard: Option<SurfaceGuard>,
}

impl Spin {
    /// Draw a result and build the spin that reveals it, starting from
    /// highlight `start`.
    ///
    /// # Errors
    ///
    /// Propagates [`select`] failures.
    pub fn draw<R: Rng + ?Sized>(
        pool: Vec<WeightedOption>,
        start: usize,
        rng: &mut R,
    ) -> GameResult<Self> {
        let result = select(&pool, rng)?;
        Ok(Self::landing_on(pool, result, start))
    }

    /// Build a spin that lands on a known `result`.
    ///
    /// The highlight makes `SPIN_CYCLES` full passes plus however many steps
    /// it takes to get from `start` to `result`. A `result` past the end of
    /// the pool lands on the last option.
    #[must_use]
    pub fn landing_on(pool: Vec<WeightedOption>, result: usize, start: usize) -> Self {
        let len = pool.len().max(1);
        let result = result.min(len - 1);
        let start = start % len;
        let offset = (result + len - start) % len;
        Self {
            pool,
            result,
            current: start,
            total_steps: len * SPIN_CYCLES + offset,
            steps_taken: 0,
            phase: SpinPhase::Running,
            cancel: SpinCancel::default(),
            guard: None,
        }
    }

    #[must_use]
    pub const fn result_index(&self) -> usize {
        self.result
    }

    #[must_use]
    pub fn result(&self) -> Option<&WeightedOption> {
        self.pool.get(self.result)
    }

    #[must_use]
    pub fn pool(&self) -> &[WeightedOption] {
        &self.pool
    }

    /// Number of highlight frames before the settled frame.
    #[must_use]
    pub const fn total_steps(&self) -> usize {
        self.total_steps
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == SpinPhase::Running && !self.cancel.is_cancelled()
    }

    #[must_use]
    pub fn cancel_handle(&self) -> SpinCancel {
        self.cancel.clone()
    }

    /// Stop the spin; it will never emit its settled frame.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.finish(SpinPhase::Cancelled);
    }

    fn finish(&mut self, phase: SpinPhase) {
        if self.phase == SpinPhase::Running {
            self.phase = phase;
        }
        self.guard.take();
    }

    #[allow(clippy::cast_precision_loss)]
    fn ease_delay(&self) -> Duration {
        let progress = self.steps_taken as f64 / self.total_steps.max(1) as f64;
        let millis = SPIN_BASE_DELAY_MS + progress.powi(2) * SPIN_EASE_DELAY_MS;
        Duration::from_secs_f64(millis / 1_000.0)
    }

    fn publish_highlight(&self) {
        if let Some(guard) = &self.guard {
            guard.0.highlight.store(self.current, Ordering::Release);
        }
    }
}

impl Iterator for Spin {
    type Item = SpinFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cancel.is_cancelled() {
            self.finish(SpinPhase::Cancelled);
        }
        if self.phase != SpinPhase::Running {
            return None;
        }
        if self.pool.is_empty() {
            self.finish(SpinPhase::Cancelled);
            return None;
        }
        if self.steps_taken < self.total_steps {
            self.current = (self.current + 1) % self.pool.len();
            self.steps_taken += 1;
            self.publish_highlight();
            return Some(SpinFrame::Highlight {
                index: self.current,
                delay: self.ease_delay(),
            });
        }
        self.finish(SpinPhase::Done);
        let option = self.pool.get(self.result)?.clone();
        Some(SpinFrame::Settled {
            index: self.result,
            option,
        })
    }
}

impl std::iter::FusedIterator for Spin {}

/// The visible selection surface: remembers the highlighted slot between
/// spins and refuses to start a spin while another is still alive.
#[derive(Debug, Clone, Default)]
pub struct SelectorSurface {
    shared: Arc<SurfaceShared>,
}

impl SelectorSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.shared.busy.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn highlighted(&self) -> usize {
        self.shared.highlight.load(Ordering::Acquire)
    }

    /// Draw from `pool` and return the spin that reveals the result.
    ///
    /// The surface stays busy until the spin settles, is cancelled, or is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns `SelectorBusy` while a previous spin is alive, and propagates
    /// [`select`] failures.
    pub fn start<R: Rng + ?Sized>(
        &self,
        pool: Vec<WeightedOption>,
        rng: &mut R,
    ) -> GameResult<Spin> {
        if self
            .shared
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(GameError::SelectorBusy);
        }
        let guard = SurfaceGuard(Arc::clone(&self.shared));
        let mut spin = Spin::draw(pool, self.highlighted(), rng)?;
        spin.guard = Some(guard);
        Ok(spin)
    }
}

/// Play a spin in real time, sleeping for each highlight's delay.
///
/// Returns the settled option, or `None` if the spin was cancelled.
#[cfg(feature = "async")]
pub async fn play<F>(mut spin: Spin, mut on_frame: F) -> Option<WeightedOption>
where
    F: FnMut(&SpinFrame),
{
    while let Some(frame) = spin.next() {
        on_frame(&frame);
        match frame {
            SpinFrame::Highlight { delay, .. } => tokio::time::sleep(delay).await,
            SpinFrame::Settled { option, .. } => return Some(option),
        }
    }
    None
}
