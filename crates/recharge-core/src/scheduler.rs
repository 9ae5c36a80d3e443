//! Per-drone behavior scheduler.
//!
//! Behaviors are held in priority order (first added = highest priority).
//! Each poll:
//!
//! 1. Every active behavior is ticked; those returning `false` are stopped.
//! 2. Every idle behavior is offered selection in priority order, unless it
//!    would conflict with what is already running. An exclusive behavior
//!    never starts next to any other, and nothing starts next to an
//!    exclusive one.
//!
//! Running behaviors are never preempted.

use recharge_agents::{AgentError, Behavior, BehaviorContext};
use tracing::debug;

#[derive(Debug)]
struct Slot {
    behavior: Box<dyn Behavior>,
    active: bool,
}

/// Priority-ordered set of behaviors for one drone.
#[derive(Debug, Default)]
pub struct BehaviorScheduler {
    slots: Vec<Slot>,
}

impl BehaviorScheduler {
    /// Create an empty scheduler.
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Append a behavior below every behavior already added.
    #[must_use]
    pub fn with(mut self, behavior: impl Behavior + 'static) -> Self {
        self.push(Box::new(behavior));
        self
    }

    /// Append a boxed behavior at the lowest priority.
    pub fn push(&mut self, behavior: Box<dyn Behavior>) {
        self.slots.push(Slot {
            behavior,
            active: false,
        });
    }

    /// Number of registered behaviors.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no behaviors are registered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Names of the active behaviors, in priority order.
    pub fn active(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots
            .iter()
            .filter(|s| s.active)
            .map(|s| s.behavior.name())
    }

    /// Whether the named behavior is active.
    pub fn is_active(&self, name: &str) -> bool {
        self.active().any(|n| n == name)
    }

    /// Highest-priority active behavior.
    pub fn current(&self) -> Option<&'static str> {
        self.active().next()
    }

    /// Run one scheduling round. Returns the highest-priority active
    /// behavior afterwards.
    ///
    /// # Errors
    ///
    /// Propagates the first [`AgentError`] a behavior returns.
    pub fn poll(
        &mut self,
        ctx: &mut BehaviorContext<'_>,
    ) -> Result<Option<&'static str>, AgentError> {
        for slot in self.slots.iter_mut().filter(|s| s.active) {
            if !slot.behavior.tick(ctx)? {
                slot.behavior.stop();
                slot.active = false;
                debug!(
                    agent = %ctx.drone.id(),
                    behavior = slot.behavior.name(),
                    tick = ctx.tick,
                    "Behavior finished"
                );
            }
        }

        let mut any_active = self.slots.iter().any(|s| s.active);
        let mut exclusive_active = self
            .slots
            .iter()
            .any(|s| s.active && s.behavior.is_exclusive());

        for slot in self.slots.iter_mut().filter(|s| !s.active) {
            let exclusive = slot.behavior.is_exclusive();
            if exclusive_active || (exclusive && any_active) {
                continue;
            }
            if slot.behavior.try_select(ctx)? {
                slot.active = true;
                any_active = true;
                exclusive_active |= exclusive;
                debug!(
                    agent = %ctx.drone.id(),
                    behavior = slot.behavior.name(),
                    tick = ctx.tick,
                    "Behavior started"
                );
            }
        }

        Ok(self.current())
    }
}
