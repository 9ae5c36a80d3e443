//! Per-drone debug log of why stations were passed over.
//!
//! The charging goal reports every station it rejects, with a
//! [`DebugReason`], through the [`DebugSink`] trait. Nothing branches on
//! these entries; they exist so an operator can ask a drone "why didn't you
//! go to that station?".

use std::collections::VecDeque;

use recharge_types::{AgentId, BlockPos, DebugReason};
use serde::Serialize;
use tracing::debug;

/// Default number of entries a [`DroneDebugger`] retains.
pub const DEFAULT_DEBUG_CAPACITY: usize = 64;

/// Receiver of advisory debug entries.
pub trait DebugSink {
    /// Record that the station at `pos` was skipped (or lost) for `reason`.
    fn record(&mut self, reason: DebugReason, pos: BlockPos);
}

/// A single recorded entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DebugEntry {
    /// The tick the entry was recorded on.
    pub tick: u64,
    /// Why the station was skipped.
    pub reason: DebugReason,
    /// The station's position.
    pub pos: BlockPos,
}

/// Bounded ring of recent debug entries for one drone.
///
/// Every entry is also emitted as a `tracing` debug event.
#[derive(Debug, Clone)]
pub struct DroneDebugger {
    agent: AgentId,
    tick: u64,
    capacity: usize,
    entries: VecDeque<DebugEntry>,
}

impl DroneDebugger {
    /// Create a debugger retaining [`DEFAULT_DEBUG_CAPACITY`] entries.
    pub fn new(agent: AgentId) -> Self {
        Self::with_capacity(agent, DEFAULT_DEBUG_CAPACITY)
    }

    /// Create a debugger retaining at most `capacity` entries.
    pub fn with_capacity(agent: AgentId, capacity: usize) -> Self {
        Self {
            agent,
            tick: 0,
            capacity,
            entries: VecDeque::with_capacity(capacity),
        }
    }

    /// Set the tick stamped onto subsequent entries.
    pub const fn begin_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    /// Entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &DebugEntry> {
        self.entries.iter()
    }

    /// The most recent entry.
    pub fn latest(&self) -> Option<&DebugEntry> {
        self.entries.back()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded (or everything was cleared).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every retained entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl DebugSink for DroneDebugger {
    fn record(&mut self, reason: DebugReason, pos: BlockPos) {
        debug!(agent = %self.agent, tick = self.tick, reason = %reason, %pos, "Station skipped");
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(DebugEntry {
            tick: self.tick,
            reason,
            pos,
        });
    }
}
