//! Position claims: which drone currently intends to use which block.
//!
//! Drones reserve a charging station by claiming its block position in the
//! region's [`ClaimRegistry`]. There is no release call. A holder keeps its
//! claim alive by re-asserting it every tick; a claim that has not been
//! refreshed for more than the staleness window is treated as absent, so a
//! drone that dies, teleports away, or simply loses interest frees the
//! station without any cleanup hook.
//!
//! Invariants:
//!
//! - At most one live claim per position at any tick.
//! - A live claim is never transferred. A different holder asserting a live
//!   claim gets [`ClaimOutcome::Contested`] and the table is left untouched.
//! - Expiry is purely a function of `(last_refreshed, tick, window)`;
//!   [`ClaimRegistry::prune`] only reclaims memory and never changes the
//!   answer to a query.
//!
//! Registries are scoped per region and handed out by a [`ClaimDirectory`],
//! which creates one on first access and discards it when the region
//! unloads. Each registry guards its table with an internal mutex, so many
//! drones may query and claim during the same tick without any lock visible
//! to callers.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use recharge_types::{AgentId, BlockPos, RegionId};
use tracing::{debug, warn};

/// Default number of ticks a claim survives without being refreshed.
pub const DEFAULT_STALENESS_WINDOW: u64 = 4;

/// A single reservation of a block position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claim {
    /// The drone holding the claim.
    pub holder: AgentId,
    /// The tick at which the holder last asserted the claim.
    pub refreshed_at: u64,
}

impl Claim {
    /// Whether the claim is still live at `tick` under the given window.
    pub const fn is_live(&self, tick: u64, window: u64) -> bool {
        tick.saturating_sub(self.refreshed_at) <= window
    }
}

/// The result of asserting a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The position was free (or only stale-claimed); it now belongs to the caller.
    Acquired,
    /// The caller already held the claim; its validity was extended.
    Refreshed,
    /// Another drone holds a live claim. Nothing was changed.
    Contested {
        /// The drone holding the live claim.
        holder: AgentId,
    },
}

impl ClaimOutcome {
    /// Whether the caller holds the claim after the call.
    pub const fn is_held(self) -> bool {
        matches!(self, Self::Acquired | Self::Refreshed)
    }
}

/// The claim table for a single region.
#[derive(Debug)]
pub struct ClaimRegistry {
    region: RegionId,
    staleness_window: u64,
    claims: Mutex<HashMap<BlockPos, Claim>>,
}

impl ClaimRegistry {
    /// Create an empty registry for a region.
    pub fn new(region: RegionId, staleness_window: u64) -> Self {
        Self {
            region,
            staleness_window,
            claims: Mutex::new(HashMap::new()),
        }
    }

    /// The region this registry belongs to.
    pub const fn region(&self) -> RegionId {
        self.region
    }

    /// Ticks a claim survives without being refreshed.
    pub const fn staleness_window(&self) -> u64 {
        self.staleness_window
    }

    /// Lock the table, recovering from a poisoned lock.
    ///
    /// Every mutation is a single `insert` or `remove`, so the map is
    /// consistent even if a holder of the lock panicked.
    fn table(&self) -> MutexGuard<'_, HashMap<BlockPos, Claim>> {
        self.claims.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            warn!(region = %self.region, "Claim table lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Whether a live claim exists at `pos`, regardless of holder.
    pub fn is_claimed(&self, pos: BlockPos, tick: u64) -> bool {
        self.table()
            .get(&pos)
            .is_some_and(|c| c.is_live(tick, self.staleness_window))
    }

    /// The live holder of `pos`, if any.
    pub fn holder_of(&self, pos: BlockPos, tick: u64) -> Option<AgentId> {
        self.table()
            .get(&pos)
            .filter(|c| c.is_live(tick, self.staleness_window))
            .map(|c| c.holder)
    }

    /// Assert (or refresh) `holder`'s claim on `pos` for `tick`.
    ///
    /// Never overwrites another holder's live claim.
    pub fn claim(&self, pos: BlockPos, holder: AgentId, tick: u64) -> ClaimOutcome {
        let mut table = self.table();
        let outcome = match table.get(&pos) {
            Some(existing) if existing.is_live(tick, self.staleness_window) => {
                if existing.holder == holder {
                    ClaimOutcome::Refreshed
                } else {
                    return ClaimOutcome::Contested {
                        holder: existing.holder,
                    };
                }
            }
            _ => ClaimOutcome::Acquired,
        };
        // A refresh never moves the timestamp backwards.
        let refreshed_at = table
            .get(&pos)
            .filter(|c| c.holder == holder)
            .map_or(tick, |c| c.refreshed_at.max(tick));
        table.insert(
            pos,
            Claim {
                holder,
                refreshed_at,
            },
        );
        if outcome == ClaimOutcome::Acquired {
            debug!(region = %self.region, %pos, agent = %holder, tick, "Claim acquired");
        }
        outcome
    }

    /// Drop stale entries from the table. Returns how many were removed.
    pub fn prune(&self, tick: u64) -> usize {
        let window = self.staleness_window;
        let mut table = self.table();
        let before = table.len();
        table.retain(|_, c| c.is_live(tick, window));
        before.saturating_sub(table.len())
    }

    /// Number of live claims at `tick`.
    pub fn live_claims(&self, tick: u64) -> usize {
        self.table()
            .values()
            .filter(|c| c.is_live(tick, self.staleness_window))
            .count()
    }
}

/// Hands out one [`ClaimRegistry`] per region.
///
/// A registry is created on first access for its region and discarded by
/// [`unload`](Self::unload). Registries are shared via [`Arc`] so a poll can
/// hold one without keeping the directory locked.
#[derive(Debug)]
pub struct ClaimDirectory {
    staleness_window: u64,
    registries: Mutex<BTreeMap<RegionId, Arc<ClaimRegistry>>>,
}

impl Default for ClaimDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_STALENESS_WINDOW)
    }
}

impl ClaimDirectory {
    /// Create an empty directory whose registries use the given window.
    pub const fn new(staleness_window: u64) -> Self {
        Self {
            staleness_window,
            registries: Mutex::new(BTreeMap::new()),
        }
    }

    fn map(&self) -> MutexGuard<'_, BTreeMap<RegionId, Arc<ClaimRegistry>>> {
        self.registries.lock().unwrap_or_else(|poisoned| {
            warn!("Claim directory lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// The registry for `region`, creating it on first access.
    pub fn registry(&self, region: RegionId) -> Arc<ClaimRegistry> {
        let mut map = self.map();
        Arc::clone(map.entry(region).or_insert_with(|| {
            debug!(%region, window = self.staleness_window, "Claim registry created");
            Arc::new(ClaimRegistry::new(region, self.staleness_window))
        }))
    }

    /// The registry for `region` if one has been created.
    pub fn get(&self, region: RegionId) -> Option<Arc<ClaimRegistry>> {
        self.map().get(&region).cloned()
    }

    /// Discard the registry for an unloaded region.
    ///
    /// Returns `true` if a registry existed. Any drone still holding the old
    /// `Arc` keeps a detached table that no one else consults.
    pub fn unload(&self, region: RegionId) -> bool {
        let removed = self.map().remove(&region).is_some();
        if removed {
            debug!(%region, "Claim registry discarded");
        }
        removed
    }

    /// Regions that currently have a registry.
    pub fn loaded_regions(&self) -> Vec<RegionId> {
        self.map().keys().copied().collect()
    }

    /// Prune every registry. Returns the total number of entries removed.
    pub fn prune_all(&self, tick: u64) -> usize {
        let registries: Vec<Arc<ClaimRegistry>> = self.map().values().cloned().collect();
        registries
            .iter()
            .map(|r| r.prune(tick))
            .fold(0_usize, usize::saturating_add)
    }

    /// Total live claims across every registry.
    pub fn live_claims(&self, tick: u64) -> usize {
        let registries: Vec<Arc<ClaimRegistry>> = self.map().values().cloned().collect();
        registries
            .iter()
            .map(|r| r.live_claims(tick))
            .fold(0_usize, usize::saturating_add)
    }
}
