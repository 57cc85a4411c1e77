//! Tag state machines.
//!
//! Two independent machines share one state vocabulary:
//!
//! ```text
//!  Application:  Advertising ──[connection opened]──▶ Idle
//!                     ▲                                 │
//!                     │                        [watchdog expired]
//!            [sync closed]                              ▼
//!                     └───── Idle ◀──[sync closed]── CloseSync
//!
//!  Sync:         Unsynced ──[sync transfer]──▶ Synced
//!                    ▲                           │
//!              [sync closed]             [watchdog expired]
//!                    └──────── CloseSync ◀───────┘
//! ```
//!
//! Both are mutated only through [`StateMachine::set_new_state`], which
//! snapshots `current` into `previous` before assigning.  `previous` exists
//! for diagnostics; no transition logic reads it.

pub mod sync;

use log::{debug, info};

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Every state either machine can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TagState {
    Idle = 0,
    ReadingSensor = 1,
    ValuesRead = 2,
    Advertising = 3,
    PreparingForSleep = 4,
    Unsynced = 5,
    Synced = 6,
    CloseSync = 7,
}

impl TagState {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::ReadingSensor => "ReadingSensor",
            Self::ValuesRead => "ValuesRead",
            Self::Advertising => "Advertising",
            Self::PreparingForSleep => "PreparingForSleep",
            Self::Unsynced => "Unsynced",
            Self::Synced => "Synced",
            Self::CloseSync => "CloseSync",
        }
    }
}

// ---------------------------------------------------------------------------
// Machine identity
// ---------------------------------------------------------------------------

/// Which of the two machines a [`StateMachine`] instance is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Machine {
    /// Connection and advertising phases.
    Application,
    /// Periodic-sync lifecycle.
    Sync,
}

impl Machine {
    /// Whether `state` belongs to this machine's vocabulary.
    ///
    /// `Unsynced` and `Synced` are sync-only and `CloseSync` is shared.
    /// Everything else, `Idle` included, is application-only.
    pub const fn admits(self, state: TagState) -> bool {
        match self {
            Self::Sync => matches!(
                state,
                TagState::Unsynced | TagState::Synced | TagState::CloseSync
            ),
            Self::Application => !matches!(state, TagState::Unsynced | TagState::Synced),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Application => "app",
            Self::Sync => "sync",
        }
    }
}

// ---------------------------------------------------------------------------
// State holder
// ---------------------------------------------------------------------------

/// Current/previous pair for one machine.
#[derive(Debug, Clone)]
pub struct StateMachine {
    machine: Machine,
    current: TagState,
    previous: TagState,
}

impl StateMachine {
    /// Construct a machine resting in `initial` (previous == current).
    pub fn new(machine: Machine, initial: TagState) -> Self {
        debug_assert!(
            machine.admits(initial),
            "{} machine cannot start in {}",
            machine.name(),
            initial.name()
        );
        Self {
            machine,
            current: initial,
            previous: initial,
        }
    }

    /// Snapshot `current` into `previous`, then assign `next`.
    ///
    /// Repeating the same state is allowed and leaves
    /// `previous == current == next`.
    pub fn set_new_state(&mut self, next: TagState) {
        debug_assert!(
            self.machine.admits(next),
            "{} machine cannot enter {}",
            self.machine.name(),
            next.name()
        );

        if next == self.current {
            debug!("{} FSM: re-entering {}", self.machine.name(), next.name());
        } else {
            info!(
                "{} FSM transition: {} -> {}",
                self.machine.name(),
                self.current.name(),
                next.name()
            );
        }

        self.previous = self.current;
        self.current = next;
    }

    pub fn current(&self) -> TagState {
        self.current
    }

    pub fn previous(&self) -> TagState {
        self.previous
    }
}
