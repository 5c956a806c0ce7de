//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch.
//!
//! ```text
//!   PRESENT ──[clear]──▶ VACANT_DIMMED ──[vacant ≥ dim_delay]──▶ OFF
//!      ▲                       │                                  │
//!      └───────[present]───────┘                                  │
//!      └──────────────────────────[present]───────────────────────┘
//!
//!  An unknown reading never moves the machine.
//! ```

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use crate::app::commands::ActionRequest;
use log::info;

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Present
        StateDescriptor {
            id: StateId::Present,
            name: "Present",
            on_enter: Some(present_enter),
            on_exit: None,
            on_update: present_update,
        },
        // Index 1: VacantDimmed
        StateDescriptor {
            id: StateId::VacantDimmed,
            name: "VacantDimmed",
            on_enter: Some(vacant_enter),
            on_exit: Some(vacant_exit),
            on_update: vacant_update,
        },
        // Index 2: Off
        StateDescriptor {
            id: StateId::Off,
            name: "Off",
            on_enter: Some(off_enter),
            on_exit: None,
            on_update: off_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  PRESENT
// ═══════════════════════════════════════════════════════════════════════════

fn present_enter(ctx: &mut FsmContext) {
    if ctx.lamp_off {
        ctx.emit(ActionRequest::OnLast);
    }
    ctx.emit(ActionRequest::SetBrightnessPct(ctx.config.occupied_level_pct));
    ctx.vacancy_started = None;
    info!(
        "PRESENT: room occupied, lamp to {}%",
        ctx.config.occupied_level_pct
    );
}

fn present_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.reading {
        Some(false) => Some(StateId::VacantDimmed),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  VACANT_DIMMED: warning level while the off-delay runs
// ═══════════════════════════════════════════════════════════════════════════

fn vacant_enter(ctx: &mut FsmContext) {
    ctx.vacancy_started = Some(ctx.now);
    if !ctx.lamp_off {
        ctx.emit(ActionRequest::SetBrightnessPct(ctx.config.dim_level_pct));
    }
    info!(
        "VACANT: dimming to {}%, off in {}s",
        ctx.config.dim_level_pct, ctx.config.dim_delay_secs
    );
}

fn vacant_exit(ctx: &mut FsmContext) {
    ctx.vacancy_started = None;
}

fn vacant_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.reading {
        None => None,
        Some(true) => Some(StateId::Present),
        Some(false) => match ctx.vacant_for() {
            Some(elapsed) if elapsed >= ctx.dim_delay() => Some(StateId::Off),
            _ => None,
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  OFF
// ═══════════════════════════════════════════════════════════════════════════

fn off_enter(ctx: &mut FsmContext) {
    ctx.emit(ActionRequest::Off);
    ctx.vacancy_started = None;
    info!("OFF: room vacant, lamp off");
}

fn off_update(ctx: &mut FsmContext) -> Option<StateId> {
    match ctx.reading {
        Some(true) => Some(StateId::Present),
        _ => None,
    }
}
