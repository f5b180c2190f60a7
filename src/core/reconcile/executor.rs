//! Plan execution.

use super::action::ActionKind;
use super::plan::Plan;
use crate::core::pool::CancellationToken;
use crate::error::ApplyError;
use crate::events::{ApplyEvent, Event, EventSender};
use serde::Serialize;

/// How execution of a plan ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// Every action ran
    Completed,
    /// The plan held conflicts; nothing was touched
    Refused,
    /// Cancellation stopped execution; applied actions stay applied
    Interrupted,
}

/// Result of executing a plan
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub outcome: ApplyOutcome,
    /// Number of actions that ran
    pub applied: usize,
    /// Description of each applied action, in order
    pub messages: Vec<String>,
}

/// Execute `plan` in order.
///
/// A plan containing any conflict is refused as a whole before the first
/// action runs. The first failing action aborts execution; earlier actions
/// are not rolled back.
pub fn apply(
    plan: &Plan,
    cancel: &CancellationToken,
    events: &EventSender,
) -> Result<ApplyReport, ApplyError> {
    let conflicts = plan.count(ActionKind::Conflict);
    if conflicts > 0 {
        tracing::warn!(plan_id = %plan.id(), conflicts, "Refusing to apply plan with conflicts");
        events.send(Event::Apply(ApplyEvent::Refused { conflicts }));
        return Ok(ApplyReport {
            outcome: ApplyOutcome::Refused,
            applied: 0,
            messages: Vec::new(),
        });
    }

    let total = plan.len();
    events.send(Event::Apply(ApplyEvent::Started { actions: total }));
    tracing::info!(plan_id = %plan.id(), actions = total, "Applying plan");

    let mut messages = Vec::with_capacity(total);
    for (index, action) in plan.actions().iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::warn!(applied = index, remaining = total - index, "Plan application interrupted");
            events.send(Event::Apply(ApplyEvent::Interrupted {
                applied: index,
                remaining: total - index,
            }));
            return Ok(ApplyReport {
                outcome: ApplyOutcome::Interrupted,
                applied: index,
                messages,
            });
        }

        let message = action.execute()?;
        tracing::debug!(index, kind = %action.kind(), "{message}");
        events.send(Event::Apply(ApplyEvent::ActionApplied {
            index,
            message: message.clone(),
        }));
        messages.push(message);
    }

    events.send(Event::Apply(ApplyEvent::Completed { applied: total }));
    Ok(ApplyReport {
        outcome: ApplyOutcome::Completed,
        applied: total,
        messages,
    })
}
