use crate::controller::BadgeState;

/// Which badge elements the page currently renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BadgePresence {
    pub available: bool,
    pub unavailable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStep {
    ShowAvailable,
    HideAvailable,
    ShowUnavailable,
    HideUnavailable,
    /// Synthesize the unavailable badge beside the available one.
    CreateUnavailable,
}

/// Declarative reconciliation of the availability badges. The unavailable
/// badge is only synthesized when an available badge exists to anchor it; a
/// page without badges yields no steps.
#[must_use]
pub fn reconcile_badges(state: BadgeState, presence: BadgePresence) -> Vec<BadgeStep> {
    let mut steps = Vec::with_capacity(2);
    match state {
        BadgeState::Available => {
            if presence.available {
                steps.push(BadgeStep::ShowAvailable);
            }
            if presence.unavailable {
                steps.push(BadgeStep::HideUnavailable);
            }
        }
        BadgeState::Unavailable => {
            if presence.available {
                steps.push(BadgeStep::HideAvailable);
            }
            if presence.unavailable {
                steps.push(BadgeStep::ShowUnavailable);
            } else if presence.available {
                steps.push(BadgeStep::CreateUnavailable);
            }
        }
    }
    steps
}
