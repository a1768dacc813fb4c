//! Single-flight borrow controller.
//!
//! `BorrowController::trigger` runs the whole action for one click. Everything
//! up to the transport call (guard check, alert clear, pending state, request
//! build) executes synchronously on the first poll; the transport exchange is
//! the only suspension point. Effects are applied after settlement in the order
//! alert, control, badge, and the guard is released last.

use std::cell::Cell;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{AlertMessages, BorrowShellConfig, borrow_path};
use crate::credentials::CredentialSource;
use crate::outcome::{BorrowError, OutcomeKind, TransportFault, classify_status};
use crate::transition::{BadgeAction, ControlEffect, render_alert_markup, transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerState {
    Idle,
    Pending,
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeState {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

/// Issues the borrow `POST`. Returns the response status, or a fault when no
/// response was received. Implementations must not time out or retry.
#[async_trait(?Send)]
pub trait BorrowTransport {
    async fn post_borrow(&self, request: BorrowRequest) -> Result<u16, TransportFault>;
}

pub trait AlertPresenter {
    /// Replaces the region contents; empty content clears it.
    fn set_alert(&self, content: &str);
}

pub trait BadgeReconciler {
    fn render(&self, state: BadgeState);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlSnapshot {
    pub label: String,
    pub disabled: bool,
}

pub trait TriggerControl {
    fn snapshot(&self) -> ControlSnapshot;
    fn show_pending(&self, label: &str);
    fn restore(&self, snapshot: &ControlSnapshot);
    fn show_unavailable(&self, label: &str);
}

pub struct BorrowSurfaces<A, B, G> {
    pub alert: A,
    pub badge: B,
    pub trigger: G,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    InFlight,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerDisposition {
    Ignored(IgnoreReason),
    Settled(Result<(), BorrowError>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub item_id: String,
    pub trigger_state: TriggerState,
    pub badge_state: BadgeState,
    pub guard_held: bool,
    pub requests_issued: u64,
    pub last_outcome: Option<OutcomeKind>,
}

pub struct BorrowController<T, C, A, B, G> {
    item_id: String,
    path: String,
    pending_label: String,
    unavailable_label: String,
    messages: AlertMessages,
    transport: T,
    credentials: C,
    surfaces: BorrowSurfaces<A, B, G>,
    guard: Cell<bool>,
    trigger_state: Cell<TriggerState>,
    badge_state: Cell<BadgeState>,
    requests_issued: Cell<u64>,
    last_outcome: Cell<Option<OutcomeKind>>,
}

impl<T, C, A, B, G> BorrowController<T, C, A, B, G>
where
    T: BorrowTransport,
    C: CredentialSource,
    A: AlertPresenter,
    B: BadgeReconciler,
    G: TriggerControl,
{
    pub fn new(
        item_id: impl Into<String>,
        config: &BorrowShellConfig,
        transport: T,
        credentials: C,
        surfaces: BorrowSurfaces<A, B, G>,
    ) -> Self {
        let item_id = item_id.into();
        let path = borrow_path(&config.endpoint_template, &item_id);
        Self {
            item_id,
            path,
            pending_label: config.pending_label.clone(),
            unavailable_label: config.unavailable_label.clone(),
            messages: config.messages.clone(),
            transport,
            credentials,
            surfaces,
            guard: Cell::new(false),
            trigger_state: Cell::new(TriggerState::Idle),
            badge_state: Cell::new(BadgeState::Available),
            requests_issued: Cell::new(0),
            last_outcome: Cell::new(None),
        }
    }

    pub fn item_id(&self) -> &str {
        &self.item_id
    }

    pub fn trigger_state(&self) -> TriggerState {
        self.trigger_state.get()
    }

    pub fn badge_state(&self) -> BadgeState {
        self.badge_state.get()
    }

    pub fn guard_held(&self) -> bool {
        self.guard.get()
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            item_id: self.item_id.clone(),
            trigger_state: self.trigger_state.get(),
            badge_state: self.badge_state.get(),
            guard_held: self.guard.get(),
            requests_issued: self.requests_issued.get(),
            last_outcome: self.last_outcome.get(),
        }
    }

    pub async fn trigger(&self) -> TriggerDisposition {
        if self.trigger_state.get() == TriggerState::Unavailable {
            debug!(item_id = %self.item_id, "borrow trigger ignored: item already borrowed");
            return TriggerDisposition::Ignored(IgnoreReason::Unavailable);
        }
        if self.guard.replace(true) {
            debug!(item_id = %self.item_id, "borrow trigger ignored: request in flight");
            return TriggerDisposition::Ignored(IgnoreReason::InFlight);
        }
        self.trigger_state.set(TriggerState::Pending);
        self.surfaces.alert.set_alert("");
        let mut in_flight = InFlightGuard {
            flag: &self.guard,
            trigger_state: &self.trigger_state,
            control: &self.surfaces.trigger,
            before: self.surfaces.trigger.snapshot(),
            settled: false,
        };
        self.surfaces.trigger.show_pending(&self.pending_label);

        let request = self.build_request();
        self.requests_issued.set(self.requests_issued.get().saturating_add(1));
        debug!(
            item_id = %self.item_id,
            path = %request.path,
            with_credentials = !request.headers.is_empty(),
            "issuing borrow request"
        );

        let outcome = match self.transport.post_borrow(request).await {
            Ok(status) => classify_status(status),
            Err(fault) => {
                warn!(item_id = %self.item_id, error = %fault, "borrow request transport fault");
                Err(BorrowError::from(fault))
            }
        };

        self.settle(&outcome, &in_flight.before);
        in_flight.settled = true;
        drop(in_flight);
        TriggerDisposition::Settled(outcome)
    }

    fn build_request(&self) -> BorrowRequest {
        let headers = self
            .credentials
            .resolve()
            .map(|pair| vec![(pair.header_name, pair.token)])
            .unwrap_or_default();
        BorrowRequest {
            path: self.path.clone(),
            headers,
        }
    }

    fn settle(&self, outcome: &Result<(), BorrowError>, before: &ControlSnapshot) {
        let kind = OutcomeKind::of(outcome);
        let next = transition(outcome, &self.messages);
        info!(item_id = %self.item_id, outcome = kind.as_str(), "borrow request settled");

        self.surfaces
            .alert
            .set_alert(&render_alert_markup(&next.alert));

        match next.control {
            ControlEffect::MarkUnavailable => {
                self.surfaces
                    .trigger
                    .show_unavailable(&self.unavailable_label);
                self.trigger_state.set(TriggerState::Unavailable);
            }
            ControlEffect::Restore => {
                self.surfaces.trigger.restore(before);
                self.trigger_state.set(TriggerState::Idle);
            }
        }

        if next.badge == BadgeAction::MarkUnavailable {
            self.badge_state.set(BadgeState::Unavailable);
            self.surfaces.badge.render(BadgeState::Unavailable);
        }

        self.last_outcome.set(Some(kind));
    }
}

/// Releases the single-flight flag when dropped. If the trigger future is
/// dropped before settlement, the control goes back to its pre-click snapshot
/// and the trigger returns to `Idle` first.
struct InFlightGuard<'a, G: TriggerControl> {
    flag: &'a Cell<bool>,
    trigger_state: &'a Cell<TriggerState>,
    control: &'a G,
    before: ControlSnapshot,
    settled: bool,
}

impl<G: TriggerControl> Drop for InFlightGuard<'_, G> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("borrow attempt abandoned before settlement; restoring trigger");
            self.control.restore(&self.before);
            self.trigger_state.set(TriggerState::Idle);
        }
        self.flag.set(false);
    }
}
