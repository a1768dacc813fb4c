//! Platform-neutral core of the library borrow action.
//!
//! The browser shell supplies DOM-backed implementations of the capability
//! traits in [`controller`]; everything else here is pure and tested natively.

pub mod badge;
pub mod config;
pub mod controller;
pub mod credentials;
pub mod outcome;
pub mod transition;

pub use badge::{BadgePresence, BadgeStep, reconcile_badges};
pub use config::{AlertMessages, BorrowShellConfig, ConfigError, borrow_path};
pub use controller::{
    AlertPresenter, BadgeReconciler, BadgeState, BorrowController, BorrowRequest, BorrowSurfaces,
    BorrowTransport, ControlSnapshot, ControllerSnapshot, IgnoreReason, TriggerControl,
    TriggerDisposition, TriggerState,
};
pub use credentials::{CredentialPair, CredentialSource, resolve_credential_pair};
pub use outcome::{BorrowError, OutcomeKind, TransportFault, classify_status};
