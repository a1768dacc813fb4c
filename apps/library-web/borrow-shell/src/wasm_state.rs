use std::rc::Rc;

use library_client_core::BorrowController;

use crate::wasm::{
    DomAlertPresenter, DomBadgeReconciler, DomCredentialSource, DomTriggerControl,
    GlooBorrowTransport,
};

pub(crate) type ShellController = BorrowController<
    GlooBorrowTransport,
    DomCredentialSource,
    DomAlertPresenter,
    DomBadgeReconciler,
    DomTriggerControl,
>;

#[derive(Default)]
pub(crate) struct MountState {
    pub(super) controller: Option<Rc<ShellController>>,
    pub(super) inert_reason: Option<String>,
    pub(super) last_error: Option<String>,
}
