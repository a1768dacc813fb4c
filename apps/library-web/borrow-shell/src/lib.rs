#[cfg(target_arch = "wasm32")]
mod wasm_state;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use async_trait::async_trait;
    use gloo_net::http::Request;
    use library_client_core::config::DEFAULT_LOG_FILTER;
    use library_client_core::{
        AlertPresenter, BadgePresence, BadgeReconciler, BadgeState, BadgeStep, BorrowController,
        BorrowRequest, BorrowShellConfig, BorrowSurfaces, BorrowTransport, ControlSnapshot,
        CredentialPair, CredentialSource, TransportFault, TriggerControl, TriggerDisposition,
        reconcile_badges, resolve_credential_pair,
    };
    use serde::Serialize;
    use tracing::{debug, info, warn};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{Document, HtmlButtonElement, HtmlElement, RequestCredentials};

    use crate::wasm_state::{MountState, ShellController};

    mod dom;
    mod logging;
    mod network;

    pub(crate) use dom::{
        DomAlertPresenter, DomBadgeReconciler, DomCredentialSource, DomTriggerControl,
    };
    use dom::resolve_page_elements;
    use logging::install_console_subscriber;
    pub(crate) use network::GlooBorrowTransport;

    /// Optional `<script type="application/json">` element carrying a
    /// `BorrowShellConfig` for the automatic mount.
    const CONFIG_ELEMENT_ID: &str = "library-borrow-shell-config";

    thread_local! {
        static SHELL: RefCell<MountState> = RefCell::new(MountState::default());
        static BORROW_CLICK_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
        static DOM_READY_HANDLER: RefCell<Option<Closure<dyn FnMut(web_sys::Event)>>> = const { RefCell::new(None) };
    }

    #[derive(Debug, Serialize)]
    struct UnmountedState<'a> {
        mounted: bool,
        inert_reason: Option<&'a str>,
        last_error: Option<&'a str>,
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        let config = match config_from_page() {
            Ok(config) => config,
            Err(error) => {
                set_mount_error(&error);
                return;
            }
        };
        when_dom_ready(config);
    }

    /// Mounts with an explicit json configuration. The first successful mount
    /// on a page wins; later calls keep the existing controller.
    #[wasm_bindgen]
    pub fn mount_with_config(config_json: String) -> Result<(), JsValue> {
        crate::decode_config(&config_json)
            .and_then(mount)
            .map_err(|error| {
                set_mount_error(&error);
                JsValue::from_str(&error)
            })
    }

    /// Runs the same guarded path as a click on the trigger.
    #[wasm_bindgen]
    pub fn borrow_trigger() {
        let Some(controller) = SHELL.with(|state| state.borrow().controller.clone()) else {
            debug!("borrow trigger ignored: shell is not mounted");
            return;
        };
        spawn_trigger(controller);
    }

    #[wasm_bindgen]
    pub fn borrow_state_json() -> String {
        SHELL.with(|state| {
            let state = state.borrow();
            let json = match state.controller.as_ref() {
                Some(controller) => serde_json::to_string(&controller.snapshot()),
                None => serde_json::to_string(&UnmountedState {
                    mounted: false,
                    inert_reason: state.inert_reason.as_deref(),
                    last_error: state.last_error.as_deref(),
                }),
            };
            json.unwrap_or_else(|_| "{}".to_string())
        })
    }

    fn config_from_page() -> Result<BorrowShellConfig, String> {
        let Some(raw) = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|element| element.text_content())
        else {
            return Ok(BorrowShellConfig::default());
        };
        crate::decode_config(&raw)
    }

    fn when_dom_ready(config: BorrowShellConfig) {
        let Some(document) = web_sys::window().and_then(|window| window.document()) else {
            set_mount_error("document is unavailable");
            return;
        };

        if document.ready_state() != "loading" {
            if let Err(error) = mount(config) {
                set_mount_error(&error);
            }
            return;
        }

        DOM_READY_HANDLER.with(|slot| {
            if slot.borrow().is_some() {
                return;
            }
            let mut pending = Some(config);
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                let Some(config) = pending.take() else {
                    return;
                };
                if let Err(error) = mount(config) {
                    set_mount_error(&error);
                }
            }));
            let _ = document.add_event_listener_with_callback(
                "DOMContentLoaded",
                callback.as_ref().unchecked_ref(),
            );
            *slot.borrow_mut() = Some(callback);
        });
    }

    fn mount(config: BorrowShellConfig) -> Result<(), String> {
        if SHELL.with(|state| state.borrow().controller.is_some()) {
            return Ok(());
        }
        install_console_subscriber(&config.log_filter);

        let window = web_sys::window().ok_or_else(|| "window is unavailable".to_string())?;
        let document = window
            .document()
            .ok_or_else(|| "document is unavailable".to_string())?;

        let Some(page) = resolve_page_elements(&document, &config)? else {
            let reason = "page has no borrowable item".to_string();
            info!(reason = %reason, "borrow shell stays inert");
            SHELL.with(|state| state.borrow_mut().inert_reason = Some(reason));
            return Ok(());
        };

        let controller: Rc<ShellController> = Rc::new(BorrowController::new(
            page.item_id,
            &config,
            GlooBorrowTransport,
            DomCredentialSource::new(document.clone(), &config),
            BorrowSurfaces {
                alert: DomAlertPresenter::new(page.alert_region),
                badge: DomBadgeReconciler::new(
                    document,
                    page.available_badge,
                    page.unavailable_badge,
                    &config,
                ),
                trigger: DomTriggerControl::new(page.trigger.clone(), &config),
            },
        ));

        install_click_handler(&page.trigger, Rc::clone(&controller));
        info!(item_id = controller.item_id(), "borrow shell mounted");
        SHELL.with(|state| {
            let mut state = state.borrow_mut();
            state.controller = Some(controller);
            state.inert_reason = None;
            state.last_error = None;
        });
        Ok(())
    }

    fn install_click_handler(trigger: &HtmlButtonElement, controller: Rc<ShellController>) {
        BORROW_CLICK_HANDLER.with(|slot| {
            if slot.borrow().is_some() {
                return;
            }
            let callback = Closure::<dyn FnMut(web_sys::Event)>::wrap(Box::new(move |_event| {
                spawn_trigger(Rc::clone(&controller));
            }));
            let _ =
                trigger.add_event_listener_with_callback("click", callback.as_ref().unchecked_ref());
            *slot.borrow_mut() = Some(callback);
        });
    }

    // The guard check-and-set runs on the spawned task's first poll, a
    // microtask after this handler returns, not inside the handler itself.
    // Microtasks drain before the next click is dispatched, so a second click
    // still finds the guard held. Until that poll, `borrow_state_json` reports
    // `guard_held: false`.
    fn spawn_trigger(controller: Rc<ShellController>) {
        spawn_local(async move {
            if let TriggerDisposition::Settled(Err(error)) = controller.trigger().await {
                debug!(%error, "borrow attempt did not succeed");
            }
        });
    }

    fn set_mount_error(error: &str) {
        web_sys::console::error_1(&JsValue::from_str(&format!(
            "library borrow shell failed to mount: {error}"
        )));
        warn!(error, "borrow shell mount failed");
        SHELL.with(|state| state.borrow_mut().last_error = Some(error.to_string()));
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::borrow_state_json;

/// Decodes and validates a json configuration; the error text is what the
/// shell records as `last_error`.
fn decode_config(raw: &str) -> Result<library_client_core::BorrowShellConfig, String> {
    library_client_core::BorrowShellConfig::from_json(raw)
        .map_err(|error| format!("invalid borrow shell config: {error}"))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn borrow_state_json() -> String {
    "{\"mounted\":false,\"inert_reason\":\"borrow shell only mounts on wasm\",\"last_error\":null}"
        .to_string()
}
