use super::*;

/// Handles resolved once at mount. The controller never re-queries the page.
pub(super) struct PageElements {
    pub(super) item_id: String,
    pub(super) trigger: HtmlButtonElement,
    pub(super) alert_region: Option<HtmlElement>,
    pub(super) available_badge: Option<HtmlElement>,
    pub(super) unavailable_badge: Option<HtmlElement>,
}

/// `Ok(None)` when the page has no borrowable item (no detail container, no
/// identifier, or no trigger); the shell then stays inert.
pub(super) fn resolve_page_elements(
    document: &Document,
    config: &BorrowShellConfig,
) -> Result<Option<PageElements>, String> {
    let container = document
        .query_selector(&config.container_selector)
        .map_err(|_| format!("invalid container selector {}", config.container_selector))?;
    let Some(container) = container else {
        return Ok(None);
    };
    let Some(item_id) = container
        .get_attribute(&config.item_id_attribute)
        .filter(|value| !value.trim().is_empty())
    else {
        return Ok(None);
    };
    let Some(trigger) = document.get_element_by_id(&config.trigger_id) else {
        return Ok(None);
    };
    let trigger = trigger
        .dyn_into::<HtmlButtonElement>()
        .map_err(|_| "borrow trigger is not a button element".to_string())?;

    Ok(Some(PageElements {
        item_id,
        trigger,
        alert_region: html_element_by_id(document, &config.alert_region_id),
        available_badge: html_element_by_id(document, &config.available_badge_id),
        unavailable_badge: html_element_by_id(document, &config.unavailable_badge_id),
    }))
}

fn html_element_by_id(document: &Document, id: &str) -> Option<HtmlElement> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok())
}

pub(crate) struct DomCredentialSource {
    document: Document,
    header_meta: String,
    token_meta: String,
}

impl DomCredentialSource {
    pub(super) fn new(document: Document, config: &BorrowShellConfig) -> Self {
        Self {
            document,
            header_meta: config.csrf_header_meta.clone(),
            token_meta: config.csrf_token_meta.clone(),
        }
    }

    fn meta_content(&self, name: &str) -> Option<String> {
        self.document
            .query_selector(&format!("meta[name=\"{name}\"]"))
            .ok()
            .flatten()
            .and_then(|meta| meta.get_attribute("content"))
    }
}

impl CredentialSource for DomCredentialSource {
    fn resolve(&self) -> Option<CredentialPair> {
        resolve_credential_pair(
            self.meta_content(&self.header_meta).as_deref(),
            self.meta_content(&self.token_meta).as_deref(),
        )
    }
}

pub(crate) struct DomAlertPresenter {
    region: Option<HtmlElement>,
}

impl DomAlertPresenter {
    pub(super) fn new(region: Option<HtmlElement>) -> Self {
        Self { region }
    }
}

impl AlertPresenter for DomAlertPresenter {
    fn set_alert(&self, content: &str) {
        let Some(region) = self.region.as_ref() else {
            return;
        };
        if region.inner_html() != content {
            region.set_inner_html(content);
        }
    }
}

pub(crate) struct DomBadgeReconciler {
    document: Document,
    available: Option<HtmlElement>,
    unavailable: RefCell<Option<HtmlElement>>,
    unavailable_id: String,
    unavailable_text: String,
    unavailable_class: String,
}

impl DomBadgeReconciler {
    pub(super) fn new(
        document: Document,
        available: Option<HtmlElement>,
        unavailable: Option<HtmlElement>,
        config: &BorrowShellConfig,
    ) -> Self {
        Self {
            document,
            available,
            unavailable: RefCell::new(unavailable),
            unavailable_id: config.unavailable_badge_id.clone(),
            unavailable_text: config.unavailable_badge_text.clone(),
            unavailable_class: config.unavailable_badge_class.clone(),
        }
    }

    fn create_unavailable(&self) -> Result<(), String> {
        let Some(parent) = self.available.as_ref().and_then(|badge| badge.parent_node()) else {
            return Ok(());
        };
        let badge = self
            .document
            .create_element("span")
            .map_err(|_| "failed to create unavailable badge".to_string())?
            .dyn_into::<HtmlElement>()
            .map_err(|_| "unavailable badge is not HtmlElement".to_string())?;
        badge.set_id(&self.unavailable_id);
        badge.set_class_name(&self.unavailable_class);
        badge.set_text_content(Some(&self.unavailable_text));
        parent
            .append_child(&badge)
            .map_err(|_| "failed to append unavailable badge".to_string())?;
        *self.unavailable.borrow_mut() = Some(badge);
        Ok(())
    }
}

impl BadgeReconciler for DomBadgeReconciler {
    fn render(&self, state: BadgeState) {
        let presence = BadgePresence {
            available: self.available.is_some(),
            unavailable: self.unavailable.borrow().is_some(),
        };
        for step in reconcile_badges(state, presence) {
            let result = match step {
                BadgeStep::ShowAvailable => set_visible(self.available.as_ref(), None),
                BadgeStep::HideAvailable => set_visible(self.available.as_ref(), Some("none")),
                BadgeStep::ShowUnavailable => {
                    set_visible(self.unavailable.borrow().as_ref(), Some("inline"))
                }
                BadgeStep::HideUnavailable => {
                    set_visible(self.unavailable.borrow().as_ref(), Some("none"))
                }
                BadgeStep::CreateUnavailable => self.create_unavailable(),
            };
            if let Err(error) = result {
                warn!(?step, %error, "badge reconciliation step failed");
            }
        }
    }
}

fn set_visible(element: Option<&HtmlElement>, display: Option<&str>) -> Result<(), String> {
    let Some(element) = element else {
        return Ok(());
    };
    let style = element.style();
    match display {
        Some(display) => style
            .set_property("display", display)
            .map_err(|_| "failed to set badge display".to_string()),
        None => style
            .remove_property("display")
            .map(|_| ())
            .map_err(|_| "failed to reset badge display".to_string()),
    }
}

pub(crate) struct DomTriggerControl {
    button: HtmlButtonElement,
    pending_class: String,
    armed_class: String,
    terminal_class: String,
}

impl DomTriggerControl {
    pub(super) fn new(button: HtmlButtonElement, config: &BorrowShellConfig) -> Self {
        Self {
            button,
            pending_class: config.pending_class.clone(),
            armed_class: config.armed_class.clone(),
            terminal_class: config.terminal_class.clone(),
        }
    }

    fn toggle_class(&self, class: &str, present: bool) {
        if class.is_empty() {
            return;
        }
        let classes = self.button.class_list();
        let result = if present {
            classes.add_1(class)
        } else {
            classes.remove_1(class)
        };
        if result.is_err() {
            warn!(class, "failed to update borrow trigger class");
        }
    }
}

impl TriggerControl for DomTriggerControl {
    fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            label: self.button.text_content().unwrap_or_default(),
            disabled: self.button.disabled(),
        }
    }

    fn show_pending(&self, label: &str) {
        self.button.set_disabled(true);
        self.toggle_class(&self.pending_class, true);
        self.button.set_text_content(Some(label));
    }

    fn restore(&self, snapshot: &ControlSnapshot) {
        self.button.set_disabled(snapshot.disabled);
        self.toggle_class(&self.pending_class, false);
        self.button.set_text_content(Some(&snapshot.label));
    }

    fn show_unavailable(&self, label: &str) {
        self.button.set_disabled(true);
        self.toggle_class(&self.armed_class, false);
        self.toggle_class(&self.terminal_class, true);
        self.button.set_text_content(Some(label));
    }
}
