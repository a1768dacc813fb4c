use serde::{Deserialize, Serialize};

use crate::credentials::{DEFAULT_CSRF_HEADER_META, DEFAULT_CSRF_TOKEN_META};

pub const ITEM_ID_PLACEHOLDER: &str = "{item_id}";
pub const DEFAULT_BORROW_ENDPOINT_TEMPLATE: &str = "/library/ui/me/borrowBook/{item_id}";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("endpoint template must not be empty")]
    EmptyEndpointTemplate,
    #[error("endpoint template must be a same-origin path starting with '/'")]
    EndpointNotSameOrigin,
    #[error("endpoint template must contain the {{item_id}} placeholder")]
    MissingItemPlaceholder,
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("shell configuration is not valid json: {message}")]
    Decode { message: String },
}

/// Texts shown in the alert region, one per settlement branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertMessages {
    pub success: String,
    pub conflict: String,
    pub unauthenticated: String,
    pub server_error: String,
    pub transport_fault: String,
}

impl Default for AlertMessages {
    fn default() -> Self {
        Self {
            success: "Buch wurde erfolgreich ausgeliehen.".to_string(),
            conflict: "Dieses Buch ist bereits ausgeliehen.".to_string(),
            unauthenticated: "Bitte anmelden, um Bücher auszuleihen.".to_string(),
            server_error: "Ein unbekannter Fehler ist aufgetreten.".to_string(),
            transport_fault: "Fehler beim Verbinden mit dem Server.".to_string(),
        }
    }
}

/// Everything the browser shell needs to locate its elements and talk to the
/// borrow endpoint. Unknown or missing json fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorrowShellConfig {
    pub container_selector: String,
    pub item_id_attribute: String,
    pub trigger_id: String,
    pub alert_region_id: String,
    pub available_badge_id: String,
    pub unavailable_badge_id: String,
    pub csrf_header_meta: String,
    pub csrf_token_meta: String,
    pub endpoint_template: String,
    pub pending_label: String,
    pub unavailable_label: String,
    pub unavailable_badge_text: String,
    pub pending_class: String,
    pub armed_class: String,
    pub terminal_class: String,
    pub unavailable_badge_class: String,
    pub messages: AlertMessages,
    pub log_filter: String,
}

impl Default for BorrowShellConfig {
    fn default() -> Self {
        Self {
            container_selector: ".book-details".to_string(),
            item_id_attribute: "data-isbn".to_string(),
            trigger_id: "borrow-button".to_string(),
            alert_region_id: "loan-alert-container".to_string(),
            available_badge_id: "badge-available".to_string(),
            unavailable_badge_id: "badge-unavailable".to_string(),
            csrf_header_meta: DEFAULT_CSRF_HEADER_META.to_string(),
            csrf_token_meta: DEFAULT_CSRF_TOKEN_META.to_string(),
            endpoint_template: DEFAULT_BORROW_ENDPOINT_TEMPLATE.to_string(),
            pending_label: "Wird ausgeliehen…".to_string(),
            unavailable_label: "Nicht verfügbar".to_string(),
            unavailable_badge_text: "Ausgeliehen".to_string(),
            pending_class: "disabled".to_string(),
            armed_class: "btn-primary".to_string(),
            terminal_class: "btn-secondary".to_string(),
            unavailable_badge_class: "badge bg-danger".to_string(),
            messages: AlertMessages::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl BorrowShellConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|error| ConfigError::Decode {
            message: error.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint_template(&self.endpoint_template)?;
        let required = [
            ("container_selector", &self.container_selector),
            ("item_id_attribute", &self.item_id_attribute),
            ("trigger_id", &self.trigger_id),
            ("alert_region_id", &self.alert_region_id),
            ("available_badge_id", &self.available_badge_id),
            ("unavailable_badge_id", &self.unavailable_badge_id),
            ("csrf_header_meta", &self.csrf_header_meta),
            ("csrf_token_meta", &self.csrf_token_meta),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::EmptyField { field });
            }
        }
        Ok(())
    }
}

pub fn validate_endpoint_template(raw: &str) -> Result<(), ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyEndpointTemplate);
    }
    // Protocol-relative "//host" would leave the origin.
    if !trimmed.starts_with('/') || trimmed.starts_with("//") {
        return Err(ConfigError::EndpointNotSameOrigin);
    }
    if !trimmed.contains(ITEM_ID_PLACEHOLDER) {
        return Err(ConfigError::MissingItemPlaceholder);
    }
    Ok(())
}

/// Substitutes the percent-encoded item identifier into the endpoint template.
#[must_use]
pub fn borrow_path(template: &str, item_id: &str) -> String {
    template
        .trim()
        .replace(ITEM_ID_PLACEHOLDER, &urlencoding::encode(item_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(BorrowShellConfig::default().validate(), Ok(()));
    }

    #[test]
    fn borrow_path_encodes_item_identifier() {
        let path = borrow_path(DEFAULT_BORROW_ENDPOINT_TEMPLATE, "978 3/16#1");
        assert_eq!(path, "/library/ui/me/borrowBook/978%203%2F16%231");
    }

    #[test]
    fn borrow_path_keeps_plain_isbn() {
        let path = borrow_path(DEFAULT_BORROW_ENDPOINT_TEMPLATE, "9783161484100");
        assert_eq!(path, "/library/ui/me/borrowBook/9783161484100");
    }

    #[test]
    fn endpoint_template_requires_placeholder() {
        let error = validate_endpoint_template("/library/ui/me/borrowBook").expect_err("invalid");
        assert_eq!(error, ConfigError::MissingItemPlaceholder);
    }

    #[test]
    fn endpoint_template_rejects_cross_origin() {
        for template in ["https://evil.example/{item_id}", "//evil.example/{item_id}"] {
            let error = validate_endpoint_template(template).expect_err("invalid");
            assert_eq!(error, ConfigError::EndpointNotSameOrigin);
        }
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = BorrowShellConfig::from_json(
            r#"{"trigger_id":"loan-button","messages":{"success":"Done."}}"#,
        )
        .expect("valid config");
        assert_eq!(config.trigger_id, "loan-button");
        assert_eq!(config.messages.success, "Done.");
        assert_eq!(config.messages.conflict, AlertMessages::default().conflict);
        assert_eq!(config.endpoint_template, DEFAULT_BORROW_ENDPOINT_TEMPLATE);
    }

    #[test]
    fn json_with_blank_id_is_rejected() {
        let error = BorrowShellConfig::from_json(r#"{"alert_region_id":" "}"#)
            .expect_err("blank id rejected");
        assert_eq!(
            error,
            ConfigError::EmptyField {
                field: "alert_region_id"
            }
        );
    }

    #[test]
    fn malformed_json_reports_decode_error() {
        let error = BorrowShellConfig::from_json("{").expect_err("malformed");
        assert!(matches!(error, ConfigError::Decode { .. }));
    }
}
