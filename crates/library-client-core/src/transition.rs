//! Pure settlement table: which alert, trigger and badge effects follow from
//! a borrow outcome. No DOM access happens here.

use crate::config::AlertMessages;
use crate::outcome::BorrowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTone {
    Success,
    Warning,
    Danger,
}

impl AlertTone {
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Success => "alert-success",
            Self::Warning => "alert-warning",
            Self::Danger => "alert-danger",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertNotice {
    pub tone: AlertTone,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEffect {
    /// Terminal: disabled, unavailable label and styling, never re-armed.
    MarkUnavailable,
    /// Back to the label and enabled state captured before the click.
    Restore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeAction {
    MarkUnavailable,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub alert: AlertNotice,
    pub control: ControlEffect,
    pub badge: BadgeAction,
}

#[must_use]
pub fn transition(outcome: &Result<(), BorrowError>, messages: &AlertMessages) -> Transition {
    let (tone, message) = match outcome {
        Ok(()) => {
            return Transition {
                alert: AlertNotice {
                    tone: AlertTone::Success,
                    message: messages.success.clone(),
                },
                control: ControlEffect::MarkUnavailable,
                badge: BadgeAction::MarkUnavailable,
            };
        }
        Err(BorrowError::Conflict) => (AlertTone::Danger, &messages.conflict),
        Err(BorrowError::Unauthenticated) => (AlertTone::Warning, &messages.unauthenticated),
        Err(BorrowError::ServerError { .. }) => (AlertTone::Warning, &messages.server_error),
        Err(BorrowError::TransportFault(_)) => (AlertTone::Danger, &messages.transport_fault),
    };

    Transition {
        alert: AlertNotice {
            tone,
            message: message.clone(),
        },
        control: ControlEffect::Restore,
        badge: BadgeAction::Unchanged,
    }
}

/// Dismissible alert block for the alert region. The message is escaped; the
/// surrounding markup is fixed.
#[must_use]
pub fn render_alert_markup(notice: &AlertNotice) -> String {
    format!(
        "<div class=\"alert {} alert-dismissible fade show\" role=\"alert\">{}<button type=\"button\" class=\"btn-close\" data-bs-dismiss=\"alert\"></button></div>",
        notice.tone.css_class(),
        escape_html(&notice.message)
    )
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::TransportFault;

    #[test]
    fn success_marks_control_and_badge_unavailable() {
        let messages = AlertMessages::default();
        let next = transition(&Ok(()), &messages);
        assert_eq!(next.alert.tone, AlertTone::Success);
        assert_eq!(next.alert.message, messages.success);
        assert_eq!(next.control, ControlEffect::MarkUnavailable);
        assert_eq!(next.badge, BadgeAction::MarkUnavailable);
    }

    #[test]
    fn failures_restore_control_and_leave_badge() {
        let messages = AlertMessages::default();
        let cases = [
            (BorrowError::Conflict, AlertTone::Danger, &messages.conflict),
            (
                BorrowError::Unauthenticated,
                AlertTone::Warning,
                &messages.unauthenticated,
            ),
            (
                BorrowError::ServerError { status: 503 },
                AlertTone::Warning,
                &messages.server_error,
            ),
            (
                BorrowError::TransportFault(TransportFault::new("offline")),
                AlertTone::Danger,
                &messages.transport_fault,
            ),
        ];

        for (error, tone, message) in cases {
            let next = transition(&Err(error), &messages);
            assert_eq!(next.alert.tone, tone);
            assert_eq!(&next.alert.message, message);
            assert_eq!(next.control, ControlEffect::Restore);
            assert_eq!(next.badge, BadgeAction::Unchanged);
        }
    }

    #[test]
    fn alert_markup_is_dismissible_and_escaped() {
        let markup = render_alert_markup(&AlertNotice {
            tone: AlertTone::Warning,
            message: "<b>Tom & Jerry</b>".to_string(),
        });
        assert!(markup.starts_with("<div class=\"alert alert-warning alert-dismissible fade show\""));
        assert!(markup.contains("&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;"));
        assert!(markup.contains("data-bs-dismiss=\"alert\""));
    }
}
