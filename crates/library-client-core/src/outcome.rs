use serde::{Deserialize, Serialize};

/// The request never produced a response (network, DNS, abort).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("borrow request failed before a response: {message}")]
pub struct TransportFault {
    pub message: String,
}

impl TransportFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Every non-success settlement of a borrow request. All variants are
/// recovered locally and leave the trigger retryable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BorrowError {
    #[error("item is already borrowed")]
    Conflict,
    #[error("borrowing requires a signed-in session")]
    Unauthenticated,
    #[error("borrow endpoint returned status {status}")]
    ServerError { status: u16 },
    #[error(transparent)]
    TransportFault(#[from] TransportFault),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    Conflict,
    Unauthenticated,
    ServerError,
    TransportFault,
}

impl OutcomeKind {
    #[must_use]
    pub fn of(outcome: &Result<(), BorrowError>) -> Self {
        match outcome {
            Ok(()) => Self::Success,
            Err(BorrowError::Conflict) => Self::Conflict,
            Err(BorrowError::Unauthenticated) => Self::Unauthenticated,
            Err(BorrowError::ServerError { .. }) => Self::ServerError,
            Err(BorrowError::TransportFault(_)) => Self::TransportFault,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Conflict => "conflict",
            Self::Unauthenticated => "unauthenticated",
            Self::ServerError => "server_error",
            Self::TransportFault => "transport_fault",
        }
    }
}

/// Maps the response status of the borrow endpoint. The body is never read.
pub fn classify_status(status: u16) -> Result<(), BorrowError> {
    match status {
        200..=299 => Ok(()),
        409 => Err(BorrowError::Conflict),
        401 => Err(BorrowError::Unauthenticated),
        status => Err(BorrowError::ServerError { status }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_2xx_status_is_success() {
        for status in [200, 201, 204, 299] {
            assert_eq!(classify_status(status), Ok(()));
        }
    }

    #[test]
    fn conflict_and_unauthenticated_have_dedicated_kinds() {
        assert_eq!(classify_status(409), Err(BorrowError::Conflict));
        assert_eq!(classify_status(401), Err(BorrowError::Unauthenticated));
    }

    #[test]
    fn remaining_statuses_are_server_errors() {
        for status in [0, 302, 400, 403, 404, 500, 503] {
            assert_eq!(
                classify_status(status),
                Err(BorrowError::ServerError { status })
            );
        }
    }

    #[test]
    fn outcome_kind_tracks_variant() {
        let fault: Result<(), BorrowError> = Err(TransportFault::new("offline").into());
        assert_eq!(OutcomeKind::of(&fault), OutcomeKind::TransportFault);
        assert_eq!(OutcomeKind::of(&Ok(())).as_str(), "success");
        assert_eq!(
            OutcomeKind::of(&Err(BorrowError::ServerError { status: 500 })),
            OutcomeKind::ServerError
        );
    }
}
