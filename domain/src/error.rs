//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries: callers match on `error_kind` without reaching into
/// `entity_api` or driver error types.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    /// Failures of the bot lifecycle engine and its invariants.
    Engine(EngineErrorKind),
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// The engine's failure taxonomy. Callers receive these verbatim; messages
/// quote API codes, never the internal numeric codes.
#[derive(Debug, PartialEq)]
pub enum EngineErrorKind {
    /// The event kind/subkind pair is not an allowed combination.
    InvalidEventCombination(String),
    /// No transition entry exists for the event kind.
    UndefinedEventKind(String),
    /// The bot's current state is outside the transition's valid from-states.
    IllegalTransition(String),
    /// A versioned write lost against a concurrent writer.
    OptimisticConflict,
    /// The state column no longer holds the state this worker just wrote.
    ConcurrentStateOverwrite(String),
    /// A recording or staging pre-condition did not hold.
    InvariantViolation(String),
    /// A requested-action stamp was attempted in an unexpected situation.
    InvalidRequest(String),
    /// A credential blob or webhook secret could not be decrypted.
    DecryptionFailed,
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config(String),
    Other(String),
}

/// Entity errors that can bubble up from the `entity_api` layer, reduced to a
/// subset of error kinds that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    /// A unique or exclusion constraint rejected a write. The credit ledger's
    /// retry loop is keyed on this kind.
    UniqueViolation,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    Other(String),
}

impl Error {
    pub fn engine(kind: EngineErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Engine(kind),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(message.into())),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config(message.into())),
        }
    }

    /// Whether this error is a lost optimistic-concurrency race. The engine's
    /// and heartbeat's retry loops are keyed on exactly this predicate.
    pub fn is_optimistic_conflict(&self) -> bool {
        self.error_kind == DomainErrorKind::Engine(EngineErrorKind::OptimisticConflict)
    }

    /// Whether this error is a unique-constraint rejection, which the credit
    /// ledger treats as "another writer appended first, retry".
    pub fn is_unique_violation(&self) -> bool {
        self.error_kind
            == DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::UniqueViolation,
            ))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let error_kind = match err.error_kind {
            // A stale versioned write is the engine's retryable conflict.
            EntityApiErrorKind::StaleVersion => {
                DomainErrorKind::Engine(EngineErrorKind::OptimisticConflict)
            }
            EntityApiErrorKind::UniqueViolation => DomainErrorKind::Internal(
                InternalErrorKind::Entity(EntityErrorKind::UniqueViolation),
            ),
            EntityApiErrorKind::RecordNotFound => {
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
            }
            EntityApiErrorKind::InvalidQueryTerm | EntityApiErrorKind::ValidationError => {
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid))
            }
            _ => DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Other(
                "EntityErrorKind".to_string(),
            ))),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<sea_orm::DbErr> for Error {
    fn from(err: sea_orm::DbErr) -> Self {
        EntityApiError::from(err).into()
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<crate::encryption::EncryptionError> for Error {
    fn from(err: crate::encryption::EncryptionError) -> Self {
        let error_kind = match err {
            crate::encryption::EncryptionError::DecryptionFailed
            | crate::encryption::EncryptionError::CiphertextTooShort
            | crate::encryption::EncryptionError::Base64DecodeError(_) => {
                DomainErrorKind::Engine(EngineErrorKind::DecryptionFailed)
            }
            _ => DomainErrorKind::Internal(InternalErrorKind::Config(
                "Invalid credentials encryption key".to_string(),
            )),
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}
