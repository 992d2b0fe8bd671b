//! Emergency calling.
//!
//! Placing a call is delegated to a [`Dialer`]. The [`EmergencyLine`] never
//! surfaces a dial failure as an error: it returns
//! [`CallOutcome::ManualDial`] so the caller can show the number to dial by
//! hand.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::EmergencyConfig;

/// Emergency number used when none is configured.
pub const DEFAULT_EMERGENCY_NUMBER: &str = "110";

/// Accepted shape of a dialable number.
const PHONE_NUMBER_PATTERN: &str = r"^\+?[0-9*#]{2,15}$";

/// Errors that can occur while placing a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TelephonyError {
    /// This platform has no way to place calls.
    #[error("this platform cannot place phone calls")]
    Unsupported,

    /// The number is not dialable.
    #[error("invalid phone number '{0}'")]
    InvalidNumber(String),

    /// The dialer could not be launched.
    #[error("failed to launch dialer: {0}")]
    Launch(String),

    /// The dialer ran but reported failure.
    #[error("dialer failed: {0}")]
    DialerFailed(String),

    /// The dialer did not finish in time.
    #[error("dialer did not respond within {0:?}")]
    Timeout(Duration),
}

/// A named emergency contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Short identifier used on the command line (e.g. `fire`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Number to dial.
    pub number: String,
    /// What this service handles.
    pub description: String,
}

impl Contact {
    /// Create a new contact.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        number: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            number: number.into(),
            description: description.into(),
        }
    }
}

/// The built-in emergency contacts.
#[must_use]
pub fn default_contacts() -> Vec<Contact> {
    vec![
        Contact::new(
            "general",
            "General emergencies",
            DEFAULT_EMERGENCY_NUMBER,
            "Police, fire brigade, ambulance",
        ),
        Contact::new("fire", "Fire brigade", "119", "Fires and rescues"),
        Contact::new("red_cross", "Red Cross", "165", "Medical emergencies"),
        Contact::new("traffic", "Traffic police", "122", "Traffic accidents"),
    ]
}

/// Check whether a string looks like a dialable phone number.
#[must_use]
pub fn is_valid_phone_number(number: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(PHONE_NUMBER_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(number))
}

/// Platform capability for placing phone calls.
#[async_trait::async_trait]
pub trait Dialer: Send + Sync + std::fmt::Debug {
    /// Name of this dialer, for logging.
    fn name(&self) -> &'static str;

    /// Ask the platform to call `number`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform cannot place the call.
    async fn dial(&self, number: &str) -> Result<(), TelephonyError>;
}

/// A dialer for platforms that cannot place calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedDialer;

#[async_trait::async_trait]
impl Dialer for UnsupportedDialer {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    async fn dial(&self, _number: &str) -> Result<(), TelephonyError> {
        Err(TelephonyError::Unsupported)
    }
}

/// What happened when a call was requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    /// The platform accepted the call.
    Placed {
        /// The number being called.
        number: String,
    },
    /// The call could not be placed; the user must dial by hand.
    ManualDial {
        /// The number to dial.
        number: String,
        /// Why the call failed.
        reason: String,
    },
}

impl CallOutcome {
    /// The number involved.
    #[must_use]
    pub fn number(&self) -> &str {
        match self {
            Self::Placed { number } | Self::ManualDial { number, .. } => number,
        }
    }

    /// Whether the call was placed.
    #[must_use]
    pub fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }

    /// A message suitable for showing to the user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Placed { number } => format!("Calling {number}..."),
            Self::ManualDial { number, reason } => {
                format!("The call could not be placed ({reason}). Please dial {number} manually.")
            }
        }
    }
}

/// The configured emergency number and contacts, plus a dialer.
#[derive(Debug, Clone)]
pub struct EmergencyLine {
    number: String,
    contacts: Vec<Contact>,
    dialer: Arc<dyn Dialer>,
}

impl EmergencyLine {
    /// Create an emergency line.
    #[must_use]
    pub fn new(number: impl Into<String>, contacts: Vec<Contact>, dialer: Arc<dyn Dialer>) -> Self {
        Self {
            number: number.into(),
            contacts,
            dialer,
        }
    }

    /// Create an emergency line from configuration.
    #[must_use]
    pub fn from_config(config: &EmergencyConfig, dialer: Arc<dyn Dialer>) -> Self {
        Self::new(config.number.clone(), config.contacts.clone(), dialer)
    }

    /// The main emergency number.
    #[must_use]
    pub fn number(&self) -> &str {
        &self.number
    }

    /// All configured contacts.
    #[must_use]
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// Find a contact by id, ignoring case.
    #[must_use]
    pub fn contact(&self, id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id.eq_ignore_ascii_case(id))
    }

    /// Call the main emergency number.
    pub async fn call_emergency_number(&self) -> CallOutcome {
        self.call(&self.number).await
    }

    /// Call an arbitrary number.
    pub async fn call(&self, number: &str) -> CallOutcome {
        let result = if is_valid_phone_number(number) {
            self.dialer.dial(number).await
        } else {
            Err(TelephonyError::InvalidNumber(number.to_string()))
        };

        match result {
            Ok(()) => {
                info!(number, dialer = self.dialer.name(), "Emergency call placed");
                CallOutcome::Placed {
                    number: number.to_string(),
                }
            }
            Err(err) => {
                warn!(number, dialer = self.dialer.name(), error = %err, "Emergency call failed");
                CallOutcome::ManualDial {
                    number: number.to_string(),
                    reason: err.to_string(),
                }
            }
        }
    }
}
