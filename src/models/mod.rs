//! Records returned by the CallWhiz API and the request bodies sent to it.
//!
//! Records are plain immutable data. Each implements [`Record`](crate::decode::Record)
//! with a static schema that the decoder checks before deserializing. Request types
//! validate their own arguments so bad input fails before any network I/O.

mod agent;
mod call;
mod conversation;
mod credits;
mod phone_number;
mod transcript;
mod usage;
mod webhook;

pub use agent::{
    Agent, AgentStatus, CallStage, CreateAgentRequest, Language, ListAgentsParams, ModelTier,
    UpdateAgentRequest,
};
pub use call::{Call, CallStatus, ListCallsParams, StartCallRequest};
pub use conversation::{ConversationDetail, ConversationSummary, ListConversationsParams};
pub use credits::{Credits, SimpleCredits};
pub use phone_number::PhoneNumber;
pub use transcript::{Recording, Transcript, TranscriptEntry};
pub use usage::{AccountLimits, Usage, UsagePeriod, UsageQuery};
pub use webhook::{
    CreateWebhookRequest, ParameterDefinition, ParameterType, UpdateWebhookRequest, Webhook,
    WebhookAuth, WebhookMethod,
};

use crate::{Error, Result};
use serde::{Deserialize, Deserializer};

/// Defines a closed set of wire strings as a Rust enum.
///
/// Generates serde impls, `VALUES` for schemas, `as_str`, `Display`, and a `FromStr`
/// that fails with a validation error naming `$field`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($field:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $value)] $variant ),+
        }

        impl $name {
            /// Every accepted wire value.
            pub const VALUES: &'static [&'static str] = &[$($value),+];

            /// Returns the wire value.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $value ),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::Error;

            fn from_str(s: &str) -> crate::Result<Self> {
                match s {
                    $( $value => Ok(Self::$variant), )+
                    other => Err(crate::Error::invalid_argument(
                        $field,
                        format!(
                            "unknown value `{}`, expected one of: {}",
                            other,
                            Self::VALUES.join(", ")
                        ),
                    )),
                }
            }
        }
    };
}

pub(crate) use string_enum;

/// Deserializes `null` as `T::default()`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_argument(field, "must not be empty"));
    }
    Ok(())
}

/// Ids are interpolated into paths, so they must be non-empty single segments.
///
/// Dot segments (`.`, `..`) would be resolved away by URL normalization, and `%` could
/// smuggle either one in encoded form, so both are rejected.
pub(crate) fn validate_id(field: &str, id: &str) -> Result<()> {
    require_non_empty(field, id)?;
    let is_dot_segment = id.chars().all(|c| c == '.');
    if is_dot_segment || id.contains(&['/', '\\', '?', '#', '%'][..]) {
        return Err(Error::invalid_argument(
            field,
            format!("`{}` is not a valid identifier", id),
        ));
    }
    Ok(())
}

/// Accepts E.164 numbers: `+` followed by 8 to 15 digits.
pub(crate) fn validate_phone_number(field: &str, number: &str) -> Result<()> {
    let digits = number.strip_prefix('+').unwrap_or("");
    let valid = (8..=15).contains(&digits.len())
        && digits.bytes().all(|b| b.is_ascii_digit())
        && !digits.starts_with('0');
    if !valid {
        return Err(Error::invalid_argument(
            field,
            format!("`{}` is not an E.164 phone number", number),
        ));
    }
    Ok(())
}

pub(crate) fn validate_http_url(field: &str, value: &str) -> Result<()> {
    match url::Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        Ok(url) => Err(Error::invalid_argument(
            field,
            format!("unsupported URL scheme `{}`", url.scheme()),
        )),
        Err(e) => Err(Error::invalid_argument(
            field,
            format!("`{}` is not a valid URL: {}", value, e),
        )),
    }
}

pub(crate) fn validate_paging(page: Option<u32>, limit: Option<u32>) -> Result<()> {
    if page == Some(0) {
        return Err(Error::invalid_argument("page", "pages start at 1"));
    }
    if let Some(limit) = limit {
        if !(1..=100).contains(&limit) {
            return Err(Error::invalid_argument(
                "limit",
                format!("must be between 1 and 100, got {}", limit),
            ));
        }
    }
    Ok(())
}
