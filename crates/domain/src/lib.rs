//! DebateBrawl Domain - Core types and pure helpers
//!
//! This crate defines the domain model of the DebateBrawl client layer.
//! All types here are pure Rust with no I/O dependencies.

pub mod debate;
pub mod document;
pub mod error;
pub mod id;
pub mod session;
pub mod site;
pub mod state;
pub mod time;
pub mod toast;
pub mod user;

pub use debate::{DebateResult, UNKNOWN_RESULT_LABEL, format_debate_result};
pub use document::{FieldValue, Fields};
pub use error::{DomainError, DomainResult};
pub use id::{generate_uid, validate_uid};
pub use session::{
    PASSWORD_PROVIDER_ID, SessionCredentials, SessionEvent, SessionHandle, SignInProvider,
    TOKEN_REFRESH_BUFFER_SECONDS,
};
pub use site::{LOCAL_DEVELOPMENT_URL, SiteConfig, get_url};
pub use state::SignInState;
pub use time::{
    MIN_TRIAL_PERIOD_DAYS, Timestamp, calculate_trial_end_unix_timestamp, format_datetime,
    format_datetime_in, format_timestamp, format_timestamp_in, timestamp_to_unix, to_date_time,
    unix_to_timestamp,
};
pub use toast::{
    DISABLE_BUTTON_PARAM, Toast, ToastKind, ToastStatus, encode_uri_component,
    get_error_redirect, get_status_redirect, get_toast_redirect,
};
pub use user::{
    DEFAULT_FREE_DEBATES, REMAINING_FREE_DEBATES_FIELD, USERS_COLLECTION, UserDocument,
    has_remaining_free_debates,
};
