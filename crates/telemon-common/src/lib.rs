//! Types shared between the telemon alert engine and the applications that
//! embed it.

pub mod i18n;
pub mod types;
