//! leadcapture - Landing page lead capture
//!
//! Validates the contact form, delivers leads to a webhook and keeps the ones
//! that could not be delivered in a local queue until they are resent.

#[cfg(feature = "browser")]
pub mod browser;
#[cfg(feature = "native")]
pub mod cli;
pub mod core;
