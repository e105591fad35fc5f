//! Page boundary for the UITrail capture agent.
//!
//! Exposes the minimal capability surface the upper layers need from a
//! live browser page (navigate, read, act, capture) behind the
//! [`PageDriver`] trait, plus a Chromium-backed implementation driven
//! over the DevTools protocol.

pub mod config;
pub mod driver;
pub mod error;
pub mod session;

pub use config::PageConfig;
pub use driver::PageDriver;
pub use error::PageError;
pub use session::ChromiumPage;

pub type PageResult<T> = Result<T, PageError>;
