//! Headless Chromium automation for the capture loop.
//!
//! # Module Structure
//!
//! - [`session`] - Browser process launch and shutdown
//! - [`page`] - The capture page: navigation, load status, rendering
//! - [`events`] - Console, script error and resource failure relay
//! - [`net_error`] - Chromium `net::ERR_*` code table
//!
//! # Example
//!
//! ```no_run
//! use sitecap_lib::{stdout_sink, BrowserOptions, BrowserSession, ChromePage, Viewport};
//! use std::time::Duration;
//!
//! # async fn example() -> sitecap_lib::Result<()> {
//! let session = BrowserSession::launch(&BrowserOptions::default()).await?;
//! let page = session.new_page().await?;
//! let page = ChromePage::attach(
//!     page,
//!     Viewport::default(),
//!     Duration::from_secs(30),
//!     false,
//!     stdout_sink(),
//! )
//! .await?;
//! # drop(page);
//! # Ok(())
//! # }
//! ```

mod events;
mod net_error;
mod page;
mod session;

pub use events::{exception_message, remote_value_text, PageEvent};
pub use net_error::{is_timeout, net_error_code};
pub use page::ChromePage;
pub use session::{BrowserOptions, BrowserSession, DEFAULT_REQUEST_TIMEOUT};
