//! App - the handler and the steps it is built from.
//!
//! # Components
//! - **JobHandler**: entry point, one event in, one reported result out
//! - **StackStarter** / **StackPoller**: the two halves of the reconciliation
//! - **TemplateFetcher**: artifact archive → `Template`
//! - **JobReporter**: `JobOutcome` → one `PipelineClient` call
//! - **Decider**: retry or give up on an error

pub mod decision;
pub mod fetcher;
pub mod handler;
pub mod locator;
pub mod poller;
pub mod reporter;
pub mod starter;
pub mod timeout;

pub use self::decision::{Decider, Decision, DefaultDecider};
pub use self::fetcher::TemplateFetcher;
pub use self::handler::JobHandler;
pub use self::locator::find_artifact;
pub use self::poller::StackPoller;
pub use self::reporter::JobReporter;
pub use self::starter::StackStarter;
pub use self::timeout::bounded;
