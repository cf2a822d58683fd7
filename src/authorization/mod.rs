//! Tool authorization pipeline (C8): prioritized filters deciding which
//! tools a session can see and invoke, plus `WWW-Authenticate` challenge
//! construction for denials. See spec.md §4.8 — the most scrutinized
//! part of this crate.

mod aggregator;
mod challenge;
mod context;
mod filter;
mod filters;
mod result;
mod service;

pub use aggregator::ToolFilterAggregator;
pub use challenge::AuthorizationChallenge;
pub use context::ToolAuthorizationContext;
pub use filter::ToolFilter;
pub use filters::{glob_match, AllowAllFilter, RoleRequiredFilter, ToolNamePatternFilter};
pub use result::AuthorizationResult;
pub use service::ToolAuthorizationService;
