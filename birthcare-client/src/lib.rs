//! birthcare-client - typed HTTP client for the birthcare REST API
//!
//! Besides one method per endpoint, this crate carries the list, search and
//! cancellation plumbing shared by the console screens.

pub mod approval;
pub mod birth_details;
pub mod client;
pub mod debounce;
pub mod documents;
pub mod error;
pub mod resource;
pub mod scope;

pub use approval::submit_rejection;
pub use birth_details::{save_birth_details, SaveFailure, SaveOutcome};
pub use client::{ApiClient, ClientConfig, DocumentUpload};
pub use debounce::SearchDebouncer;
pub use documents::{DocumentRenderer, RenderedDocument, SummaryRenderer};
pub use error::{ClientError, Result};
pub use resource::PaginatedResource;
pub use scope::{FetchScope, ScopeToken};
