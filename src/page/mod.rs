//! HTML page overlay: transitions, the DOM seam and fragment fetching.

pub mod fetch;
pub mod loader;
pub mod surface;
pub mod token;

pub use fetch::{FetchResult, FragmentFetcher};
pub use loader::{CompletionOutcome, LoadRequest, PageLoader};
pub use surface::{DomOp, DomSnapshot, ElementState, PageSurface};
pub use token::{LoadToken, LoadTokenSource};
