pub mod errors;
pub mod http;
pub mod resolver;
pub mod source;
pub mod sources;

pub use errors::{SourceError, SpecError, Unavailable};
pub use resolver::QuoteResolver;
pub use source::QuoteSource;
pub use sources::SourceSpec;
