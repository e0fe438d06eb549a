pub mod bundle;
pub mod import;
pub mod mapping;
pub mod processor;
pub mod reference;
pub mod store;
pub mod summary;
pub mod traits;

pub use processor::{
    MappingProcessor, ProcessingError, ProcessingOutput, ProcessingRequest, ProgressEvent, RunHooks,
};
pub use reference::{ReferenceEntry, ReferenceError, ReferenceIndex};
pub use store::SqliteMappingStore;
pub use summary::MappingSummary;
pub use traits::MappingStore;
