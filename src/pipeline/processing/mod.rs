// Pipeline processing: schema preparation, field normalization, address decomposition and merging

pub mod address;
pub mod merge;
pub mod normalize;
pub mod reference;
pub mod schema;
pub mod text;

pub use address::{AddressComponents, AddressDecomposer, Decomposition, UnresolvedLookup};
pub use merge::{ConflictPolicy, ColumnPolicies, MergeOutcome, RecordMerger};
pub use reference::ReferenceData;
