pub mod lookup;
pub mod merge;
pub mod model;

pub use lookup::{load_lookup_or_warn, LookupEntry, RequirementLookup};
pub use merge::{merge, FlatRow, MergedTable, RowStatus};
pub use model::{Issue, Requirement, ValidationReport, ValidatorResult};
