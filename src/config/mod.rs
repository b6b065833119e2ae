pub mod applicator;
pub mod loader;
pub mod schema;

pub use applicator::{
    apply_patches, preview_patches, run_operation, ApplicationError, ApplyMode, PatchResult,
    StepResults,
};
pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    FontFamily, LinkConfig, FONT_WEIGHT_RANGE, Metadata, Operation, PatchDefinition, ValidationError,
    ValidationIssue,
};
