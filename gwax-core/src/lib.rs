//! gwax-core: shared data structures, configuration, and I/O for the gwax toolkit.

pub mod columns;
pub mod config;
pub mod error;
pub mod table;

pub use columns::{pick_column, ColumnChoice};
pub use config::{RunConfig, SignificanceThresholds, ID_KEYWORDS, MISSING_PHENOTYPE};
pub use error::PipelineError;
pub use table::AssociationTable;
