pub mod delete;
pub mod importer;
pub mod kind;
pub mod reconcile;

#[cfg(test)]
mod unit_tests;

pub use delete::{delete_unused_contacts, DeleteReport};
pub use importer::{ImportCounters, ImportReport, Importer};
pub use kind::{ContactImport, ImportKind, RowProblem, ValueImport};
pub use reconcile::reconcile_value;
