//! Built-in generators.

mod ir_snapshot;
mod usecase_docs;

pub use ir_snapshot::IrSnapshotGenerator;
pub use usecase_docs::UsecaseDocsGenerator;
