// src/order/mod.rs

//! Dependency-aware ordering of compiled scripts.
//!
//! [`scanner`] extracts each file's module identity and dependencies;
//! [`sort`] turns those into a stable topological load order.

pub mod scanner;
pub mod sort;

pub use scanner::{AngularModuleScanner, CompiledScriptUnit, ModuleScanner};
pub use sort::{order, order_units};
