//! # C# Structure Extractor
//!
//! Parses one C# source file and describes every class, struct and record it declares:
//! constructors, methods, properties, guard clauses, and the normalized source of every
//! in-source type the class transitively depends on.
//!
//! ## Architecture
//!
//! ```text
//! path
//!   │
//!   ├──> Loader (path argument or stdin, file text)
//!   │
//!   ├──> Parser (tree-sitter C#)
//!   │
//!   ├──> Semantic Model
//!   │      ├─ Symbol table of declared types (partials merged)
//!   │      ├─ Type binding (namespaces, usings, aliases, core library)
//!   │      └─ Expression typing for `var` locals
//!   │
//!   ├──> Walker (class-like declarations, source order)
//!   │      ├─ Member extraction (constructors, methods, properties)
//!   │      ├─ Guard clause detection
//!   │      └─ Reference collection (memoized, cycle-safe)
//!   │
//!   └──> Output (JSON array on stdout)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use cs_structure_extractor::{Extractor, ExtractorConfig};
//!
//! let mut extractor = Extractor::new(ExtractorConfig::default())?;
//! let classes = extractor.extract_source("Order.cs", "namespace Shop { class Order { } }")?;
//! println!("{}", cs_structure_extractor::output::to_json(&classes, true)?);
//! # Ok::<(), cs_structure_extractor::ExtractError>(())
//! ```

mod collector;
mod config;
mod error;
mod extractor;
mod guards;
pub mod loader;
mod members;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod semantic;
mod syntax;
mod types;
mod walker;

pub use collector::ReferenceCollector;
pub use config::{ExtractionProfile, ExtractorConfig};
pub use error::{ExtractError, Result};
pub use extractor::Extractor;
pub use loader::SourceFile;
pub use normalize::NormalizeOptions;
pub use types::{
    ClassDescriptor, ConstructorDescriptor, ExceptionConditionDescriptor, MethodDescriptor,
    PropertyDescriptor,
};
