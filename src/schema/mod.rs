//! Schema subsystem for paramgrid
//!
//! Labels and parameters are declared once, up front, and never change.
//!
//! # Design Principles
//!
//! - Declarations are parsed into closed, typed records
//! - Every label has a finite, ordered domain
//! - At most one label is the extend dimension
//! - Raw values are coerced to declared types at the parsing boundary
//! - Every schema error is fatal

mod decl;
mod errors;
mod label;
mod param;
mod registry;
mod types;
mod validator;

pub use decl::{ChoiceDecl, LabelDecl, OperatorsDecl, ParamDecl, RangeDecl, SchemaDecl, ValidatorsDecl, WhenDecl};
pub use errors::{SchemaError, SchemaErrorCode, SchemaResult};
pub use label::{LabelDef, MAX_DOMAIN_SIZE};
pub use param::{DefaultRecord, ParamDef};
pub use registry::{Operators, SchemaRegistry};
pub use types::{CoercionError, ParamValue, Scalar, ValueType};
pub use validator::{Bound, BoundSource, Condition, Level, Validator, Violation, ViolationKind};

pub(crate) use types::display_raw;
