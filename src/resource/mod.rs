//! Resource abstraction layer
//!
//! Every catalogue resource is described by data rather than code: one
//! [`ResourceDef`] per record type, loaded from embedded JSON.
//!
//! # Architecture
//!
//! - `registry` - Loads and validates resource descriptors
//! - [`form`] - Form state plus row/form/payload transforms
//! - [`cell`] - Table cell rendering, row titles and lookup labels
//! - [`search`] - Client-side free-text filtering
//!
//! # Example
//!
//! ```ignore
//! use tkino::resource::get_resource;
//!
//! let actor = get_resource("actor").unwrap();
//! let mut form = actor.make_empty();
//! actor.edit_text(&mut form, "full_name", "Jane Doe".into());
//! assert!(actor.validate(&actor.to_payload(&form)).is_ok());
//! ```

pub mod cell;
pub mod form;
mod registry;
pub mod search;

pub use cell::{render_cell, row_id, Lookups};
pub use form::{to_slug, FieldValue, FormInput, FormState, InputKind, SelectOption, ValidationError};
pub use registry::*;
pub use search::filter_rows;
