//! Helper functions behind the template filters and shortcodes
//!
//! Everything here is a pure transformation; the hook wrappers in
//! `crate::registry` adapt these to template values.

mod date;
mod html;
mod list;

pub use date::*;
pub use html::*;
pub use list::*;
