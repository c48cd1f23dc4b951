//! Helper functions shared by the renderers
//!
//! URL building, date formatting and the small HTML builders used when
//! serializing rich text.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use self::url::*;
