#[allow(clippy::module_inception)]
mod id;
mod layout;

pub use id::*;
pub use layout::*;
