pub mod walk;

pub use walk::{locate_archives, resolve_root};
