//! Cross-cutting helpers

mod io;

pub use io::write_atomic;
