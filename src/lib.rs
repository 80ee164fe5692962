//! Resource loading and deduplication for embeddable page widgets.
//!

pub use beacon_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use beacon_internal::prelude::*;
}
