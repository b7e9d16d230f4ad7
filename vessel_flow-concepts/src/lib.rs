#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]
//! This crate encapsulates concepts which govern the blood-flow model specified by
//! [vessel_flow](https://docs.rs/vessel_flow).
//!
//! Concepts only describe *what* an agent or domain has to provide.
//! Concrete implementations live in `vessel_flow-building-blocks` while the
//! simulation loop which ties everything together lives in `vessel_flow-core`.

mod cycle;
mod domain;
mod errors;
mod interaction;
mod mechanics;
mod policy;

pub use cycle::*;
pub use domain::*;
pub use errors::*;
pub use interaction::*;
pub use mechanics::*;
pub use policy::*;

/// Handy re-exports of all concepts.
pub mod prelude {
    pub use crate::cycle::*;
    pub use crate::domain::*;
    pub use crate::errors::*;
    pub use crate::interaction::*;
    pub use crate::mechanics::*;
    pub use crate::policy::*;
}
