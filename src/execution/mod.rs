/// Execution Layer
///
/// Turns a solved plan into ordered bundle legs for the transaction layer.
/// Signing, gas pricing and broadcast live outside this crate behind
/// [`BundleSubmitter`].

pub mod bundle;

pub use bundle::{BundleLeg, BundleSubmitter, LegKind, SandwichBundle};
