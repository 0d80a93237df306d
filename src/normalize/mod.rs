//! Text canonicalization shared by the rule engine and the classifiers.
//!
//! Every comment is reduced to a [`CanonicalText`] before it is scored or
//! fed to a model. The pipeline a model was trained with is recorded in its
//! artifact, and inference rebuilds the same [`Normalizer`] from that record.
//! Rule scoring always uses the basic form.

pub mod normalizer;

pub use normalizer::{
    CanonicalText, NUM_PLACEHOLDER, NormalizerKind, Normalizer, URL_PLACEHOLDER, decode_utf8,
};
