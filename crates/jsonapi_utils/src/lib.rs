#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod hash;
pub mod index;
pub mod inflect;

// -----------------------------------------------------------------------------
// Top-level exports

pub use index::IndexSet;
pub use inflect::{English, Inflector};
