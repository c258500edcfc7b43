#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use jsonapi_graph as graph;
pub use jsonapi_reflect as reflect;
pub use jsonapi_utils as utils;
