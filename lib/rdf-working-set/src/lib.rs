#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod store;

pub mod model {
    pub use rdf_working_set_model::*;
}

pub mod error {
    pub use rdf_working_set_common::error::*;
}

pub mod storage {
    pub use rdf_working_set_storage::*;
}

pub use rdf_working_set_common::{DeleteBehaviour, StoreConfig};
