#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg, doc_cfg_hide))]
#![cfg_attr(docsrs, doc(cfg_hide(docsrs, loom)))]
#![warn(missing_docs, missing_debug_implementations)]

#[macro_use]
mod util;

pub(crate) mod loom;

pub mod error;
pub mod ops;
pub mod request;
pub mod stats;

#[doc(inline)]
pub use self::error::RequestError;
#[doc(inline)]
pub use self::ops::{cancel_all, poll_any, wait_all, wait_any};
#[doc(inline)]
pub use self::request::{IoKind, IoRequest, Request, State, Waiter, WaiterSet};
pub use hyphae_sync::OnOffSwitch;
