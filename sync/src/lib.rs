#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg, doc_cfg_hide))]
#![cfg_attr(docsrs, doc(cfg_hide(docsrs, loom)))]
#![warn(missing_docs, missing_debug_implementations)]

pub(crate) mod loom;

#[macro_use]
pub(crate) mod util;

pub mod blocking;
pub mod onoff;

#[doc(inline)]
pub use self::onoff::OnOffSwitch;
