#![forbid(unsafe_code)]

//! `cartograph` drives the cartography page of an org-chart wizard headlessly.
//!
//! It fetches the diagram once, inlines it, binds shapes to activities and hands user input to
//! the pan/zoom viewport. Clicking a bound shape yields a [`Navigation`] to the activity page.
//!
//! The building blocks live in `cartograph-core` and are re-exported here.

pub use cartograph_core::*;

pub mod error;
pub mod navigation;
pub mod page;
pub mod source;

pub use error::PageError;
pub use navigation::{Navigation, activity_url};
pub use page::{CartographyPage, PageState};
pub use source::{DiagramResponse, DiagramSource, FileSource, StaticSource};
