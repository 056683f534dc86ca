#![forbid(unsafe_code)]

//! Headless pan/zoom viewport and shape binding for inlined org-chart diagrams.
//!
//! The crate models two cooperating pieces of a cartography viewer:
//! - [`viewport::ViewportController`]: owns scale + pan over a fixed-size content surface and
//!   turns drag, wheel and button input into `translate(..) scale(..)` updates
//! - [`binder::ShapeBinder`]: scans an inlined diagram for shapes carrying an embedded
//!   identifier and binds them to activity ids from an [`IdentifierMap`]
//!
//! Nothing here performs I/O; the host supplies measurements through
//! [`viewport::ViewportSurface`] and receives transforms back.

pub mod annotate;
pub mod binder;
pub mod config;
pub mod dimensions;
pub mod error;
pub mod geom;
pub mod gesture;
pub mod identifier;
pub mod transform;
pub mod viewport;

pub use roxmltree;
pub use roxmltree::NodeId;

pub use binder::{BindingSet, Diagram, ShapeBinder, ShapeBinding};
pub use config::{BinderConfig, CartographyConfig, NavigationConfig, ViewportConfig};
pub use error::{Error, Result};
pub use gesture::PointerGesture;
pub use identifier::{ActivityId, IdentifierMap, IdentifierStrategy};
pub use transform::ContentTransform;
pub use viewport::{
    Control, Controls, FitOutcome, FixedSurface, ViewportController, ViewportState,
    ViewportSurface, ZoomDirection,
};
