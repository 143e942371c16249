//! Rendering: the [`surface::Surface`] abstraction and its `vello_cpu` implementation.

pub(crate) mod blur;
pub(crate) mod composite;
/// CPU raster surface.
pub mod cpu;
/// Drawing surface trait and paint/text state.
pub mod surface;
