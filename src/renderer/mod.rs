//! Presentation of the CPU canvas through wgpu.

pub mod pipeline_builder;
pub mod presenter;

pub use presenter::Presenter;
