//! 基础组件

pub mod float;
mod ring_buffer;

pub use float::{approx_eq, approx_eq_eps, slice_approx_eq, EPSILON};
pub use ring_buffer::{RingBuffer, RingBufferIter};
