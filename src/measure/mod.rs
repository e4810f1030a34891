//! Timing, allocation accounting and iteration calibration.

mod allocator;
mod bencher;
mod calibrate;
mod result;

pub use allocator::{AllocSnapshot, TrackingAllocator};
pub use bencher::{Bencher, Measure};
pub use calibrate::{MeasureSettings, predict_iterations, run_benchmark};
pub use result::BenchResult;
