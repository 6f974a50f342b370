pub mod scene;
pub mod time;
pub mod timer;
#[cfg(feature = "physics")]
pub mod physics;
#[cfg(feature = "physics")]
pub mod pool;
