pub mod scatter;

pub use scatter::ScatterPlugin;
