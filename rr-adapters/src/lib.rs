//! Route optimizer adapters for RobotReplay

pub mod demo;
pub mod http;

pub use demo::DemoOptimizer;
pub use http::HttpOptimizer;
