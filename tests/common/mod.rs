#![allow(dead_code)]

pub mod stack;

pub use mock_server::{Reply, TestServer};
pub use stack::Stack;
