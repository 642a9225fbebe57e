#![cfg(test)]

pub mod common;
pub mod isolation_tests;
pub mod session_tests;
