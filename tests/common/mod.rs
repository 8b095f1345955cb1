#![allow(dead_code)]

pub use assetflow_test_utils::*;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;
