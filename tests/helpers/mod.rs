#![allow(dead_code)]

pub mod flaky_repo;
pub mod mock_config;
