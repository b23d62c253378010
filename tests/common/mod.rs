//! Common test utilities for all integration tests.

#![allow(dead_code)]
#![allow(clippy::duplicate_mod)]

pub mod gateway;
