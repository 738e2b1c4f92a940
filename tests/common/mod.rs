//! Common test utilities
//!
//! This module is shared across all integration tests

pub mod fakes;
pub mod fixtures;

#[allow(unused_imports)]
pub use fakes::{FakeGateway, FakeTransport, Scripted, ScriptedRunner, Sent};
#[allow(unused_imports)]
pub use fixtures::{probe_json, sample_metadata, TEST_CHAT, TEST_MESSAGE, TEST_URL, TEST_VIDEO_ID};
