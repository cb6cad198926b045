//! Unit tests for the task module.

mod progress_tests;
