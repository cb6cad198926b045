//! Unit tests for the message boundary.
