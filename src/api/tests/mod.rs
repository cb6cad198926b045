//! Unit tests for the API facade and ingestion.

mod ingest_tests;
