//! Integration tests for Article Harvest

mod harvest_tests;
