//! Unit tests for sas-pattern.

mod round_trip_tests;
