//! Unit tests for sas-syntax.
