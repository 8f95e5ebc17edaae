//! Test suites for the line server.

mod support;
