//! End-to-end tests for toast, driven through a recording host.

mod scenarios;
