//! Scenario tests driving whole render units through the public surface,
//! the way compiled template code does.

mod render_tests;
