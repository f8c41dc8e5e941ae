//! Agent tests
