//! Query Builder Tests Module
//!
//! Tests for criteria construction, compilation and SQL rendering.
