// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Entry Point
//!
//! This test suite uses proptest to verify properties of stack composition
//! that must hold for every configuration, valid or not.

mod property;
