// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for `trx-playlist`: turning the failed tests of a TRX test report into a
//! Visual Studio playlist that reruns exactly those tests.
//!
//! The pipeline runs in stages, each in its own module:
//!
//! 1. [`document`] parses the report text into an element tree.
//! 2. [`report`] collects outcome records and execution records from it.
//! 3. [`outcome`] filters the outcome records down to failures.
//! 4. [`resolve`] correlates each failure with its execution record by identifier.
//! 5. [`hierarchy`] derives the project, namespace, class and display name of each failed test.
//! 6. [`rules`] compiles the failed tests into a rule tree.
//! 7. [`serialize`] writes the rule tree as a playlist.
//!
//! [`convert::Converter`] drives the whole pipeline.

pub mod config;
pub mod convert;
pub mod document;
pub mod errors;
pub mod hierarchy;
pub mod outcome;
pub mod report;
pub mod resolve;
pub mod rules;
pub mod serialize;
