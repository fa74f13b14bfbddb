// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! System models.
//!
//! The producer ([RootComplex](crate::root_complex::RootComplex)), the
//! consumer ([Endpoint](crate::endpoint::Endpoint)) and the
//! [topology builders](crate::topology) that wire them together either
//! directly or through the credit tunnel.

pub mod endpoint;
pub mod root_complex;
pub mod topology;
