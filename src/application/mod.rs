// SPDX-License-Identifier: MPL-2.0
//! Application layer: the ports the engine is written against.

pub mod port;
