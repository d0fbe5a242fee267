// SPDX-License-Identifier: MPL-2.0
//! Headless UI state.
//!
//! Nothing here draws. The host toolkit renders from the state these types
//! expose and feeds user gestures back in.
//!
//! - [`controls`] - Transport controls, auto-hide, quality and rate menus
//! - [`notifications`] - Dismissible notifications for user feedback

pub mod controls;
pub mod notifications;
