// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! LLM module for doqq
//!
//! Turn types and the transport abstraction over the chat endpoint.

pub mod message;
pub mod mock_transport;
pub mod provider;
pub mod providers;

pub use message::*;
pub use provider::*;
