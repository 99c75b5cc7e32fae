// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod events;
mod in_mem;
mod into_key;
mod json;
mod sled_store;
mod traits;

pub use events::*;
pub use in_mem::*;
pub use into_key::IntoKey;
pub use json::*;
pub use sled_store::*;
pub use traits::*;
