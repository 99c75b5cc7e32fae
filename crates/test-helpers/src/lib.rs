// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod authority;
mod mock_engine;
mod require_server;
mod rpc_server;
mod utils;

pub use authority::*;
pub use mock_engine::*;
pub use require_server::*;
pub use rpc_server::*;
pub use utils::*;
