// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod content_key;
mod error;
mod key_file;
mod require_signature;
mod seal;

pub use content_key::*;
pub use error::*;
pub use key_file::*;
pub use require_signature::*;
pub use seal::*;
