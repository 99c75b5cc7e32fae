// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

mod authority;
mod error;
mod oracle;
mod record;

pub use authority::*;
pub use error::*;
pub use oracle::*;
pub use record::*;
