// Copyright 2025 Semantic Network Ltd.
// This file is part of safeth.

// safeth is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// safeth is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with safeth.  If not, see <http://www.gnu.org/licenses/>.

use crate::Result;
use ethcontract::prelude::{Address, H160};
use std::str::FromStr;

pub fn zero_address() -> Address {
  "0x0000000000000000000000000000000000000000"
    .parse()
    .unwrap()
}

pub fn address_or_default(address: Option<&str>) -> Result<H160> {
  if let Some(a) = address {
    Ok(H160::from_str(a)?)
  } else {
    Ok(zero_address())
  }
}

pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
  use tiny_keccak::{Hasher, Keccak};
  let mut output = [0u8; 32];
  let mut hasher = Keccak::v256();
  hasher.update(bytes);
  hasher.finalize(&mut output);
  output
}

/// CREATE2 address: `keccak256(0xff ++ deployer ++ salt ++ init_code_hash)[12..]`.
pub fn create2_address(deployer: H160, salt: [u8; 32], init_code_hash: [u8; 32]) -> H160 {
  let mut buf = Vec::with_capacity(85);
  buf.push(0xffu8);
  buf.extend_from_slice(deployer.as_bytes());
  buf.extend_from_slice(&salt);
  buf.extend_from_slice(&init_code_hash);
  H160::from_slice(&keccak256(&buf)[12..])
}
