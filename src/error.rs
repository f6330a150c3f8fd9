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

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("web3 error: {0}")]
  Web3Error(#[from] ethcontract::web3::Error),
  #[error("contract error: {0}")]
  MethodError(#[from] ethcontract::errors::MethodError),
  #[error("execution error: {0}")]
  ExecutionError(#[from] ethcontract::errors::ExecutionError),
  #[error("abi error: {0}")]
  AbiError(#[from] ethcontract::web3::ethabi::Error),
  #[error("hex error: {0}")]
  HexError(#[from] hex::FromHexError),
  #[error("hex error: {0}")]
  CHexError(#[from] rustc_hex::FromHexError),
  #[error("invalid owner set: {0}")]
  Config(String),
  #[error("submission rejected: {0}")]
  Submission(String),
  #[error("ConfirmationTimeout: {0}")]
  ConfirmationTimeout(String),
  #[error("verification query failed: {0}")]
  Verification(String),
  #[error("not found: {0}")]
  NotFound(String),
  #[error("error: {0}")]
  Other(String),
}

impl From<&str> for Error {
  fn from(err: &str) -> Self {
    Error::Other(err.to_string())
  }
}
impl From<String> for Error {
  fn from(err: String) -> Self {
    Error::Other(err)
  }
}
