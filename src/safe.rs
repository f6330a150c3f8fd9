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

use crate::{deploy::DeployedWallet, error::Error, utils, Result};
use async_trait::async_trait;
use ethcontract::{prelude::*, transport::DynTransport};

ethcontract::contract!("./artifacts/contracts/GnosisSafe.sol/GnosisSafe.json");

/// Read-only handle onto a deployed (or not yet deployed) Safe.
#[derive(Clone)]
pub struct SafeClient {
  web3: Web3<DynTransport>,
  address: Address,
}

/// Status report of a Safe address. `owners`, `threshold` and `nonce` are
/// left empty/zero when no contract code lives at the address.
#[derive(Clone, Debug)]
pub struct WalletStatus {
  pub address: H160,
  pub deployed: bool,
  pub owners: Vec<H160>,
  pub threshold: u64,
  pub nonce: u64,
}

impl SafeClient {
  pub fn new(web3: &Web3<DynTransport>, address: Option<&str>) -> Result<Self> {
    Ok(Self {
      address: utils::address_or_default(address)?,
      web3: web3.clone(),
    })
  }

  pub fn at(web3: &Web3<DynTransport>, address: H160) -> Self {
    Self {
      web3: web3.clone(),
      address,
    }
  }

  pub fn address(&self) -> H160 {
    self.address
  }

  pub fn set_address(&mut self, address: H160) {
    self.address = address;
  }

  pub async fn is_deployed(&self) -> Result<bool> {
    let code = self.web3.eth().code(self.address, None).await?;
    Ok(!code.0.is_empty())
  }

  // owner/threshold/nonce reads fail with NotFound against a codeless
  // address; callers that want a soft answer go through status()
  async fn require_code(&self) -> Result<()> {
    if !self.is_deployed().await? {
      return Err(Error::NotFound(format!(
        "no contract code at {:?}",
        self.address
      )));
    }
    Ok(())
  }

  pub async fn get_owners(&self) -> Result<Vec<H160>> {
    self.require_code().await?;
    let safe = GnosisSafe::at(&self.web3, self.address);
    let os = safe.get_owners().call().await?;
    Ok(os)
  }

  pub async fn get_threshold(&self) -> Result<u64> {
    self.require_code().await?;
    let safe = GnosisSafe::at(&self.web3, self.address);
    let t = safe.get_threshold().call().await?;
    Ok(t.as_u64())
  }

  pub async fn nonce(&self) -> Result<u64> {
    self.require_code().await?;
    let safe = GnosisSafe::at(&self.web3, self.address);
    let n = safe.nonce().call().await?;
    Ok(n.as_u64())
  }

  pub async fn status(&self) -> Result<WalletStatus> {
    if !self.is_deployed().await? {
      return Ok(WalletStatus {
        address: self.address,
        deployed: false,
        owners: Vec::new(),
        threshold: 0,
        nonce: 0,
      });
    }
    Ok(WalletStatus {
      address: self.address,
      deployed: true,
      owners: self.get_owners().await?,
      threshold: self.get_threshold().await?,
      nonce: self.nonce().await?,
    })
  }
}

#[async_trait]
impl DeployedWallet for SafeClient {
  fn address(&self) -> H160 {
    self.address
  }

  async fn is_deployed(&self) -> Result<bool> {
    SafeClient::is_deployed(self).await
  }

  async fn owners(&self) -> Result<Vec<H160>> {
    self.get_owners().await
  }

  async fn threshold(&self) -> Result<u64> {
    self.get_threshold().await
  }
}
