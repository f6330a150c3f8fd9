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

//! Counterfactual deployment workflow: predict the address of a Safe from
//! its owner configuration, broadcast the deployment transaction, then check
//! that the live wallet matches the prediction.

use crate::{error::Error, Result};
use async_trait::async_trait;
use ethcontract::web3::types::{H160, H256, U256};
use std::time::Duration;

/// Owners and signing threshold of a Safe. `new` is the only constructor and
/// enforces `1 <= threshold <= owners.len()` with unique owners.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnerSet {
  owners: Vec<H160>,
  threshold: u64,
}

impl OwnerSet {
  pub fn new(owners: Vec<H160>, threshold: u64) -> Result<Self> {
    if owners.is_empty() {
      return Err(Error::Config("owner set is empty".to_string()));
    }
    for (i, owner) in owners.iter().enumerate() {
      if owners[..i].contains(owner) {
        return Err(Error::Config(format!("duplicate owner {:?}", owner)));
      }
    }
    if threshold < 1 || threshold > owners.len() as u64 {
      return Err(Error::Config(format!(
        "threshold {} not in 1..={}",
        threshold,
        owners.len()
      )));
    }
    Ok(Self { owners, threshold })
  }

  pub fn owners(&self) -> &[H160] {
    &self.owners
  }

  pub fn threshold(&self) -> u64 {
    self.threshold
  }
}

/// Raw transaction payload that instantiates the wallet.
#[derive(Clone, Debug, PartialEq)]
pub struct DeploymentTx {
  pub to: H160,
  pub value: U256,
  pub data: Vec<u8>,
}

/// A wallet that does not exist on chain yet. The address is fixed by the
/// owner set and salt nonce; funds may be sent to it before deployment.
#[derive(Clone, Debug)]
pub struct PredictedWallet {
  pub owner_set: OwnerSet,
  pub salt_nonce: U256,
  pub address: H160,
  pub tx: DeploymentTx,
}

#[derive(Clone, Debug)]
pub struct DeploymentReceipt {
  pub tx_hash: H256,
  pub block_number: u64,
  pub success: bool,
}

/// Outcome of comparing the live wallet against its prediction. A mismatch
/// is reported here as data, never as an error.
#[derive(Clone, Debug)]
pub struct VerificationResult {
  pub deployed: bool,
  pub owners_match: bool,
  pub threshold_match: bool,
  pub observed_owners: Vec<H160>,
  pub observed_threshold: u64,
  pub tx_hash: H256,
}

impl VerificationResult {
  pub fn matches(&self) -> bool {
    self.deployed && self.owners_match && self.threshold_match
  }
}

/// Read handle onto a wallet address.
#[async_trait]
pub trait DeployedWallet {
  fn address(&self) -> H160;
  async fn is_deployed(&self) -> Result<bool>;
  async fn owners(&self) -> Result<Vec<H160>>;
  async fn threshold(&self) -> Result<u64>;
}

/// Derives deterministic wallet addresses and builds deployment payloads.
/// `derive_address` may read chain state (the factory's proxy creation code)
/// but must not mutate it.
#[async_trait]
pub trait WalletFactory {
  type Wallet: DeployedWallet;

  async fn derive_address(&self, owner_set: &OwnerSet, salt_nonce: U256) -> Result<H160>;
  async fn deployment_tx(&self, owner_set: &OwnerSet, salt_nonce: U256) -> Result<DeploymentTx>;
  fn attach(&self, address: H160) -> Self::Wallet;
}

/// Broadcasts prepared transactions and waits for inclusion.
#[async_trait]
pub trait ChainClient {
  async fn send_transaction(&self, tx: &DeploymentTx) -> Result<H256>;
  async fn wait_for_receipt(&self, tx_hash: H256, timeout: Duration) -> Result<DeploymentReceipt>;
}

pub struct CounterfactualDeployer<F, C> {
  factory: F,
  chain: C,
  confirm_timeout: Duration,
}

impl<F: WalletFactory, C: ChainClient> CounterfactualDeployer<F, C> {
  pub fn new(factory: F, chain: C, confirm_timeout: Duration) -> Self {
    Self {
      factory,
      chain,
      confirm_timeout,
    }
  }

  /// Compute the future address of `owner_set` and the transaction that will
  /// deploy it there. No chain mutation.
  pub async fn predict(&self, owner_set: OwnerSet, salt_nonce: U256) -> Result<PredictedWallet> {
    let address = self.factory.derive_address(&owner_set, salt_nonce).await?;
    let tx = self.factory.deployment_tx(&owner_set, salt_nonce).await?;
    log::info!("predicted safe address {:?}", address);
    Ok(PredictedWallet {
      owner_set,
      salt_nonce,
      address,
      tx,
    })
  }

  /// Broadcast the deployment transaction and wait for block inclusion.
  /// Inclusion only; finality is the caller's concern.
  pub async fn deploy(&self, wallet: &PredictedWallet) -> Result<DeploymentReceipt> {
    let tx_hash = self.chain.send_transaction(&wallet.tx).await?;
    log::info!("deployment submitted {:?}", tx_hash);
    let receipt = self
      .chain
      .wait_for_receipt(tx_hash, self.confirm_timeout)
      .await?;
    log::info!("deployment included in block {}", receipt.block_number);
    Ok(receipt)
  }

  /// Re-attach at the predicted address and compare the live owners and
  /// threshold against the prediction. Owner comparison ignores order.
  pub async fn verify(
    &self,
    wallet: &PredictedWallet,
    receipt: &DeploymentReceipt,
  ) -> Result<VerificationResult> {
    let handle = self.factory.attach(wallet.address);
    let deployed = handle
      .is_deployed()
      .await
      .map_err(|e| Error::Verification(e.to_string()))?;
    if !deployed {
      return Ok(VerificationResult {
        deployed: false,
        owners_match: false,
        threshold_match: false,
        observed_owners: Vec::new(),
        observed_threshold: 0,
        tx_hash: receipt.tx_hash,
      });
    }
    let observed_owners = handle
      .owners()
      .await
      .map_err(|e| Error::Verification(e.to_string()))?;
    let observed_threshold = handle
      .threshold()
      .await
      .map_err(|e| Error::Verification(e.to_string()))?;
    let owners_match = same_owner_set(&observed_owners, wallet.owner_set.owners());
    let threshold_match = observed_threshold == wallet.owner_set.threshold();
    Ok(VerificationResult {
      deployed,
      owners_match,
      threshold_match,
      observed_owners,
      observed_threshold,
      tx_hash: receipt.tx_hash,
    })
  }

  pub fn attach(&self, address: H160) -> F::Wallet {
    self.factory.attach(address)
  }
}

fn same_owner_set(a: &[H160], b: &[H160]) -> bool {
  let mut a = a.to_vec();
  let mut b = b.to_vec();
  a.sort();
  b.sort();
  a == b
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::utils;
  use std::collections::HashMap;
  use std::sync::{Arc, Mutex};

  fn addr(n: u8) -> H160 {
    H160::from_low_u64_be(n as u64)
  }

  fn owner_set(ns: &[u8], threshold: u64) -> OwnerSet {
    OwnerSet::new(ns.iter().map(|n| addr(*n)).collect(), threshold).expect("valid owner set")
  }

  #[derive(Default)]
  struct Ledger {
    // address -> (owners, threshold)
    deployed: HashMap<H160, (Vec<H160>, u64)>,
    sent: Vec<DeploymentTx>,
  }

  // a factory whose "create2" is a keccak over owners ++ threshold ++ salt,
  // with the deployment payload carrying the config so the fake chain can
  // instantiate it
  struct FakeFactory {
    ledger: Arc<Mutex<Ledger>>,
  }

  impl FakeFactory {
    fn derive(owner_set: &OwnerSet, salt_nonce: U256) -> H160 {
      let mut buf = Vec::new();
      for owner in owner_set.owners() {
        buf.extend_from_slice(owner.as_bytes());
      }
      buf.extend_from_slice(&owner_set.threshold().to_be_bytes());
      let mut salt = [0u8; 32];
      salt_nonce.to_big_endian(&mut salt);
      buf.extend_from_slice(&salt);
      H160::from_slice(&utils::keccak256(&buf)[12..])
    }
  }

  #[async_trait]
  impl WalletFactory for FakeFactory {
    type Wallet = FakeWallet;

    async fn derive_address(&self, owner_set: &OwnerSet, salt_nonce: U256) -> Result<H160> {
      Ok(Self::derive(owner_set, salt_nonce))
    }

    async fn deployment_tx(&self, owner_set: &OwnerSet, salt_nonce: U256) -> Result<DeploymentTx> {
      let mut data = vec![owner_set.threshold() as u8];
      for owner in owner_set.owners() {
        data.extend_from_slice(owner.as_bytes());
      }
      Ok(DeploymentTx {
        to: Self::derive(owner_set, salt_nonce),
        value: 0.into(),
        data,
      })
    }

    fn attach(&self, address: H160) -> FakeWallet {
      FakeWallet {
        ledger: self.ledger.clone(),
        address,
      }
    }
  }

  struct FakeWallet {
    ledger: Arc<Mutex<Ledger>>,
    address: H160,
  }

  #[async_trait]
  impl DeployedWallet for FakeWallet {
    fn address(&self) -> H160 {
      self.address
    }

    async fn is_deployed(&self) -> Result<bool> {
      Ok(self.ledger.lock().unwrap().deployed.contains_key(&self.address))
    }

    async fn owners(&self) -> Result<Vec<H160>> {
      match self.ledger.lock().unwrap().deployed.get(&self.address) {
        Some((owners, _)) => Ok(owners.clone()),
        None => Err(Error::NotFound(format!("no code at {:?}", self.address))),
      }
    }

    async fn threshold(&self) -> Result<u64> {
      match self.ledger.lock().unwrap().deployed.get(&self.address) {
        Some((_, threshold)) => Ok(*threshold),
        None => Err(Error::NotFound(format!("no code at {:?}", self.address))),
      }
    }
  }

  struct FakeChain {
    ledger: Arc<Mutex<Ledger>>,
    confirm: bool,
    // deploy with a different threshold than requested, to simulate a
    // misconfigured factory version
    tamper: bool,
  }

  #[async_trait]
  impl ChainClient for FakeChain {
    async fn send_transaction(&self, tx: &DeploymentTx) -> Result<H256> {
      let threshold = tx.data[0] as u64;
      // stored reversed so verification has to treat owners as a set
      let owners: Vec<H160> = tx.data[1..].chunks(20).rev().map(H160::from_slice).collect();
      let mut ledger = self.ledger.lock().unwrap();
      ledger.sent.push(tx.clone());
      if self.confirm {
        let threshold = if self.tamper { threshold + 1 } else { threshold };
        ledger.deployed.insert(tx.to, (owners, threshold));
      }
      Ok(H256::from(utils::keccak256(&tx.data)))
    }

    async fn wait_for_receipt(&self, tx_hash: H256, timeout: Duration) -> Result<DeploymentReceipt> {
      if !self.confirm {
        return Err(Error::ConfirmationTimeout(format!(
          "no receipt for {:?} after {:?}",
          tx_hash, timeout
        )));
      }
      Ok(DeploymentReceipt {
        tx_hash,
        block_number: 1,
        success: true,
      })
    }
  }

  fn deployer(
    confirm: bool,
    tamper: bool,
  ) -> (CounterfactualDeployer<FakeFactory, FakeChain>, Arc<Mutex<Ledger>>) {
    let ledger = Arc::new(Mutex::new(Ledger::default()));
    let deployer = CounterfactualDeployer::new(
      FakeFactory {
        ledger: ledger.clone(),
      },
      FakeChain {
        ledger: ledger.clone(),
        confirm,
        tamper,
      },
      Duration::from_secs(1),
    );
    (deployer, ledger)
  }

  #[test]
  fn owner_set_rejects_bad_configs() {
    assert!(matches!(
      OwnerSet::new(vec![], 1),
      Err(Error::Config(_))
    ));
    assert!(matches!(
      OwnerSet::new(vec![addr(1), addr(2)], 0),
      Err(Error::Config(_))
    ));
    assert!(matches!(
      OwnerSet::new(vec![addr(1), addr(2)], 3),
      Err(Error::Config(_))
    ));
    assert!(matches!(
      OwnerSet::new(vec![addr(1), addr(1)], 1),
      Err(Error::Config(_))
    ));
    assert!(OwnerSet::new(vec![addr(1), addr(2), addr(3)], 2).is_ok());
  }

  #[tokio::test]
  async fn predict_is_deterministic() {
    let (d, _) = deployer(true, false);
    let a = d.predict(owner_set(&[1, 2, 3], 2), 9.into()).await.unwrap();
    let b = d.predict(owner_set(&[1, 2, 3], 2), 9.into()).await.unwrap();
    assert_eq!(a.address, b.address);
    let c = d.predict(owner_set(&[1, 2, 3], 2), 10.into()).await.unwrap();
    assert_ne!(a.address, c.address);
  }

  #[tokio::test]
  async fn deploy_then_verify_matches() {
    let (d, ledger) = deployer(true, false);
    let set = owner_set(&[1, 2, 3], 2);
    let predicted = d.predict(set, 0.into()).await.unwrap();
    let receipt = d.deploy(&predicted).await.unwrap();
    assert!(receipt.success);
    assert_eq!(ledger.lock().unwrap().sent.len(), 1);
    let result = d.verify(&predicted, &receipt).await.unwrap();
    assert!(result.deployed);
    assert!(result.owners_match);
    assert!(result.threshold_match);
    assert!(result.matches());
    assert_eq!(result.observed_threshold, 2);
  }

  #[tokio::test]
  async fn confirmation_timeout_surfaces() {
    let (d, ledger) = deployer(false, false);
    let predicted = d.predict(owner_set(&[1, 2], 1), 0.into()).await.unwrap();
    let err = d.deploy(&predicted).await.unwrap_err();
    assert!(matches!(err, Error::ConfirmationTimeout(_)));
    // the broadcast still went out; only the wait gave up
    assert_eq!(ledger.lock().unwrap().sent.len(), 1);
    // nothing got deployed, so a verify against the prediction reports
    // undeployed as data
    let receipt = DeploymentReceipt {
      tx_hash: H256::zero(),
      block_number: 0,
      success: false,
    };
    let result = d.verify(&predicted, &receipt).await.unwrap();
    assert!(!result.deployed);
    assert!(!result.matches());
  }

  #[tokio::test]
  async fn mismatch_is_data_not_error() {
    let (d, _) = deployer(true, true);
    let predicted = d.predict(owner_set(&[1, 2, 3], 2), 0.into()).await.unwrap();
    let receipt = d.deploy(&predicted).await.unwrap();
    let result = d.verify(&predicted, &receipt).await.unwrap();
    assert!(result.deployed);
    assert!(result.owners_match);
    assert!(!result.threshold_match);
    assert!(!result.matches());
    assert_eq!(result.observed_threshold, 3);
  }

  #[tokio::test]
  async fn verify_ignores_owner_order() {
    let (d, _) = deployer(true, false);
    // the fake chain registers owners reversed
    let predicted = d.predict(owner_set(&[3, 1, 2], 2), 0.into()).await.unwrap();
    let receipt = d.deploy(&predicted).await.unwrap();
    let result = d.verify(&predicted, &receipt).await.unwrap();
    assert!(result.owners_match);
  }

  #[tokio::test]
  async fn attach_reads_are_idempotent() {
    let (d, _) = deployer(true, false);
    let predicted = d.predict(owner_set(&[1, 2], 2), 0.into()).await.unwrap();
    let receipt = d.deploy(&predicted).await.unwrap();
    assert!(receipt.success);
    let first = d.attach(predicted.address);
    let second = d.attach(predicted.address);
    assert_eq!(first.owners().await.unwrap(), second.owners().await.unwrap());
    assert_eq!(
      first.threshold().await.unwrap(),
      second.threshold().await.unwrap()
    );
  }

  #[tokio::test]
  async fn attach_to_empty_address_reports_undeployed() {
    let (d, _) = deployer(true, false);
    let handle = d.attach(addr(0xEE));
    assert!(!handle.is_deployed().await.unwrap());
    assert!(matches!(handle.owners().await, Err(Error::NotFound(_))));
  }
}
