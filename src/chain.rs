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

use crate::{
  deploy::{ChainClient, DeploymentReceipt, DeploymentTx},
  error::Error,
  Result,
};
use async_trait::async_trait;
use ethcontract::{
  transport::DynTransport,
  web3::types::{Bytes, CallRequest, TransactionParameters, TransactionRequest, H160, H256},
  Account, Web3,
};
use std::time::{Duration, Instant};
use tokio::time::sleep;

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Broadcasts prepared transactions from the configured account and polls
/// for their receipts.
#[derive(Clone)]
pub struct EthClient {
  web3: Web3<DynTransport>,
  account: Account,
}

impl EthClient {
  pub fn new(web3: &Web3<DynTransport>, account: Account) -> Self {
    Self {
      web3: web3.clone(),
      account,
    }
  }

  pub fn address(&self) -> H160 {
    self.account.address()
  }

  pub async fn balance(&self) -> Result<u128> {
    let balance = self.web3.eth().balance(self.account.address(), None).await?;
    Ok(balance.as_u128())
  }

  async fn build_parameters(
    &self,
    tx: &DeploymentTx,
    chain_id: Option<u64>,
  ) -> Result<TransactionParameters> {
    let from = self.account.address();
    let gas = self
      .web3
      .eth()
      .estimate_gas(
        CallRequest {
          from: Some(from),
          to: Some(tx.to),
          gas: None,
          gas_price: None,
          value: Some(tx.value),
          data: Some(Bytes(tx.data.clone())),
          transaction_type: None,
          access_list: None,
          max_fee_per_gas: None,
          max_priority_fee_per_gas: None,
        },
        None,
      )
      .await?;
    let gas_price = self.web3.eth().gas_price().await?;
    let nonce = self.web3.eth().transaction_count(from, None).await?;
    Ok(TransactionParameters {
      nonce: Some(nonce),
      gas_price: Some(gas_price),
      gas,
      to: Some(tx.to),
      value: tx.value,
      data: Bytes(tx.data.clone()),
      chain_id,
      transaction_type: None,
      access_list: None,
      max_fee_per_gas: None,
      max_priority_fee_per_gas: None,
    })
  }
}

#[async_trait]
impl ChainClient for EthClient {
  async fn send_transaction(&self, tx: &DeploymentTx) -> Result<H256> {
    match &self.account {
      // unlocked node account
      Account::Local(from, condition) => {
        let request = TransactionRequest {
          from: *from,
          to: Some(tx.to),
          value: Some(tx.value),
          data: Some(Bytes(tx.data.clone())),
          condition: condition.clone(),
          ..Default::default()
        };
        self
          .web3
          .eth()
          .send_transaction(request)
          .await
          .map_err(|e| Error::Submission(e.to_string()))
      }
      // imported account from metamask
      Account::Offline(key, chain_id) => {
        let params = self.build_parameters(tx, *chain_id).await?;
        let signed = self
          .web3
          .accounts()
          .sign_transaction(params, &**key)
          .await
          .map_err(|e| Error::Submission(e.to_string()))?;
        self
          .web3
          .eth()
          .send_raw_transaction(signed.raw_transaction)
          .await
          .map_err(|e| Error::Submission(e.to_string()))
      }
      _ => Err(Error::Submission("unsupported account type".to_string())),
    }
  }

  async fn wait_for_receipt(&self, tx_hash: H256, timeout: Duration) -> Result<DeploymentReceipt> {
    let started = Instant::now();
    loop {
      if let Some(receipt) = self.web3.eth().transaction_receipt(tx_hash).await? {
        if let Some(block_number) = receipt.block_number {
          return Ok(DeploymentReceipt {
            tx_hash,
            block_number: block_number.as_u64(),
            success: receipt.status == Some(1.into()),
          });
        }
      }
      if started.elapsed() >= timeout {
        log::warn!("ConfirmationTimeout... {:?}", tx_hash);
        return Err(Error::ConfirmationTimeout(format!(
          "no receipt for {:?} after {:?}",
          tx_hash, timeout
        )));
      }
      sleep(RECEIPT_POLL_INTERVAL).await;
    }
  }
}
