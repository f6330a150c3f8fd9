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
  deploy::{DeploymentTx, OwnerSet, WalletFactory},
  safe::SafeClient,
  utils, Result,
};
use async_trait::async_trait;
use ethcontract::{
  prelude::*,
  tokens::Tokenize,
  transport::DynTransport,
  web3::ethabi::{param_type::ParamType, Function, Param, Token},
};

ethcontract::contract!("./artifacts/contracts/GnosisSafeProxyFactory.sol/GnosisSafeProxyFactory.json");

/// Client for the Gnosis Safe proxy factory. Derives the CREATE2 address a
/// proxy will be deployed at, and builds the `createProxyWithNonce`
/// transaction that deploys it there.
#[derive(Clone)]
pub struct SafeFactory {
  web3: Web3<DynTransport>,
  address: Address,
  singleton: Address,
  fallback_handler: Address,
}

impl SafeFactory {
  pub fn new(
    web3: &Web3<DynTransport>,
    address: &str,
    singleton: &str,
    fallback_handler: Option<&str>,
  ) -> Result<Self> {
    Ok(Self {
      web3: web3.clone(),
      address: utils::address_or_default(Some(address))?,
      singleton: utils::address_or_default(Some(singleton))?,
      fallback_handler: utils::address_or_default(fallback_handler)?,
    })
  }

  pub fn address(&self) -> H160 {
    self.address
  }

  /// ABI-encoded `setup` call that initializes the proxy with the owner set.
  /// This is the initializer the factory hashes into the CREATE2 salt.
  pub fn setup_data(&self, owner_set: &OwnerSet) -> Result<Vec<u8>> {
    #[allow(deprecated)]
    let setup = Function {
      name: "setup".to_owned(),
      inputs: vec![
        param("_owners", ParamType::Array(Box::new(ParamType::Address))),
        param("_threshold", ParamType::Uint(256)),
        param("to", ParamType::Address),
        param("data", ParamType::Bytes),
        param("fallbackHandler", ParamType::Address),
        param("paymentToken", ParamType::Address),
        param("payment", ParamType::Uint(256)),
        param("paymentReceiver", ParamType::Address),
      ],
      outputs: vec![],
      constant: false,
      state_mutability: Default::default(),
    };
    let address_0: Address = utils::zero_address();
    let owners: Vec<Token> = owner_set.owners().iter().map(|o| (*o).into_token()).collect();
    let data = setup.encode_input(&vec![
      Token::Array(owners),
      U256::from(owner_set.threshold()).into_token(),
      // callback/expanded functionality not used
      address_0.into_token(),
      Token::Bytes(vec![]),
      self.fallback_handler.into_token(),
      address_0.into_token(),
      U256::zero().into_token(),
      address_0.into_token(),
    ])?;
    Ok(data)
  }

  /// ABI-encoded `createProxyWithNonce(singleton, initializer, saltNonce)`.
  pub fn deploy_data(&self, initializer: &[u8], salt_nonce: U256) -> Result<Vec<u8>> {
    #[allow(deprecated)]
    let create_proxy = Function {
      name: "createProxyWithNonce".to_owned(),
      inputs: vec![
        param("_singleton", ParamType::Address),
        param("initializer", ParamType::Bytes),
        param("saltNonce", ParamType::Uint(256)),
      ],
      outputs: vec![param("proxy", ParamType::Address)],
      constant: false,
      state_mutability: Default::default(),
    };
    let data = create_proxy.encode_input(&vec![
      self.singleton.into_token(),
      Token::Bytes(initializer.to_vec()),
      salt_nonce.into_token(),
    ])?;
    Ok(data)
  }

  /// The proxy creation code the factory deploys. Read from the factory so
  /// the prediction tracks the on-chain factory version.
  pub async fn proxy_creation_code(&self) -> Result<Vec<u8>> {
    let factory = GnosisSafeProxyFactory::at(&self.web3, self.address);
    let code = factory.proxy_creation_code().call().await?;
    Ok(code.0)
  }

  /// Pure CREATE2 computation, mirroring the factory's `createProxyWithNonce`:
  /// `salt = keccak256(keccak256(initializer) ++ saltNonce)` over the creation
  /// code concatenated with the singleton address as a 32-byte word.
  pub fn proxy_address(&self, creation_code: &[u8], initializer: &[u8], salt_nonce: U256) -> H160 {
    let mut salt_preimage = Vec::with_capacity(64);
    salt_preimage.extend_from_slice(&utils::keccak256(initializer));
    let mut nonce_word = [0u8; 32];
    salt_nonce.to_big_endian(&mut nonce_word);
    salt_preimage.extend_from_slice(&nonce_word);
    let salt = utils::keccak256(&salt_preimage);

    let mut deployment_data = Vec::with_capacity(creation_code.len() + 32);
    deployment_data.extend_from_slice(creation_code);
    let mut singleton_word = [0u8; 32];
    singleton_word[12..].copy_from_slice(self.singleton.as_bytes());
    deployment_data.extend_from_slice(&singleton_word);

    utils::create2_address(self.address, salt, utils::keccak256(&deployment_data))
  }
}

fn param(name: &str, kind: ParamType) -> Param {
  Param {
    name: name.to_owned(),
    kind,
    internal_type: None,
  }
}

#[async_trait]
impl WalletFactory for SafeFactory {
  type Wallet = SafeClient;

  async fn derive_address(&self, owner_set: &OwnerSet, salt_nonce: U256) -> Result<H160> {
    let creation_code = self.proxy_creation_code().await?;
    let initializer = self.setup_data(owner_set)?;
    Ok(self.proxy_address(&creation_code, &initializer, salt_nonce))
  }

  async fn deployment_tx(&self, owner_set: &OwnerSet, salt_nonce: U256) -> Result<DeploymentTx> {
    let initializer = self.setup_data(owner_set)?;
    Ok(DeploymentTx {
      to: self.address,
      value: U256::zero(),
      data: self.deploy_data(&initializer, salt_nonce)?,
    })
  }

  fn attach(&self, address: H160) -> SafeClient {
    SafeClient::at(&self.web3, address)
  }
}
