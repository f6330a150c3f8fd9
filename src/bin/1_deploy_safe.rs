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

use ethcontract::web3::types::U256;
use ethcontract::{Address, H160};
use safeth::{
  chain::EthClient,
  config,
  deploy::{CounterfactualDeployer, OwnerSet},
  factory::SafeFactory,
};
use std::str::FromStr;

#[tokio::main]
async fn main() {
  let net = std::env::var("NETWORK").expect("NETWORK REQUIRED");
  let (web3, my_account, conf) = config::init_web3(net.as_str(), true)
    .await
    .expect("failed to init web3");

  let mut safe_owners: Vec<H160> = conf
    .owners
    .iter()
    .map(|a| Address::from_str(a).expect("couldnt parse H160"))
    .collect();
  if (safe_owners.len() as u64) < conf.threshold {
    panic!("not enough owners");
  }
  // sort them now
  safe_owners.sort();
  println!("OWNERS {:?}", safe_owners);

  let owner_set = OwnerSet::new(safe_owners, conf.threshold).expect("invalid owner set");
  let factory = SafeFactory::new(
    &web3,
    conf.safe_factory_address.as_str(),
    conf.safe_singleton_address.as_str(),
    conf.fallback_handler_address.as_deref(),
  )
  .expect("derp");
  let chain = EthClient::new(&web3, my_account);
  let deployer = CounterfactualDeployer::new(factory, chain, conf.confirm_timeout());

  let salt_nonce = U256::from(conf.salt_nonce.unwrap_or(0));
  let predicted = deployer
    .predict(owner_set, salt_nonce)
    .await
    .expect("couldnt predict safe address");
  println!("predicted safe address {:?}", predicted.address);

  let receipt = deployer.deploy(&predicted).await.expect("didnt deploy");
  println!("deployment tx 0x{}", hex::encode(receipt.tx_hash.as_bytes()));
  if !receipt.success {
    println!("deployment tx reverted");
    std::process::exit(1);
  }

  let result = deployer
    .verify(&predicted, &receipt)
    .await
    .expect("couldnt verify deployment");
  println!("is safe deployed {:?}", result.deployed);
  println!("safe owners {:?}", result.observed_owners);
  println!("safe threshold {}", result.observed_threshold);
  if !result.matches() {
    println!("deployed safe does not match the prediction");
    std::process::exit(1);
  }
  println!("=> safe at {:?} matches the prediction!", predicted.address);
}
