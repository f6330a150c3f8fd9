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

// Predicts the counterfactual Safe address for an owner set without sending
// anything. Funds can be directed to the printed address before deployment.

use dotenv::dotenv;
use ethcontract::web3::types::U256;
use ethcontract::{transport::DynTransport, Address, Http, Web3, H160};
use safeth::{
  deploy::{OwnerSet, WalletFactory},
  factory::SafeFactory,
};
use std::str::FromStr;

// canonical v1.3.0 addresses, same on most networks
const FACTORY: &str = "0xa6B71E26C5e0845f74c812102Ca7114b6a896AB2";
const SINGLETON: &str = "0xd9Db270c1B5E3Bd161E8c8503c55cEABeE709552";

#[tokio::main]
async fn main() {
  dotenv().ok();

  let eth_url: String = std::env::var("ETH_URL").unwrap_or("http://localhost:8545".to_string());
  let web3 = Web3::new(DynTransport::new(
    Http::new(eth_url.as_str()).expect("couldnt setup web3"),
  ));

  // owners vec
  let owners_string = std::env::var("OWNERS").unwrap();
  let owners_iter = owners_string.as_str().split(",");
  let mut safe_owners: Vec<H160> = owners_iter
    .map(|a| Address::from_str(a).expect("couldnt parse H160"))
    .collect();
  safe_owners.sort();

  // threshold
  let threshold: u64 = std::env::var("THRESHOLD")
    .unwrap_or("2".to_string())
    .parse::<u64>()
    .unwrap_or(2);

  let salt_nonce: u64 = std::env::var("SALT_NONCE")
    .unwrap_or("0".to_string())
    .parse::<u64>()
    .unwrap_or(0);

  let owner_set = OwnerSet::new(safe_owners, threshold).expect("invalid owner set");
  let factory_address = std::env::var("SAFE_FACTORY").unwrap_or(FACTORY.to_string());
  let singleton_address = std::env::var("SAFE_SINGLETON").unwrap_or(SINGLETON.to_string());
  let factory = SafeFactory::new(
    &web3,
    factory_address.as_str(),
    singleton_address.as_str(),
    std::env::var("FALLBACK_HANDLER").ok().as_deref(),
  )
  .expect("derp");

  let addy = factory
    .derive_address(&owner_set, U256::from(salt_nonce))
    .await
    .expect("couldnt derive safe address");
  println!("SAFE ADDY {:?}", addy);
}
