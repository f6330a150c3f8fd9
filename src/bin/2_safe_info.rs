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

use safeth::config;
use safeth::safe::SafeClient;

#[tokio::main]
async fn main() {
  let net = std::env::var("NETWORK").expect("NETWORK REQUIRED");
  let (web3, _, conf) = config::init_web3(net.as_str(), false)
    .await
    .expect("failed to init web3");

  let safe_address = conf.safe_address.expect("no safe address");
  let safe = SafeClient::new(&web3, Some(safe_address.as_str())).expect("derp2");

  let status = safe.status().await.expect("couldnt query safe");
  println!("safe address {:?}", status.address);
  println!("is safe deployed {:?}", status.deployed);
  if !status.deployed {
    println!("no contract code at the safe address");
    return;
  }
  println!("safe owners {:?}", status.owners);
  println!("safe threshold {}", status.threshold);
  println!("safe nonce {}", status.nonce);
}
