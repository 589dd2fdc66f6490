use ethers::types::Address;
use std::str::FromStr;

pub fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_str(s).map_err(|e| format!("invalid address: {e}"))
}
