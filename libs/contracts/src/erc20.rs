//! ERC-20 token wrapper
//!
//! Covers exactly the capability set the client needs from the pair
//! tokens: balance and allowance reads, totalSupply, and the approval
//! write. Approvals are awaited to a mined receipt so callers can rely
//! on the allowance being raised before the next call goes out.

use tracing::debug;
use web3::contract::{Contract, Options};
use web3::types::{Address, TransactionReceipt, U256};
use web3::{Transport, Web3};

use crate::abi;
use crate::error::{ensure_succeeded, ContractError};

#[derive(Debug, Clone)]
pub struct Erc20Token<T: Transport> {
    contract: Contract<T>,
}

impl<T: Transport> Erc20Token<T> {
    pub fn new(web3: &Web3<T>, address: Address) -> Result<Self, ContractError> {
        let contract = Contract::from_json(web3.eth(), address, abi::ERC20_ABI.as_bytes())?;
        Ok(Self { contract })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    pub async fn balance_of(&self, owner: Address) -> Result<U256, ContractError> {
        Ok(self
            .contract
            .query("balanceOf", (owner,), None, Options::default(), None)
            .await?)
    }

    pub async fn allowance(
        &self,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ContractError> {
        Ok(self
            .contract
            .query("allowance", (owner, spender), None, Options::default(), None)
            .await?)
    }

    pub async fn total_supply(&self) -> Result<U256, ContractError> {
        Ok(self
            .contract
            .query("totalSupply", (), None, Options::default(), None)
            .await?)
    }

    /// Approve `spender` for exactly `amount` and wait until the approval
    /// is mined. Gas is left to the node's estimate.
    pub async fn approve(
        &self,
        from: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TransactionReceipt, ContractError> {
        debug!(token = ?self.contract.address(), %amount, "submitting approval");
        let receipt = self
            .contract
            .call_with_confirmations("approve", (spender, amount), from, Options::default(), 1)
            .await?;
        ensure_succeeded(receipt)
    }
}
