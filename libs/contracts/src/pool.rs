//! Pool contract wrapper
//!
//! Reads go through `query` against the latest block; mutating calls are
//! submitted through the node's wallet session (`eth_sendTransaction`)
//! and awaited to a mined receipt before returning. The receipt status
//! is checked here so callers never see a "successful" revert.

use tracing::debug;
use web3::contract::{Contract, Options};
use web3::types::{
    Address, BlockNumber, FilterBuilder, Log, TransactionReceipt, H256, U256, U64,
};
use web3::{Transport, Web3};

use crate::abi;
use crate::error::{ensure_succeeded, ContractError};

/// Confirmations to wait for after a mutating call is mined.
const CONFIRMATIONS: usize = 1;

/// Typed handle on the SimpleSwap pool contract.
#[derive(Debug, Clone)]
pub struct PoolContract<T: Transport> {
    contract: Contract<T>,
    web3: Web3<T>,
}

impl<T: Transport> PoolContract<T> {
    pub fn new(web3: Web3<T>, address: Address) -> Result<Self, ContractError> {
        let contract = Contract::from_json(web3.eth(), address, abi::POOL_ABI.as_bytes())?;
        Ok(Self { contract, web3 })
    }

    pub fn address(&self) -> Address {
        self.contract.address()
    }

    /// Address of the first pair token.
    pub async fn token_a(&self) -> Result<Address, ContractError> {
        Ok(self
            .contract
            .query("tokenA", (), None, Options::default(), None)
            .await?)
    }

    /// Address of the second pair token.
    pub async fn token_b(&self) -> Result<Address, ContractError> {
        Ok(self
            .contract
            .query("tokenB", (), None, Options::default(), None)
            .await?)
    }

    /// Current reserves, read fresh — callers must not cache these across
    /// actions.
    pub async fn get_reserves(&self) -> Result<(U256, U256), ContractError> {
        Ok(self
            .contract
            .query("getReserves", (), None, Options::default(), None)
            .await?)
    }

    /// Spot price of `token_in` denominated in `token_out`, as the
    /// contract computes it.
    pub async fn get_price(
        &self,
        token_in: Address,
        token_out: Address,
    ) -> Result<U256, ContractError> {
        Ok(self
            .contract
            .query("getPrice", (token_in, token_out), None, Options::default(), None)
            .await?)
    }

    /// Constant-product output quote for an exact input. Passthrough —
    /// the pricing formula is owned by the contract.
    pub async fn get_amount_out(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256, ContractError> {
        Ok(self
            .contract
            .query(
                "getAmountOut",
                (token_in, token_out, amount_in),
                None,
                Options::default(),
                None,
            )
            .await?)
    }

    /// LP token balance (the pool is its own LP token).
    pub async fn lp_balance_of(&self, owner: Address) -> Result<U256, ContractError> {
        Ok(self
            .contract
            .query("balanceOf", (owner,), None, Options::default(), None)
            .await?)
    }

    /// Total LP token supply.
    pub async fn total_supply(&self) -> Result<U256, ContractError> {
        Ok(self
            .contract
            .query("totalSupply", (), None, Options::default(), None)
            .await?)
    }

    /// Submit a swap and wait until it is mined.
    #[allow(clippy::too_many_arguments)]
    pub async fn swap_exact_tokens_for_tokens(
        &self,
        from: Address,
        amount_in: U256,
        amount_out_min: U256,
        path: Vec<Address>,
        to: Address,
        deadline: U256,
        gas_limit: U256,
    ) -> Result<TransactionReceipt, ContractError> {
        debug!(%amount_in, %amount_out_min, "submitting swap");
        let receipt = self
            .contract
            .call_with_confirmations(
                "swapExactTokensForTokens",
                (amount_in, amount_out_min, path, to, deadline),
                from,
                Options::with(|opt| opt.gas = Some(gas_limit)),
                CONFIRMATIONS,
            )
            .await?;
        ensure_succeeded(receipt)
    }

    /// Submit a liquidity deposit and wait until it is mined.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_liquidity(
        &self,
        from: Address,
        token_a: Address,
        token_b: Address,
        amount_a: U256,
        amount_b: U256,
        amount_a_min: U256,
        amount_b_min: U256,
        to: Address,
        deadline: U256,
        gas_limit: U256,
    ) -> Result<TransactionReceipt, ContractError> {
        debug!(%amount_a, %amount_b, "submitting liquidity deposit");
        let receipt = self
            .contract
            .call_with_confirmations(
                "addLiquidity",
                (
                    token_a,
                    token_b,
                    amount_a,
                    amount_b,
                    amount_a_min,
                    amount_b_min,
                    to,
                    deadline,
                ),
                from,
                Options::with(|opt| opt.gas = Some(gas_limit)),
                CONFIRMATIONS,
            )
            .await?;
        ensure_succeeded(receipt)
    }

    /// Submit a liquidity withdrawal and wait until it is mined.
    #[allow(clippy::too_many_arguments)]
    pub async fn remove_liquidity(
        &self,
        from: Address,
        token_a: Address,
        token_b: Address,
        liquidity: U256,
        amount_a_min: U256,
        amount_b_min: U256,
        to: Address,
        deadline: U256,
        gas_limit: U256,
    ) -> Result<TransactionReceipt, ContractError> {
        debug!(%liquidity, "submitting liquidity withdrawal");
        let receipt = self
            .contract
            .call_with_confirmations(
                "removeLiquidity",
                (
                    token_a,
                    token_b,
                    liquidity,
                    amount_a_min,
                    amount_b_min,
                    to,
                    deadline,
                ),
                from,
                Options::with(|opt| opt.gas = Some(gas_limit)),
                CONFIRMATIONS,
            )
            .await?;
        ensure_succeeded(receipt)
    }

    /// Logs emitted by this pool for one event kind, filtered by the
    /// indexed user topic over an inclusive block range.
    pub async fn query_logs(
        &self,
        signature: H256,
        user: Address,
        from_block: U64,
        to_block: U64,
    ) -> Result<Vec<Log>, ContractError> {
        let filter = FilterBuilder::default()
            .address(vec![self.contract.address()])
            .topics(
                Some(vec![signature]),
                Some(vec![abi::address_topic(user)]),
                None,
                None,
            )
            .from_block(BlockNumber::Number(from_block))
            .to_block(BlockNumber::Number(to_block))
            .build();

        Ok(self.web3.eth().logs(filter).await?)
    }

    /// Height of the chain head.
    pub async fn latest_block(&self) -> Result<U64, ContractError> {
        Ok(self.web3.eth().block_number().await?)
    }
}
