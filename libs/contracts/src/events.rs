//! Event decoders for the history feed
//!
//! Raw logs come back from `eth_getLogs` untyped; these decoders check
//! every expected field explicitly and fail with a typed error instead
//! of panicking on malformed payloads. Callers decide what a decoding
//! failure means — the history aggregator keeps the event and tags it
//! as incomplete rather than dropping it.

use ethabi::RawLog;
use web3::types::{Log, H160, U256};

use crate::abi;

/// Error types for ABI decoding
#[derive(Debug, thiserror::Error)]
pub enum DecodingError {
    #[error("ABI parsing failed: {0}")]
    AbiParsingError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Decoded TokenSwapped payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapDetail {
    pub input_token: H160,
    pub output_token: H160,
    pub amount_in: U256,
    pub amount_out: U256,
}

/// Decoded LiquidityAdded/LiquidityRemoved payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityDetail {
    pub amount_a: U256,
    pub amount_b: U256,
    pub liquidity: U256,
}

/// ABI decoder for TokenSwapped events
pub struct SwapEventDecoder;

impl SwapEventDecoder {
    pub fn decode(log: &Log) -> Result<SwapDetail, DecodingError> {
        let raw_log = RawLog {
            topics: log.topics.clone(),
            data: log.data.0.clone(),
        };

        let decoded = abi::token_swapped_event()
            .parse_log(raw_log)
            .map_err(|e| DecodingError::AbiParsingError(e.to_string()))?;

        let input_token = decoded
            .params
            .get(1)
            .and_then(|p| p.value.clone().into_address())
            .ok_or(DecodingError::MissingField("inputToken".to_string()))?;

        let output_token = decoded
            .params
            .get(2)
            .and_then(|p| p.value.clone().into_address())
            .ok_or(DecodingError::MissingField("outputToken".to_string()))?;

        let amount_in = decoded
            .params
            .get(3)
            .and_then(|p| p.value.clone().into_uint())
            .ok_or(DecodingError::MissingField("amountIn".to_string()))?;

        let amount_out = decoded
            .params
            .get(4)
            .and_then(|p| p.value.clone().into_uint())
            .ok_or(DecodingError::MissingField("amountOut".to_string()))?;

        Ok(SwapDetail {
            input_token,
            output_token,
            amount_in,
            amount_out,
        })
    }
}

/// ABI decoder for LiquidityAdded and LiquidityRemoved events
pub struct LiquidityEventDecoder;

impl LiquidityEventDecoder {
    pub fn decode_added(log: &Log) -> Result<LiquidityDetail, DecodingError> {
        Self::decode(abi::liquidity_added_event(), log)
    }

    pub fn decode_removed(log: &Log) -> Result<LiquidityDetail, DecodingError> {
        Self::decode(abi::liquidity_removed_event(), log)
    }

    fn decode(event: ethabi::Event, log: &Log) -> Result<LiquidityDetail, DecodingError> {
        let raw_log = RawLog {
            topics: log.topics.clone(),
            data: log.data.0.clone(),
        };

        let decoded = event
            .parse_log(raw_log)
            .map_err(|e| DecodingError::AbiParsingError(e.to_string()))?;

        let amount_a = decoded
            .params
            .get(1)
            .and_then(|p| p.value.clone().into_uint())
            .ok_or(DecodingError::MissingField("amountA".to_string()))?;

        let amount_b = decoded
            .params
            .get(2)
            .and_then(|p| p.value.clone().into_uint())
            .ok_or(DecodingError::MissingField("amountB".to_string()))?;

        let liquidity = decoded
            .params
            .get(3)
            .and_then(|p| p.value.clone().into_uint())
            .ok_or(DecodingError::MissingField("liquidity".to_string()))?;

        Ok(LiquidityDetail {
            amount_a,
            amount_b,
            liquidity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethabi::Token;
    use web3::types::{Bytes, H256};

    fn create_test_log(topics: Vec<H256>, data: Vec<u8>) -> Log {
        Log {
            address: H160::from_low_u64_be(0x1234),
            topics,
            data: Bytes(data),
            block_hash: None,
            block_number: None,
            transaction_hash: None,
            transaction_index: None,
            log_index: None,
            transaction_log_index: None,
            log_type: None,
            removed: None,
        }
    }

    #[test]
    fn test_decode_valid_swap_event() {
        let user = H160::from_low_u64_be(0xaa);
        let input = H160::from_low_u64_be(0xb1);
        let output = H160::from_low_u64_be(0xb2);
        let data = ethabi::encode(&[
            Token::Address(input),
            Token::Address(output),
            Token::Uint(U256::from(100u64)),
            Token::Uint(U256::from(200u64)),
        ]);

        let log = create_test_log(
            vec![*abi::TOKEN_SWAPPED_SIGNATURE, abi::address_topic(user)],
            data,
        );

        let detail = SwapEventDecoder::decode(&log).unwrap();
        assert_eq!(detail.input_token, input);
        assert_eq!(detail.output_token, output);
        assert_eq!(detail.amount_in, U256::from(100u64));
        assert_eq!(detail.amount_out, U256::from(200u64));
    }

    #[test]
    fn test_decode_valid_liquidity_event() {
        let provider = H160::from_low_u64_be(0xaa);
        let data = ethabi::encode(&[
            Token::Uint(U256::from(100u64)),
            Token::Uint(U256::from(200u64)),
            Token::Uint(U256::from(141u64)),
        ]);

        let log = create_test_log(
            vec![*abi::LIQUIDITY_ADDED_SIGNATURE, abi::address_topic(provider)],
            data,
        );

        let detail = LiquidityEventDecoder::decode_added(&log).unwrap();
        assert_eq!(detail.amount_a, U256::from(100u64));
        assert_eq!(detail.amount_b, U256::from(200u64));
        assert_eq!(detail.liquidity, U256::from(141u64));
    }

    #[test]
    fn test_decode_truncated_data_fails() {
        let user = H160::from_low_u64_be(0xaa);
        // Data holds only two of the four non-indexed fields.
        let data = ethabi::encode(&[
            Token::Address(H160::from_low_u64_be(0xb1)),
            Token::Address(H160::from_low_u64_be(0xb2)),
        ]);

        let log = create_test_log(
            vec![*abi::TOKEN_SWAPPED_SIGNATURE, abi::address_topic(user)],
            data,
        );

        assert!(matches!(
            SwapEventDecoder::decode(&log),
            Err(DecodingError::AbiParsingError(_))
        ));
    }

    #[test]
    fn test_decode_wrong_signature_fails() {
        let user = H160::from_low_u64_be(0xaa);
        let data = ethabi::encode(&[
            Token::Uint(U256::from(100u64)),
            Token::Uint(U256::from(200u64)),
            Token::Uint(U256::from(141u64)),
        ]);

        // A LiquidityAdded log handed to the removed-event decoder must
        // not decode; the signatures differ.
        let log = create_test_log(
            vec![*abi::LIQUIDITY_ADDED_SIGNATURE, abi::address_topic(user)],
            data,
        );

        assert!(LiquidityEventDecoder::decode_removed(&log).is_err());
    }
}
