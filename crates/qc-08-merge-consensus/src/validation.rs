use crate::domain::{
    ConsensusError, ConsensusResult, Header, MergeConfig, EMPTY_UNCLE_HASH, POS_DIFFICULTY,
    POS_NONCE,
};
use crate::ports::FeeMarketValidator;

/// Stateless validation of proof-of-stake headers.
///
/// Compared to the legacy rules the seal fields become constants, the
/// timestamp is no longer checked and extra-data is capped. Checks run in a
/// fixed order and the first violation is returned.
pub struct HeaderValidator;

impl HeaderValidator {
    /// Validate a post-merge header against its parent
    pub fn validate_pos_header(
        header: &Header,
        parent: &Header,
        config: &MergeConfig,
        fee_market: &dyn FeeMarketValidator,
    ) -> ConsensusResult<()> {
        Self::validate_extra_data(header, config)?;
        Self::validate_seal_fields(header)?;
        Self::validate_difficulty(header)?;
        Self::validate_gas(header, config)?;
        Self::validate_number(header, parent)?;

        fee_market
            .verify_header(config, parent, header)
            .map_err(ConsensusError::FeeMarketViolation)
    }

    /// Extra-data must fit the configured size
    pub fn validate_extra_data(header: &Header, config: &MergeConfig) -> ConsensusResult<()> {
        if header.extra_data.len() > config.max_extra_data_size {
            return Err(ConsensusError::InvalidExtraDataLength {
                len: header.extra_data.len(),
                max: config.max_extra_data_size,
            });
        }
        Ok(())
    }

    /// Nonce and uncle hash must hold their proof-of-stake constants
    pub fn validate_seal_fields(header: &Header) -> ConsensusResult<()> {
        if header.nonce != POS_NONCE {
            return Err(ConsensusError::InvalidNonce { have: header.nonce });
        }
        if header.uncle_hash != EMPTY_UNCLE_HASH {
            return Err(ConsensusError::InvalidUncleHash {
                have: header.uncle_hash,
            });
        }
        Ok(())
    }

    pub fn validate_difficulty(header: &Header) -> ConsensusResult<()> {
        if header.difficulty != Some(POS_DIFFICULTY) {
            return Err(ConsensusError::InvalidDifficulty {
                have: header.difficulty,
                want: POS_DIFFICULTY,
            });
        }
        Ok(())
    }

    /// gas_used <= gas_limit <= max_gas_limit
    pub fn validate_gas(header: &Header, config: &MergeConfig) -> ConsensusResult<()> {
        if header.gas_limit > config.max_gas_limit {
            return Err(ConsensusError::InvalidGasLimit {
                have: header.gas_limit,
                max: config.max_gas_limit,
            });
        }
        if header.gas_used > header.gas_limit {
            return Err(ConsensusError::InvalidGasUsed {
                used: header.gas_used,
                limit: header.gas_limit,
            });
        }
        Ok(())
    }

    /// Block number must be parent number + 1
    pub fn validate_number(header: &Header, parent: &Header) -> ConsensusResult<()> {
        if parent.number.checked_add(1) != Some(header.number) {
            return Err(ConsensusError::InvalidBlockNumberSequence {
                parent: parent.number,
                number: header.number,
            });
        }
        Ok(())
    }
}
