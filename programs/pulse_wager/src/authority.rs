use anchor_lang::prelude::*;

use crate::errors::WagerError;
use crate::sigverify::Attestation;
use crate::state::{Config, OracleSet};

/// Who may publish a round pulse, resolved from Config at call time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OracleAuthority {
    Single(Pubkey),
    Threshold { oracles: Vec<Pubkey>, threshold: u8 },
}

impl OracleAuthority {
    pub fn resolve(config: &Config, oracle_set: Option<&OracleSet>) -> Result<Self> {
        if config.use_oracle_set {
            let set = oracle_set.ok_or(WagerError::OracleNotSet)?;
            Ok(Self::Threshold {
                oracles: set.oracles.clone(),
                threshold: set.threshold,
            })
        } else {
            require!(
                config.oracle_pubkey != Pubkey::default(),
                WagerError::OracleNotSet
            );
            Ok(Self::Single(config.oracle_pubkey))
        }
    }

    /// Number of Ed25519 verify instructions expected in front of `set_pulse_signed`.
    pub fn required_attestations(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Threshold { threshold, .. } => *threshold as usize,
        }
    }

    pub fn verify(&self, attestations: &[Attestation], message: &[u8]) -> Result<()> {
        require!(
            attestations.len() == self.required_attestations(),
            WagerError::MissingOrInvalidSignatureAdjacency
        );

        match self {
            Self::Single(oracle) => {
                let att = &attestations[0];
                require_keys_eq!(att.signer, *oracle, WagerError::SignerMismatch);
                require!(att.message.as_slice() == message, WagerError::MessageMismatch);
            }
            Self::Threshold { oracles, .. } => {
                let mut seen: Vec<Pubkey> = Vec::with_capacity(attestations.len());
                for att in attestations {
                    require!(oracles.contains(&att.signer), WagerError::SignerMismatch);
                    require!(
                        !seen.contains(&att.signer),
                        WagerError::DuplicateOracleAttestation
                    );
                    require!(att.message.as_slice() == message, WagerError::MessageMismatch);
                    seen.push(att.signer);
                }
            }
        }
        Ok(())
    }
}
