//! Ed25519 introspection.
//!
//! The runtime's Ed25519 program verifies signatures; we only check that the
//! verify instructions sit directly in front of ours, are self-contained, and
//! carry the signer and message we expect.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked,
};

use crate::errors::WagerError;

// Ed25519SigVerify111111111111111111111111111
pub fn ed25519_program_id() -> Pubkey {
    Pubkey::new_from_array([
        3, 125, 70, 214, 124, 147, 251, 190, 18, 249, 66, 143, 131, 141, 64, 255,
        5, 112, 116, 73, 39, 244, 138, 100, 252, 202, 112, 68, 128, 0, 0, 0,
    ])
}

const HEADER_LEN: usize = 2 + 14;
const SIGNATURE_LEN: usize = 64;
const PUBKEY_LEN: usize = 32;
const SELF_CONTAINED: u16 = u16::MAX;

/// Signer and message of one verified Ed25519 instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attestation {
    pub signer: Pubkey,
    pub message: Vec<u8>,
}

fn read_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

/// Layout: `[num_sigs: u8, padding: u8, offsets(14), signature(64), pubkey(32), msg(N)]`.
pub fn parse_ed25519_ix(ix: &Instruction) -> Result<Attestation> {
    require_keys_eq!(
        ix.program_id,
        ed25519_program_id(),
        WagerError::MissingOrInvalidSignatureAdjacency
    );

    let data = &ix.data;
    require!(data.len() >= HEADER_LEN, WagerError::MissingOrInvalidSignatureAdjacency);
    require!(data[0] == 1, WagerError::MissingOrInvalidSignatureAdjacency);

    // All three pieces must live inside this very instruction.
    require!(
        read_u16(data, 4) == SELF_CONTAINED
            && read_u16(data, 8) == SELF_CONTAINED
            && read_u16(data, 14) == SELF_CONTAINED,
        WagerError::MissingOrInvalidSignatureAdjacency
    );

    let sig_off = read_u16(data, 2) as usize;
    let pk_off = read_u16(data, 6) as usize;
    let msg_off = read_u16(data, 10) as usize;
    let msg_sz = read_u16(data, 12) as usize;

    require!(
        sig_off + SIGNATURE_LEN <= data.len()
            && pk_off + PUBKEY_LEN <= data.len()
            && msg_off + msg_sz <= data.len(),
        WagerError::MissingOrInvalidSignatureAdjacency
    );

    let pk: [u8; 32] = data[pk_off..pk_off + PUBKEY_LEN]
        .try_into()
        .map_err(|_| error!(WagerError::MissingOrInvalidSignatureAdjacency))?;

    Ok(Attestation {
        signer: Pubkey::new_from_array(pk),
        message: data[msg_off..msg_off + msg_sz].to_vec(),
    })
}

/// Collects the `count` attestations at positions `current - count .. current`.
///
/// `load` fetches the instruction at an absolute index of the transaction.
pub fn collect_adjacent_attestations<F>(
    current_index: usize,
    count: usize,
    mut load: F,
) -> Result<Vec<Attestation>>
where
    F: FnMut(usize) -> Result<Instruction>,
{
    require!(count > 0, WagerError::MissingOrInvalidSignatureAdjacency);
    require!(current_index >= count, WagerError::MissingOrInvalidSignatureAdjacency);

    let first = current_index - count;
    (first..current_index)
        .map(|i| {
            let ix = load(i).map_err(|_| error!(WagerError::MissingOrInvalidSignatureAdjacency))?;
            parse_ed25519_ix(&ix)
        })
        .collect()
}

/// Same as [`collect_adjacent_attestations`], reading the instructions sysvar.
pub fn load_adjacent_attestations(
    instructions_sysvar: &AccountInfo,
    count: usize,
) -> Result<Vec<Attestation>> {
    let current = load_current_index_checked(instructions_sysvar)? as usize;
    collect_adjacent_attestations(current, count, |i| {
        load_instruction_at_checked(i, instructions_sysvar).map_err(Into::into)
    })
}

pub fn assert_attestation(att: &Attestation, signer: &Pubkey, message: &[u8]) -> Result<()> {
    require_keys_eq!(att.signer, *signer, WagerError::SignerMismatch);
    require!(att.message.as_slice() == message, WagerError::MessageMismatch);
    Ok(())
}

/// Builds a self-contained Ed25519 verify instruction, as relayers place it
/// in front of a signed commit/reveal or an oracle pulse.
pub fn ed25519_verify_ix(signer: &Pubkey, signature: &[u8; 64], msg: &[u8]) -> Instruction {
    let sig_off = HEADER_LEN;
    let pk_off = sig_off + SIGNATURE_LEN;
    let msg_off = pk_off + PUBKEY_LEN;

    let mut data = vec![0u8; msg_off + msg.len()];
    data[0] = 1;

    let mut put = |at: usize, v: u16| data[at..at + 2].copy_from_slice(&v.to_le_bytes());
    put(2, sig_off as u16);
    put(4, SELF_CONTAINED);
    put(6, pk_off as u16);
    put(8, SELF_CONTAINED);
    put(10, msg_off as u16);
    put(12, msg.len() as u16);
    put(14, SELF_CONTAINED);

    data[sig_off..sig_off + SIGNATURE_LEN].copy_from_slice(signature);
    data[pk_off..pk_off + PUBKEY_LEN].copy_from_slice(signer.as_ref());
    data[msg_off..].copy_from_slice(msg);

    Instruction {
        program_id: ed25519_program_id(),
        accounts: vec![],
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::assert_err;

    fn verify_ix(signer: &Pubkey, msg: &[u8]) -> Instruction {
        ed25519_verify_ix(signer, &[0u8; 64], msg)
    }

    fn other_ix() -> Instruction {
        Instruction {
            program_id: Pubkey::new_unique(),
            accounts: vec![],
            data: vec![1, 2, 3],
        }
    }

    fn loader(tx: Vec<Instruction>) -> impl FnMut(usize) -> Result<Instruction> {
        move |i| {
            tx.get(i)
                .cloned()
                .ok_or_else(|| anchor_lang::error::Error::from(ProgramError::InvalidArgument))
        }
    }

    #[test]
    fn parses_self_contained_instruction() {
        let user = Pubkey::new_unique();
        let ix = verify_ix(&user, b"hello-world");

        let att = parse_ed25519_ix(&ix).unwrap();
        assert_eq!(att.signer, user);
        assert_eq!(att.message, b"hello-world".to_vec());
    }

    #[test]
    fn rejects_foreign_instruction_indices() {
        let user = Pubkey::new_unique();
        // signature, pubkey and message instruction-index fields
        for (at, index) in [(4usize, 0u16), (8, 3), (14, 7)] {
            let mut ix = verify_ix(&user, b"evil-msg");
            ix.data[at..at + 2].copy_from_slice(&index.to_le_bytes());
            assert!(parse_ed25519_ix(&ix).is_err());
        }
    }

    #[test]
    fn rejects_wrong_program_and_truncated_data() {
        let user = Pubkey::new_unique();
        let mut ix = verify_ix(&user, b"m");
        ix.program_id = Pubkey::new_unique();
        assert!(parse_ed25519_ix(&ix).is_err());

        let mut ix = verify_ix(&user, b"message");
        ix.data.truncate(ix.data.len() - 1);
        assert!(parse_ed25519_ix(&ix).is_err());

        let mut ix = verify_ix(&user, b"m");
        ix.data[0] = 2;
        assert!(parse_ed25519_ix(&ix).is_err());
    }

    #[test]
    fn collects_only_the_immediately_preceding_instructions() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let tx = vec![
            other_ix(),
            verify_ix(&a, b"one"),
            verify_ix(&b, b"two"),
            other_ix(), // the program instruction itself
        ];

        let atts = collect_adjacent_attestations(3, 2, loader(tx)).unwrap();
        assert_eq!(atts[0].signer, a);
        assert_eq!(atts[1].signer, b);
        assert_eq!(atts[1].message, b"two".to_vec());
    }

    #[test]
    fn verify_instruction_elsewhere_in_tx_is_not_enough() {
        let a = Pubkey::new_unique();
        // [ed25519, compute-budget-like, program]: present but not adjacent
        let tx = vec![verify_ix(&a, b"one"), other_ix(), other_ix()];
        assert_err(
            collect_adjacent_attestations(2, 1, loader(tx)),
            WagerError::MissingOrInvalidSignatureAdjacency,
        );

        // nothing before the program instruction
        let tx = vec![other_ix()];
        assert_err(
            collect_adjacent_attestations(0, 1, loader(tx)),
            WagerError::MissingOrInvalidSignatureAdjacency,
        );
    }

    #[test]
    fn assert_attestation_distinguishes_signer_and_message() {
        let user = Pubkey::new_unique();
        let att = parse_ed25519_ix(&verify_ix(&user, b"good")).unwrap();

        assert!(assert_attestation(&att, &user, b"good").is_ok());
        assert_err(
            assert_attestation(&att, &Pubkey::new_unique(), b"good"),
            WagerError::SignerMismatch,
        );
        assert_err(assert_attestation(&att, &user, b"bad"), WagerError::MessageMismatch);
    }
}
