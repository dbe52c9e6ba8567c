//! # Poseidon Hash
//!
//! Circom-compatible Poseidon over the BN254 scalar field (x^5 S-box, 8 full
//! rounds), backed by `light-poseidon`. This is the only hash used for tree
//! nodes, claim index/value hashes, identity states and query commitments.
//!
//! ## Arity
//!
//! The fixed-arity hash accepts 1 to [`MAX_INPUTS`] elements. Longer arrays
//! go through [`sponge_hash`], which absorbs them in frames:
//!
//! 1. The frame starts zero-filled.
//! 2. Inputs fill the frame left to right.
//! 3. When the frame is full it is hashed; the next frame starts with that
//!    hash in position 0 and the remaining positions zero.
//! 4. A partially filled trailing frame is hashed as-is.
//!
//! Trailing zero inputs therefore change the result only when they complete
//! a frame.

use ark_bn254::Fr;
use light_poseidon::{Poseidon, PoseidonHasher};
use zkid_core::{CryptoError, FieldElement};

/// Largest input count the fixed-arity hash accepts.
pub const MAX_INPUTS: usize = 12;

/// Smallest sponge frame.
pub const MIN_FRAME_SIZE: usize = 2;

/// Hash between 1 and [`MAX_INPUTS`] field elements.
pub fn hash(inputs: &[FieldElement]) -> Result<FieldElement, CryptoError> {
    if inputs.is_empty() {
        return Err(CryptoError::EmptyInput);
    }
    let mut hasher =
        Poseidon::<Fr>::new_circom(inputs.len()).map_err(|e| CryptoError::Poseidon(e.to_string()))?;
    let fr: Vec<Fr> = inputs.iter().map(|x| x.inner()).collect();
    hasher
        .hash(&fr)
        .map(FieldElement::from)
        .map_err(|e| CryptoError::Poseidon(e.to_string()))
}

/// `Poseidon(a)`.
pub fn hash1(a: FieldElement) -> Result<FieldElement, CryptoError> {
    hash(&[a])
}

/// `Poseidon(a, b)`.
pub fn hash2(a: FieldElement, b: FieldElement) -> Result<FieldElement, CryptoError> {
    hash(&[a, b])
}

/// `Poseidon(a, b, c)`.
pub fn hash3(a: FieldElement, b: FieldElement, c: FieldElement) -> Result<FieldElement, CryptoError> {
    hash(&[a, b, c])
}

/// Hash an arbitrary-length array by absorbing it in frames of `frame_size`.
pub fn sponge_hash(inputs: &[FieldElement], frame_size: usize) -> Result<FieldElement, CryptoError> {
    if !(MIN_FRAME_SIZE..=MAX_INPUTS).contains(&frame_size) {
        return Err(CryptoError::InvalidFrameSize {
            frame_size,
            min: MIN_FRAME_SIZE,
            max: MAX_INPUTS,
        });
    }
    if inputs.is_empty() {
        return Err(CryptoError::EmptyInput);
    }

    let mut frame = vec![FieldElement::zero(); frame_size];
    let mut digest = FieldElement::zero();
    let mut dirty = false;
    let mut k = 0;
    for input in inputs {
        dirty = true;
        frame[k] = *input;
        if k == frame_size - 1 {
            digest = hash(&frame)?;
            dirty = false;
            frame.iter_mut().for_each(|x| *x = FieldElement::zero());
            frame[0] = digest;
            k = 1;
        } else {
            k += 1;
        }
    }
    if dirty {
        digest = hash(&frame)?;
    }
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(v: u64) -> FieldElement {
        FieldElement::from_u64(v)
    }

    // circomlib reference vectors
    #[test]
    fn circom_vector_one_input() {
        assert_eq!(
            hash1(fe(1)).unwrap().to_decimal(),
            "18586133768512220936620570745912940619677854269274689475585506675881198879027"
        );
    }

    #[test]
    fn circom_vector_two_inputs() {
        assert_eq!(
            hash2(fe(1), fe(2)).unwrap().to_decimal(),
            "7853200120776062878684798364095072458815029376092732009249414926327459813530"
        );
    }

    #[test]
    fn empty_input_rejected() {
        assert_eq!(hash(&[]), Err(CryptoError::EmptyInput));
        assert_eq!(sponge_hash(&[], 6), Err(CryptoError::EmptyInput));
    }

    #[test]
    fn too_many_inputs_rejected() {
        let inputs = vec![fe(1); MAX_INPUTS + 1];
        assert!(matches!(hash(&inputs), Err(CryptoError::Poseidon(_))));
    }

    #[test]
    fn frame_size_bounds() {
        assert!(matches!(
            sponge_hash(&[fe(1)], 1),
            Err(CryptoError::InvalidFrameSize { frame_size: 1, .. })
        ));
        assert!(matches!(
            sponge_hash(&[fe(1)], 13),
            Err(CryptoError::InvalidFrameSize { frame_size: 13, .. })
        ));
    }

    #[test]
    fn sponge_of_short_input_is_zero_padded_hash() {
        let direct = hash(&[fe(1), fe(2), fe(0), fe(0), fe(0), fe(0)]).unwrap();
        assert_eq!(sponge_hash(&[fe(1), fe(2)], 6).unwrap(), direct);
    }

    #[test]
    fn sponge_chains_full_frames() {
        let inputs: Vec<FieldElement> = (1..=8).map(fe).collect();
        let first = hash(&inputs[..6]).unwrap();
        let expected = hash(&[first, fe(7), fe(8), fe(0), fe(0), fe(0)]).unwrap();
        assert_eq!(sponge_hash(&inputs, 6).unwrap(), expected);
    }

    #[test]
    fn sponge_exact_frame_has_no_trailing_hash() {
        let inputs: Vec<FieldElement> = (1..=6).map(fe).collect();
        assert_eq!(sponge_hash(&inputs, 6).unwrap(), hash(&inputs).unwrap());
    }
}
