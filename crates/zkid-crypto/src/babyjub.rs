//! # Baby Jubjub EdDSA-Poseidon
//!
//! EdDSA over the twisted Edwards curve
//! `168700·x² + y² = 1 + 168696·x²·y²` defined over the BN254 scalar field,
//! with the message digest computed by Poseidon so that circuits can verify
//! signatures natively.
//!
//! The curve is declared here in that form. `ark-ed-on-bn254` ships the
//! same group rescaled to `a = 1`, whose coordinates circuits do not use;
//! only its scalar field is reused.
//!
//! ## Algorithm
//!
//! - Key expansion: `h = BLAKE-512(sk)`; the low half is pruned
//!   (`h[0] &= 0xF8; h[31] &= 0x7F; h[31] |= 0x40`) and read as a
//!   little-endian scalar `s`. The public key is `A = B8·(s >> 3)`.
//! - Signing `m`: `r = LE(BLAKE-512(h[32..64] ‖ LE32(m))) mod l`,
//!   `R8 = B8·r`, `hm = Poseidon(R8.x, R8.y, A.x, A.y, m)`,
//!   `S = (r + hm·s) mod l`.
//! - Verification: `B8·S == R8 + A·(8·hm)`.
//!
//! ## Security Invariant
//!
//! `PrivateKey` is zeroized on drop, is not `Serialize`, and its `Debug`
//! output never includes key material.

use ark_ec::twisted_edwards::{Affine, MontCurveConfig, TECurveConfig};
use ark_ec::{AffineRepr, CurveConfig, CurveGroup};
use ark_ed_on_bn254::Fr as Scalar;
use ark_ff::{BigInteger, MontFp, PrimeField};
use blake_hash::{Blake512, Digest};
use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};
use zkid_core::{hex, CryptoError, FieldElement};

use crate::poseidon;

/// x coordinate of the prime-order base point `B8`.
pub const B8_X: &str =
    "5299619240641551281634865583518297030282874472190772894086521144482721001553";
/// y coordinate of the prime-order base point `B8`.
pub const B8_Y: &str =
    "16950150798460657717958625567821834550301663161624707787222815936182638968203";
/// Order of the prime subgroup generated by `B8`.
pub const SUBGROUP_ORDER: &str =
    "2736030358979909402780800718157159386076813972158567259200215660948447373041";

// ---------------------------------------------------------------------------
// Curve parameters
// ---------------------------------------------------------------------------

/// Baby Jubjub with `a = 168700`, `d = 168696` and generator `B8`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BabyJubjubConfig;

type BabyJubjub = Affine<BabyJubjubConfig>;

impl CurveConfig for BabyJubjubConfig {
    type BaseField = ark_bn254::Fr;
    type ScalarField = Scalar;

    const COFACTOR: &'static [u64] = &[8];
    const COFACTOR_INV: Scalar =
        MontFp!("2394026564107420727433200628387514462817212225638746351800188703329891451411");
}

impl TECurveConfig for BabyJubjubConfig {
    const COEFF_A: ark_bn254::Fr = MontFp!("168700");
    const COEFF_D: ark_bn254::Fr = MontFp!("168696");
    const GENERATOR: BabyJubjub = BabyJubjub::new_unchecked(
        MontFp!("5299619240641551281634865583518297030282874472190772894086521144482721001553"),
        MontFp!("16950150798460657717958625567821834550301663161624707787222815936182638968203"),
    );

    type MontCurveConfig = Self;
}

// Montgomery form: A = 2(a + d) / (a - d), B = 4 / (a - d).
impl MontCurveConfig for BabyJubjubConfig {
    const COEFF_A: ark_bn254::Fr = MontFp!("168698");
    const COEFF_B: ark_bn254::Fr = MontFp!("1");

    type TECurveConfig = Self;
}

// ---------------------------------------------------------------------------
// Points
// ---------------------------------------------------------------------------

/// A curve point in affine coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: FieldElement,
    pub y: FieldElement,
}

impl Point {
    /// The base point `B8`.
    pub fn base() -> Self {
        Self::from_affine(BabyJubjubConfig::GENERATOR)
    }

    /// Check the curve equation.
    pub fn is_on_curve(&self) -> bool {
        BabyJubjub::new_unchecked(self.x.inner(), self.y.inner()).is_on_curve()
    }

    fn to_affine(self) -> Result<BabyJubjub, CryptoError> {
        let p = BabyJubjub::new_unchecked(self.x.inner(), self.y.inner());
        if !p.is_on_curve() {
            return Err(CryptoError::KeyError("point is not on the curve".into()));
        }
        Ok(p)
    }

    fn from_affine(p: BabyJubjub) -> Self {
        Self {
            x: FieldElement::from(p.x),
            y: FieldElement::from(p.y),
        }
    }

    /// Scalar multiplication. The scalar is reduced modulo the subgroup order.
    pub fn mul_scalar(&self, scalar: &BigUint) -> Result<Self, CryptoError> {
        let p = self.to_affine()?;
        Ok(Self::from_affine((p * to_scalar(scalar)).into_affine()))
    }

    /// Point addition.
    pub fn add(&self, other: &Self) -> Result<Self, CryptoError> {
        let sum = self.to_affine()?.into_group() + other.to_affine()?;
        Ok(Self::from_affine(sum.into_affine()))
    }
}

fn subgroup_order() -> BigUint {
    BigUint::from_bytes_le(&Scalar::MODULUS.to_bytes_le())
}

fn to_scalar(v: &BigUint) -> Scalar {
    Scalar::from_le_bytes_mod_order(&v.to_bytes_le())
}

fn blake512(parts: &[&[u8]]) -> [u8; 64] {
    let mut hasher = Blake512::default();
    for part in parts {
        hasher.update(*part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 64];
    out.copy_from_slice(&digest);
    out
}

/// A Baby Jubjub public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    pub x: FieldElement,
    pub y: FieldElement,
}

impl PublicKey {
    /// Wrap coordinates, rejecting points off the curve.
    pub fn new(x: FieldElement, y: FieldElement) -> Result<Self, CryptoError> {
        let point = Point { x, y };
        if !point.is_on_curve() {
            return Err(CryptoError::KeyError("public key is not on the curve".into()));
        }
        Ok(Self { x, y })
    }

    /// The key as a curve point.
    pub fn point(&self) -> Point {
        Point {
            x: self.x,
            y: self.y,
        }
    }

    /// Verify an EdDSA-Poseidon signature over `message`.
    pub fn verify_poseidon(
        &self,
        message: FieldElement,
        signature: &Signature,
    ) -> Result<(), CryptoError> {
        let s = signature.s.to_biguint();
        if s >= subgroup_order() {
            return Err(CryptoError::VerificationFailed(
                "S is not below the subgroup order".into(),
            ));
        }
        let r8 = signature.r8.to_affine()?;
        let a = self.point().to_affine()?;
        let hm = poseidon::hash(&[
            signature.r8.x,
            signature.r8.y,
            self.x,
            self.y,
            message,
        ])?;
        let hm8 = to_scalar(&(hm.to_biguint() * 8u32));
        let b8 = BabyJubjubConfig::GENERATOR;

        let left = b8 * to_scalar(&s);
        let right = r8.into_group() + (a * hm8).into_affine();
        if left.into_affine() != right.into_affine() {
            return Err(CryptoError::VerificationFailed(
                "signature equation does not hold".into(),
            ));
        }
        Ok(())
    }
}

/// An EdDSA-Poseidon signature `(R8, S)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub r8: Point,
    pub s: FieldElement,
}

/// A 32-byte Baby Jubjub private key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Wrap raw key bytes. Any 32 bytes are a valid key.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse a 64-character hex string (an optional `0x` prefix is accepted).
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        hex::decode_array(s)
            .map(Self)
            .map_err(|e| CryptoError::KeyError(format!("private key: {e}")))
    }

    /// Draw a fresh key from a cryptographic RNG.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    fn expanded(&self) -> [u8; 64] {
        let mut h = blake512(&[&self.0]);
        h[0] &= 0xF8;
        h[31] &= 0x7F;
        h[31] |= 0x40;
        h
    }

    /// The secret scalar `s >> 3`.
    fn scalar(&self) -> BigUint {
        let mut h = self.expanded();
        let s = BigUint::from_bytes_le(&h[..32]) >> 3u32;
        h.zeroize();
        s
    }

    /// Derive the public key `B8·(s >> 3)`.
    pub fn public(&self) -> Result<PublicKey, CryptoError> {
        let a = Point::base().mul_scalar(&self.scalar())?;
        Ok(PublicKey { x: a.x, y: a.y })
    }

    /// Sign a single field element.
    pub fn sign_poseidon(&self, message: FieldElement) -> Result<Signature, CryptoError> {
        let mut h = self.expanded();
        let msg = message.to_le_bytes();
        let r = BigUint::from_bytes_le(&blake512(&[&h[32..], &msg])) % subgroup_order();
        h.zeroize();

        let r8 = Point::base().mul_scalar(&r)?;
        let a = self.public()?;
        let hm = poseidon::hash(&[r8.x, r8.y, a.x, a.y, message])?;
        let s = (r + hm.to_biguint() * (self.scalar() << 3u32)) % subgroup_order();
        Ok(Signature {
            r8,
            s: FieldElement::from_biguint(&s)?,
        })
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_HEX: &str = "28156abe7fe2fd433dc9df969286b96666489bac508612d0e16593e944c4f69f";

    #[test]
    fn base_point_is_on_curve() {
        assert!(Point::base().is_on_curve());
    }

    #[test]
    fn base_point_matches_published_coordinates() {
        let b8 = Point::base();
        assert_eq!(b8.x, FieldElement::from_decimal(B8_X).unwrap());
        assert_eq!(b8.y, FieldElement::from_decimal(B8_Y).unwrap());
    }

    #[test]
    fn base_point_has_subgroup_order() {
        let order = BigUint::parse_bytes(SUBGROUP_ORDER.as_bytes(), 10).unwrap();
        assert_eq!(order, subgroup_order());
        assert!(BabyJubjubConfig::GENERATOR.is_in_correct_subgroup_assuming_on_curve());
    }

    #[test]
    fn rescaled_curve_coordinates_rejected() {
        // the a = 1 form's generator is not a point of this curve
        let rescaled = ark_ed_on_bn254::EdwardsAffine::generator();
        let p = Point {
            x: FieldElement::from(rescaled.x),
            y: FieldElement::from(rescaled.y),
        };
        assert!(!p.is_on_curve());
    }

    #[test]
    fn circomlib_public_key_vector() {
        let sk = PrivateKey::from_hex("0001020304050607080900010203040506070809000102030405060708090001")
            .unwrap();
        let pk = sk.public().unwrap();
        assert_eq!(
            pk.x.to_decimal(),
            "13277427435165878497778222415993513565335242147425444199013288855685581939618"
        );
        assert_eq!(
            pk.y.to_decimal(),
            "13622229784656158136036771217484571176836296686641868549125388198837476602820"
        );
    }

    #[test]
    fn public_key_is_on_curve() {
        let sk = PrivateKey::from_hex(KEY_HEX).unwrap();
        let pk = sk.public().unwrap();
        assert!(pk.point().is_on_curve());
        assert_eq!(PublicKey::new(pk.x, pk.y).unwrap(), pk);
    }

    #[test]
    fn off_curve_public_key_rejected() {
        let err = PublicKey::new(FieldElement::from_u64(1), FieldElement::from_u64(2));
        assert!(matches!(err, Err(CryptoError::KeyError(_))));
    }

    #[test]
    fn sign_then_verify() {
        let sk = PrivateKey::from_hex(KEY_HEX).unwrap();
        let pk = sk.public().unwrap();
        let msg = FieldElement::from_u64(42);
        let sig = sk.sign_poseidon(msg).unwrap();
        assert!(pk.verify_poseidon(msg, &sig).is_ok());
    }

    #[test]
    fn verify_rejects_other_message() {
        let sk = PrivateKey::from_hex(KEY_HEX).unwrap();
        let pk = sk.public().unwrap();
        let sig = sk.sign_poseidon(FieldElement::from_u64(42)).unwrap();
        assert!(matches!(
            pk.verify_poseidon(FieldElement::from_u64(43), &sig),
            Err(CryptoError::VerificationFailed(_))
        ));
    }

    #[test]
    fn verify_rejects_other_key() {
        let sk = PrivateKey::from_hex(KEY_HEX).unwrap();
        let other = PrivateKey::from_bytes([7u8; 32]).public().unwrap();
        let msg = FieldElement::from_u64(42);
        let sig = sk.sign_poseidon(msg).unwrap();
        assert!(other.verify_poseidon(msg, &sig).is_err());
    }

    #[test]
    fn signing_is_deterministic() {
        let sk = PrivateKey::from_hex(KEY_HEX).unwrap();
        let msg = FieldElement::from_u64(9);
        assert_eq!(sk.sign_poseidon(msg).unwrap(), sk.sign_poseidon(msg).unwrap());
    }

    #[test]
    fn hex_prefix_and_length() {
        let a = PrivateKey::from_hex(KEY_HEX).unwrap();
        let b = PrivateKey::from_hex(&format!("0x{KEY_HEX}")).unwrap();
        assert_eq!(a.public().unwrap(), b.public().unwrap());
        assert!(PrivateKey::from_hex("abcd").is_err());
    }

    #[test]
    fn debug_redacts_key() {
        let sk = PrivateKey::from_hex(KEY_HEX).unwrap();
        assert!(!format!("{sk:?}").contains("28156abe"));
    }

    #[test]
    fn generated_keys_differ() {
        let mut rng = rand::thread_rng();
        let a = PrivateKey::generate(&mut rng).public().unwrap();
        let b = PrivateKey::generate(&mut rng).public().unwrap();
        assert_ne!(a, b);
    }
}
