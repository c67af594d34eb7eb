//! Meta-address types.
//!
//! A [`MetaAddress`] is a recipient's long-lived identity: two independent
//! key pairs. Only its public half, [`PublicMetaAddress`], ever leaves the
//! recipient.

use serde::{Deserialize, Serialize};

use super::{decode_prefixed_hex, KeyPair, PrivateKey, PublicKey};
use crate::constants::{COMPRESSED_PUBLIC_KEY_SIZE, META_ADDRESS_PAYLOAD_SIZE, META_ADDRESS_PREFIX};
use crate::error::{Result, ShadeError};

// ═══════════════════════════════════════════════════════════════════════════════
// FULL META-ADDRESS (PRIVATE)
// ═══════════════════════════════════════════════════════════════════════════════

/// A recipient's complete meta-address, private halves included.
///
/// The spend and viewing pairs must come from independent entropy draws.
#[derive(Clone, Debug)]
pub struct MetaAddress {
    spend: KeyPair,
    viewing: KeyPair,
}

impl MetaAddress {
    /// Assembles a meta-address from two key pairs.
    pub fn new(spend: KeyPair, viewing: KeyPair) -> Self {
        Self { spend, viewing }
    }

    /// Spend key pair.
    pub fn spend(&self) -> &KeyPair {
        &self.spend
    }

    /// Viewing key pair.
    pub fn viewing(&self) -> &KeyPair {
        &self.viewing
    }

    /// Spend private key. Grants spending authority over stealth addresses.
    pub fn spend_private_key(&self) -> &PrivateKey {
        &self.spend.private
    }

    /// Spend public key.
    pub fn spend_public_key(&self) -> &PublicKey {
        &self.spend.public
    }

    /// Viewing private key. Enough to find payments, not to spend them.
    pub fn viewing_private_key(&self) -> &PrivateKey {
        &self.viewing.private
    }

    /// Viewing public key.
    pub fn viewing_public_key(&self) -> &PublicKey {
        &self.viewing.public
    }

    /// The publishable half.
    pub fn public(&self) -> PublicMetaAddress {
        PublicMetaAddress {
            spend_public_key: self.spend.public,
            viewing_public_key: self.viewing.public,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PUBLIC META-ADDRESS
// ═══════════════════════════════════════════════════════════════════════════════

/// The publishable half of a meta-address.
///
/// # Text encoding
/// ```text
/// st:eth:0x<spend pubkey (33 bytes)><viewing pubkey (33 bytes)>
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicMetaAddress {
    /// Spend public key
    pub spend_public_key: PublicKey,
    /// Viewing public key
    pub viewing_public_key: PublicKey,
}

impl PublicMetaAddress {
    /// Creates a public meta-address.
    pub fn new(spend_public_key: PublicKey, viewing_public_key: PublicKey) -> Self {
        Self {
            spend_public_key,
            viewing_public_key,
        }
    }

    /// Returns the 66-byte binary payload (spend || viewing).
    pub fn to_bytes(&self) -> [u8; META_ADDRESS_PAYLOAD_SIZE] {
        let mut out = [0u8; META_ADDRESS_PAYLOAD_SIZE];
        out[..COMPRESSED_PUBLIC_KEY_SIZE].copy_from_slice(self.spend_public_key.as_bytes());
        out[COMPRESSED_PUBLIC_KEY_SIZE..].copy_from_slice(self.viewing_public_key.as_bytes());
        out
    }

    /// Parses the 66-byte binary payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != META_ADDRESS_PAYLOAD_SIZE {
            return Err(ShadeError::InvalidMetaAddress(format!(
                "payload must be {} bytes, got {}",
                META_ADDRESS_PAYLOAD_SIZE,
                bytes.len()
            )));
        }

        let (spend, viewing) = bytes.split_at(COMPRESSED_PUBLIC_KEY_SIZE);
        let spend_public_key = PublicKey::from_bytes(spend)
            .map_err(|e| ShadeError::InvalidMetaAddress(format!("spend key: {}", e)))?;
        let viewing_public_key = PublicKey::from_bytes(viewing)
            .map_err(|e| ShadeError::InvalidMetaAddress(format!("viewing key: {}", e)))?;

        if spend_public_key == viewing_public_key {
            return Err(ShadeError::InvalidMetaAddress(
                "spend and viewing keys must differ".into(),
            ));
        }

        Ok(Self::new(spend_public_key, viewing_public_key))
    }

    /// Encodes as `st:eth:0x...`.
    pub fn encode(&self) -> String {
        format!("{}0x{}", META_ADDRESS_PREFIX, hex::encode(self.to_bytes()))
    }

    /// Parses the `st:eth:0x...` text form.
    pub fn parse(s: &str) -> Result<Self> {
        let payload = s.trim().strip_prefix(META_ADDRESS_PREFIX).ok_or_else(|| {
            ShadeError::InvalidMetaAddress(format!("missing '{}' prefix", META_ADDRESS_PREFIX))
        })?;
        let bytes = decode_prefixed_hex(payload)
            .map_err(|e| ShadeError::InvalidMetaAddress(e.to_string()))?;
        Self::from_bytes(&bytes)
    }
}

impl std::fmt::Display for PublicMetaAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.encode())
    }
}

impl std::str::FromStr for PublicMetaAddress {
    type Err = ShadeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pk(prefix: u8, fill: u8) -> PublicKey {
        let mut bytes = [fill; COMPRESSED_PUBLIC_KEY_SIZE];
        bytes[0] = prefix;
        PublicKey::from_array(bytes).unwrap()
    }

    #[test]
    fn test_encode_parse_roundtrip() {
        let meta = PublicMetaAddress::new(pk(0x02, 0x11), pk(0x03, 0x22));
        let encoded = meta.encode();

        assert!(encoded.starts_with("st:eth:0x"));
        assert_eq!(encoded.len(), META_ADDRESS_PREFIX.len() + 2 + META_ADDRESS_PAYLOAD_SIZE * 2);
        assert_eq!(PublicMetaAddress::parse(&encoded).unwrap(), meta);
        assert_eq!(encoded.parse::<PublicMetaAddress>().unwrap(), meta);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(PublicMetaAddress::parse("0x1234").is_err());
        assert!(PublicMetaAddress::parse("st:eth:0x1234").is_err());
        assert!(PublicMetaAddress::parse("st:eth:0xzz").is_err());

        let same = PublicMetaAddress::new(pk(0x02, 0x11), pk(0x02, 0x11));
        let result = PublicMetaAddress::parse(&same.encode());
        assert!(matches!(result, Err(ShadeError::InvalidMetaAddress(_))));
    }

    #[test]
    fn test_from_bytes_bad_prefix() {
        let mut bytes = PublicMetaAddress::new(pk(0x02, 0x11), pk(0x03, 0x22)).to_bytes();
        bytes[COMPRESSED_PUBLIC_KEY_SIZE] = 0x05;
        assert!(matches!(
            PublicMetaAddress::from_bytes(&bytes),
            Err(ShadeError::InvalidMetaAddress(_))
        ));
    }

    #[test]
    fn test_serde_json() {
        let meta = PublicMetaAddress::new(pk(0x02, 0x11), pk(0x03, 0x22));
        let json = serde_json::to_string(&meta).unwrap();
        assert!(json.contains("spend_public_key"));
        let back: PublicMetaAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }

    #[test]
    fn test_meta_address_accessors() {
        let mut one = [0u8; 32];
        one[31] = 1;
        let mut two = [0u8; 32];
        two[31] = 2;

        let spend = KeyPair::new(PrivateKey::from_array(one).unwrap(), pk(0x02, 0x11));
        let viewing = KeyPair::new(PrivateKey::from_array(two).unwrap(), pk(0x03, 0x22));
        let meta = MetaAddress::new(spend, viewing);

        assert_eq!(meta.spend_private_key().as_bytes(), &one);
        assert_eq!(meta.viewing_private_key().as_bytes(), &two);
        assert_eq!(meta.public().spend_public_key, *meta.spend_public_key());
        assert_eq!(meta.public().viewing_public_key, *meta.viewing_public_key());
        assert!(format!("{:?}", meta).contains("REDACTED"));
    }
}
