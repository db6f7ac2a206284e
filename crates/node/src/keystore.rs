// node/src/keystore.rs
use serde::{Deserialize, Serialize};
use subnet_types::Hotkey;

/// Named interface for the node's signing identity. Real identity-file
/// cryptographic loading (key derivation, signature production) is out of
/// scope here, the same way `chain_adapter::StubRpcChainAdapter` names the
/// RPC wire boundary without implementing it; this trait is the seam a
/// production keystore would plug into `Node`.
pub trait Keystore: Send + Sync {
    /// The on-chain signing identity this keystore holds.
    fn hotkey(&self) -> Hotkey;
}

#[derive(Debug, Serialize, Deserialize)]
struct IdentityFile {
    hotkey: String,
}

/// Reads a hotkey from a plain JSON identity file. Holds no private key
/// material and performs no signing -- a production keystore would replace
/// this with encrypted storage and the chain's actual signature scheme.
pub struct FileKeystore {
    hotkey: Hotkey,
}

impl FileKeystore {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading identity file {path}: {e}"))?;
        let identity: IdentityFile = serde_json::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("parsing identity file {path}: {e}"))?;
        let hotkey: Hotkey = identity
            .hotkey
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid hotkey in {path}: {e}"))?;
        Ok(Self { hotkey })
    }

    /// Writes a freshly generated identity file at `path`. Used by the
    /// `init` CLI subcommand; the "key" here is just random bytes, not a
    /// real keypair, since no signature scheme is wired up yet.
    pub fn generate(path: &str) -> anyhow::Result<Hotkey> {
        let mut bytes = [0u8; 32];
        for b in bytes.iter_mut() {
            *b = rand::random();
        }
        let hotkey = Hotkey::new(bytes);
        let identity = IdentityFile {
            hotkey: hotkey.to_string(),
        };
        let contents = serde_json::to_string_pretty(&identity)?;
        std::fs::write(path, contents)?;
        Ok(hotkey)
    }
}

impl Keystore for FileKeystore {
    fn hotkey(&self) -> Hotkey {
        self.hotkey
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_then_load_round_trips_the_hotkey() {
        let path = std::env::temp_dir().join(format!(
            "subnet-node-keystore-test-{}-{}.json",
            std::process::id(),
            rand::random::<u32>()
        ));
        let path = path.to_str().unwrap();

        let generated = FileKeystore::generate(path).unwrap();
        let loaded = FileKeystore::load(path).unwrap();

        assert_eq!(loaded.hotkey(), generated);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn load_rejects_malformed_identity_file() {
        let path = std::env::temp_dir().join(format!(
            "subnet-node-keystore-bad-{}-{}.json",
            std::process::id(),
            rand::random::<u32>()
        ));
        let path = path.to_str().unwrap();
        std::fs::write(path, "not json").unwrap();

        assert!(FileKeystore::load(path).is_err());
        std::fs::remove_file(path).ok();
    }
}
