use crate::crypto::{hash_to_group, GroupElement};
use std::sync::OnceLock;

/// The fixed generator set of the credential scheme. Nothing-up-my-sleeve:
/// every point is hash-to-group over its own label, so no party knows any
/// discrete-log relation between them.
///
/// `Gw`/`Gwp` commit the issuer key, `Gx0`/`Gx1`/`Gv`/`Ga` carry the MAC
/// and its randomized presentation, `Gg`/`Gh` are the Pedersen value and
/// randomness generators, and `Gs` carries serial numbers.
#[derive(Debug, Clone)]
pub struct Generators {
    pub gw: GroupElement,
    pub gwp: GroupElement,
    pub gx0: GroupElement,
    pub gx1: GroupElement,
    pub gv: GroupElement,
    pub ga: GroupElement,
    pub gg: GroupElement,
    pub gh: GroupElement,
    pub gs: GroupElement,
}

const DOMAIN: &[u8] = b"wabisabi-generators-v1";

impl Generators {
    fn derive() -> Self {
        Generators {
            gw: hash_to_group(DOMAIN, b"Gw"),
            gwp: hash_to_group(DOMAIN, b"Gwp"),
            gx0: hash_to_group(DOMAIN, b"Gx0"),
            gx1: hash_to_group(DOMAIN, b"Gx1"),
            gv: hash_to_group(DOMAIN, b"Gv"),
            ga: hash_to_group(DOMAIN, b"Ga"),
            gg: hash_to_group(DOMAIN, b"Gg"),
            gh: hash_to_group(DOMAIN, b"Gh"),
            gs: hash_to_group(DOMAIN, b"Gs"),
        }
    }
}

/// The process-wide generator set. Deriving it costs nine hash-to-group
/// operations, so it is computed once and cached.
pub fn generators() -> &'static Generators {
    static GENERATORS: OnceLock<Generators> = OnceLock::new();
    GENERATORS.get_or_init(Generators::derive)
}
