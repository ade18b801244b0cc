//! Random DNS label
//!
//! Public IP labels must be unique across the region, so every run draws a
//! fresh suffix. This is the only input that differs between two runs with
//! the same configuration.

use crate::error::Result;
use crate::resources::{RandomStringArgs, types};
use gameserver_cloud::{Output, Stack};
use rand::Rng;

pub const SUFFIX_LENGTH: usize = 8;
pub const LABEL_RESOURCE_NAME: &str = "domain-label";

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// `len` characters of lowercase ASCII letters and digits
pub fn random_suffix(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

fn join_label(seed: &str, suffix: &str) -> String {
    format!("{}-{}", seed, suffix)
}

/// `<seed>-<8 random chars>`
pub fn dns_label(seed: &str) -> String {
    join_label(seed, &random_suffix(SUFFIX_LENGTH))
}

/// Registers the random suffix as a `random:RandomString` resource and
/// returns the full label, available once that resource exists.
pub fn declare_dns_label(stack: &mut Stack, seed: &str) -> Result<Output<String>> {
    let suffix = random_suffix(SUFFIX_LENGTH);
    let label = join_label(seed, &suffix);

    let args = RandomStringArgs {
        length: SUFFIX_LENGTH,
        upper: false,
        special: false,
        result: suffix,
    };
    let state = stack.register(types::RANDOM_STRING, LABEL_RESOURCE_NAME, Output::known(args))?;
    tracing::debug!(label = %label, "Drew DNS label");

    Ok(state.map(move |_| label))
}
