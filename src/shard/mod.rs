//! Sharding strategy — deterministically maps an entity's identity
//! (and, for `date`, a timestamp) to a logical shard path. Pure and
//! deterministic: same inputs always produce the same path.

use crate::config::{DateFormat, GraphConfig, ShardStrategy};
use chrono::{DateTime, Datelike, Utc};

/// Compute the shard path (possibly multi-level, `lvl0/lvl1/...`) for a
/// node id under the configured strategy.
pub fn node_shard_path(cfg: &GraphConfig, id: &str, created_at: DateTime<Utc>) -> String {
    let base = match cfg.shard_strategy {
        ShardStrategy::Hash => hash_shard(id, cfg.shard_count),
        ShardStrategy::Range => range_shard(id, cfg.range_size),
        ShardStrategy::Date => date_shard(created_at, cfg.date_format),
    };
    fan_out(&base, cfg.shard_levels, cfg.shard_count)
}

/// Relationships shard on the stable pair `(from, to)` hashed into the
/// type's shard space.
pub fn relationship_shard_path(cfg: &GraphConfig, from: &str, to: &str) -> String {
    let pair_key = format!("{from}\u{0}{to}");
    let base = match cfg.shard_strategy {
        ShardStrategy::Hash | ShardStrategy::Range => hash_shard(&pair_key, cfg.shard_count),
        // Relationships have no natural timestamp; collapse to a single
        // pair-hash bucket even under the date strategy.
        ShardStrategy::Date => hash_shard(&pair_key, cfg.shard_count),
    };
    fan_out(&base, cfg.shard_levels, cfg.shard_count)
}

fn hash_shard(id: &str, shard_count: u64) -> String {
    let sum: u64 = id.chars().map(|c| c as u64).sum();
    let shard_count = shard_count.max(1);
    format!("shard-{}", sum % shard_count)
}

fn range_shard(id: &str, range_size: u64) -> String {
    let n = u64::from_str_radix(id, 36).unwrap_or(0);
    let range_size = range_size.max(1);
    format!("range-{}", n / range_size)
}

fn date_shard(ts: DateTime<Utc>, fmt: DateFormat) -> String {
    match fmt {
        DateFormat::Year => format!("{:04}", ts.year()),
        DateFormat::YearMonth => format!("{:04}-{:02}", ts.year(), ts.month()),
    }
}

/// Expand a single shard token into `shard_levels` path components so the
/// fan-out is `shard_count ^ shard_levels` directories. Each level reuses
/// the same deterministic digest, split across levels by further hashing.
fn fan_out(base: &str, shard_levels: u32, shard_count: u64) -> String {
    if shard_levels <= 1 {
        return base.to_string();
    }
    let shard_count = shard_count.max(1);
    let mut digest: u64 = base.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
    let mut levels = Vec::with_capacity(shard_levels as usize);
    levels.push(base.to_string());
    for _ in 1..shard_levels {
        digest = digest.wrapping_mul(1_000_003).wrapping_add(7);
        levels.push(format!("lvl-{}", digest % shard_count));
    }
    levels.join("/")
}
