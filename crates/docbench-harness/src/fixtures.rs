//! Benchmark data generation.
//!
//! Generators are seeded so every run (and every backend) sees the same
//! documents.

use docbench_core::Document;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

const SEED: u64 = 72_401;

const STATUSES: [&str; 4] = ["active", "inactive", "pending", "admin"];

const NAME_PREFIXES: [&str; 10] = [
    "Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Henry", "Ivy", "Jack",
];

const CITIES: [&str; 6] = ["Berlin", "Lisbon", "Oslo", "Porto", "Riga", "Tallinn"];

const TAG_POOL: [&str; 8] = [
    "alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta",
];

/// Scale factor for benchmark data generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Scale {
    /// ~10 documents; quick checks and development iteration.
    Tiny,
    /// ~100 documents.
    #[default]
    Small,
    /// ~1,000 documents.
    Medium,
    /// ~10,000 documents.
    Large,
}

impl Scale {
    /// Number of seeded documents at this scale.
    pub fn count(&self) -> usize {
        match self {
            Scale::Tiny => 10,
            Scale::Small => 100,
            Scale::Medium => 1_000,
            Scale::Large => 10_000,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scale::Tiny => "tiny",
            Scale::Small => "small",
            Scale::Medium => "medium",
            Scale::Large => "large",
        }
    }
}

impl std::str::FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tiny" => Ok(Scale::Tiny),
            "small" => Ok(Scale::Small),
            "medium" => Ok(Scale::Medium),
            "large" => Ok(Scale::Large),
            other => Err(format!("unknown scale '{}'", other)),
        }
    }
}

fn random_suffix(rng: &mut StdRng, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

/// Generate person documents with a realistic field mix: strings, numbers,
/// a boolean, a tag array, and a nested address.
pub fn generate_documents(count: usize) -> Vec<Document> {
    let mut rng = StdRng::seed_from_u64(SEED);

    (0..count)
        .map(|i| {
            let name_prefix = NAME_PREFIXES[i % NAME_PREFIXES.len()];
            let age = 18 + (rng.gen::<u32>() % 60) as i64;
            let score = (rng.gen::<f64>() * 100.0 * 100.0).round() / 100.0;
            let tag_count = 1 + i % 3;
            let tags: Vec<Value> = (0..tag_count)
                .map(|t| Value::String(TAG_POOL[(i + t) % TAG_POOL.len()].to_string()))
                .collect();

            let value = json!({
                "name": format!("{}_{}", name_prefix, i),
                "email": format!("user{}@example{}.com", i, i % 10),
                "age": age,
                "status": STATUSES[i % STATUSES.len()],
                "score": score,
                "verified": i % 2 == 0,
                "tags": tags,
                "address": {
                    "city": CITIES[i % CITIES.len()],
                    "zip": format!("{:05}", 10_000 + i),
                },
                "token": random_suffix(&mut rng, 12),
            });
            match value {
                Value::Object(map) => map,
                _ => unreachable!(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_counts_increase() {
        assert!(Scale::Tiny.count() < Scale::Small.count());
        assert!(Scale::Small.count() < Scale::Medium.count());
        assert!(Scale::Medium.count() < Scale::Large.count());
    }

    #[test]
    fn test_scale_parse() {
        assert_eq!("medium".parse::<Scale>().unwrap(), Scale::Medium);
        assert!("huge".parse::<Scale>().is_err());
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_documents(50);
        let b = generate_documents(50);
        assert_eq!(a, b);
    }

    #[test]
    fn test_documents_carry_expected_fields() {
        let docs = generate_documents(10);
        assert_eq!(docs.len(), 10);
        for doc in &docs {
            assert!(doc.get("name").is_some());
            assert!(doc.get("age").and_then(Value::as_i64).is_some());
            assert!(doc.get("tags").and_then(Value::as_array).is_some());
            assert!(doc.get("address").and_then(Value::as_object).is_some());
        }
    }
}
