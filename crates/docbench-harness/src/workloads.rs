//! Named CRUD workloads.
//!
//! Each workload seeds its own collection, drives one adapter operation per
//! iteration, and drops the collection afterwards, so runs are independent
//! and repeatable.

use std::sync::Arc;

use serde_json::Value;

use docbench_core::{Document, DocumentAdapter, Filter, QueryOptions, ID_FIELD};

use crate::fixtures::{generate_documents, Scale};
use crate::runner::{BenchmarkResult, BenchmarkRunner};
use crate::stats::LatencyStats;

/// Documents per `insert_many` batch.
const INSERT_BATCH: usize = 10;

/// Result page size for the read workloads.
const FIND_LIMIT: u64 = 100;

/// The benchmarkable operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workload {
    InsertOne,
    InsertMany,
    FindAll,
    FindFiltered,
    FindById,
    UpdateOne,
    UpdateMany,
    DeleteOne,
    Count,
}

impl Workload {
    /// Every workload, in reporting order.
    pub fn all() -> Vec<Workload> {
        vec![
            Workload::InsertOne,
            Workload::InsertMany,
            Workload::FindAll,
            Workload::FindFiltered,
            Workload::FindById,
            Workload::UpdateOne,
            Workload::UpdateMany,
            Workload::DeleteOne,
            Workload::Count,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Workload::InsertOne => "insert_one",
            Workload::InsertMany => "insert_many",
            Workload::FindAll => "find_all",
            Workload::FindFiltered => "find_filtered",
            Workload::FindById => "find_by_id",
            Workload::UpdateOne => "update_one",
            Workload::UpdateMany => "update_many",
            Workload::DeleteOne => "delete_one",
            Workload::Count => "count",
        }
    }
}

impl std::str::FromStr for Workload {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Workload::all()
            .into_iter()
            .find(|w| w.name() == s)
            .ok_or_else(|| format!("unknown workload '{}'", s))
    }
}

impl std::fmt::Display for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn filter_of(value: Value) -> Filter {
    match value {
        Value::Object(map) => map,
        _ => unreachable!("filter literals are objects"),
    }
}

/// Run one workload against one adapter and aggregate its latencies.
pub async fn run_workload(
    adapter: &Arc<dyn DocumentAdapter>,
    workload: Workload,
    scale: Scale,
    runner: &BenchmarkRunner,
) -> docbench_core::Result<BenchmarkResult> {
    let collection = format!("bench_{}", workload.name());
    tracing::info!(
        workload = workload.name(),
        backend = %adapter.backend(),
        collection,
        "running workload"
    );

    adapter.drop_collection(&collection).await?;
    adapter.create_collection(&collection).await?;

    // Copies cheaply into each iteration's future.
    let coll: &str = collection.as_str();
    let docs = generate_documents(scale.count());

    let durations = match workload {
        Workload::InsertOne => {
            runner
                .run(workload.name(), |i| {
                    let doc = docs[i % docs.len()].clone();
                    async move { adapter.insert_one(coll, doc).await.map(|_| ()) }
                })
                .await?
        }
        Workload::InsertMany => {
            let batch: Vec<Document> = docs.iter().take(INSERT_BATCH).cloned().collect();
            runner
                .run(workload.name(), |_| {
                    let batch = batch.clone();
                    async move { adapter.insert_many(coll, batch).await.map(|_| ()) }
                })
                .await?
        }
        Workload::FindAll => {
            adapter.insert_many(coll, docs.clone()).await?;
            let options = QueryOptions::new().with_limit(FIND_LIMIT);
            runner
                .run(workload.name(), |_| {
                    let options = options.clone();
                    async move {
                        adapter.find(coll, &Filter::new(), &options).await.map(|_| ())
                    }
                })
                .await?
        }
        Workload::FindFiltered => {
            adapter.insert_many(coll, docs.clone()).await?;
            let filter = filter_of(serde_json::json!({"age": {"$gte": 30, "$lte": 60}}));
            let options = QueryOptions::new().with_limit(FIND_LIMIT);
            runner
                .run(workload.name(), |_| {
                    let filter = filter.clone();
                    let options = options.clone();
                    async move { adapter.find(coll, &filter, &options).await.map(|_| ()) }
                })
                .await?
        }
        Workload::FindById => {
            let seeded = adapter.insert_many(coll, docs.clone()).await?;
            let ids: Vec<Value> = seeded
                .iter()
                .filter_map(|d| d.get(ID_FIELD).cloned())
                .collect();
            runner
                .run(workload.name(), |i| {
                    let id = ids[i % ids.len()].clone();
                    async move { adapter.find_by_id(coll, &id).await.map(|_| ()) }
                })
                .await?
        }
        Workload::UpdateOne => {
            let seeded = adapter.insert_many(coll, docs.clone()).await?;
            let ids: Vec<Value> = seeded
                .iter()
                .filter_map(|d| d.get(ID_FIELD).cloned())
                .collect();
            runner
                .run(workload.name(), |i| {
                    let mut filter = Filter::new();
                    filter.insert(ID_FIELD.to_string(), ids[i % ids.len()].clone());
                    let update = filter_of(serde_json::json!({
                        "$set": {"status": "touched", "revision": i as i64}
                    }));
                    async move {
                        adapter.update_one(coll, &filter, &update).await.map(|_| ())
                    }
                })
                .await?
        }
        Workload::UpdateMany => {
            adapter.insert_many(coll, docs.clone()).await?;
            let filter = filter_of(serde_json::json!({"status": "active"}));
            runner
                .run(workload.name(), |i| {
                    let filter = filter.clone();
                    let update = filter_of(serde_json::json!({
                        "$set": {"revision": i as i64}
                    }));
                    async move {
                        adapter.update_many(coll, &filter, &update).await.map(|_| ())
                    }
                })
                .await?
        }
        Workload::DeleteOne => {
            // One seeded document per iteration, warmup included.
            let pool = generate_documents(runner.warmup + runner.iterations);
            adapter.insert_many(coll, pool).await?;
            runner
                .run(workload.name(), |_| async move {
                    adapter.delete_one(coll, &Filter::new()).await.map(|_| ())
                })
                .await?
        }
        Workload::Count => {
            adapter.insert_many(coll, docs.clone()).await?;
            let filter = filter_of(serde_json::json!({"status": "active"}));
            runner
                .run(workload.name(), |_| {
                    let filter = filter.clone();
                    async move { adapter.count(coll, &filter).await.map(|_| ()) }
                })
                .await?
        }
    };

    adapter.drop_collection(&collection).await?;

    Ok(BenchmarkResult {
        workload: workload.name().to_string(),
        backend: adapter.backend().to_string(),
        scale: scale.name().to_string(),
        stats: LatencyStats::from_durations(&durations),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_names_round_trip() {
        for workload in Workload::all() {
            assert_eq!(workload.name().parse::<Workload>().unwrap(), workload);
        }
        assert!("drop_table".parse::<Workload>().is_err());
    }

    #[test]
    fn test_all_workloads_are_distinct() {
        let all = Workload::all();
        let mut names: Vec<_> = all.iter().map(|w| w.name()).collect();
        names.dedup();
        assert_eq!(names.len(), all.len());
    }
}
