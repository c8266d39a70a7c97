pub mod bigg_reaction_names;
pub mod compound_structure;
pub mod kegg_compound_mol;
pub mod kegg_reaction_names;

pub use bigg_reaction_names::BiggReactionNamePipeline;
pub use compound_structure::CompoundStructurePipeline;
pub use kegg_compound_mol::KeggCompoundMolPipeline;
pub use kegg_reaction_names::KeggReactionNamePipeline;

use crate::domain::model::{Annotation, FetchedEntry};
use crate::utils::error::Result;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::future::Future;

pub const BIGG_REACTION_NAMESPACE: &str = "bigg.reaction";
pub const KEGG_REACTION_NAMESPACE: &str = "kegg.reaction";
pub const KEGG_COMPOUND_NAMESPACE: &str = "kegg.compound";

/// Group annotated rows by their external identifier.
pub(crate) fn group_by_identifier(annotations: Vec<Annotation>) -> BTreeMap<String, Vec<i64>> {
    let mut groups: BTreeMap<String, Vec<i64>> = BTreeMap::new();
    for annotation in annotations {
        groups
            .entry(annotation.identifier)
            .or_default()
            .push(annotation.entity_id);
    }
    groups
}

/// Fetch every identifier with at most `concurrency` requests in flight.
///
/// Failed fetches are logged and counted, not propagated. Results come back
/// in completion order.
pub(crate) async fn fetch_concurrently<F, Fut>(
    groups: BTreeMap<String, Vec<i64>>,
    concurrency: usize,
    fetch: F,
) -> (Vec<FetchedEntry>, usize)
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let total = groups.len();
    let results: Vec<_> = stream::iter(groups)
        .map(|(identifier, entity_ids)| {
            let request = fetch(identifier.clone());
            async move {
                match request.await {
                    Ok(body) => Some(FetchedEntry {
                        identifier,
                        entity_ids,
                        body,
                    }),
                    Err(e) => {
                        tracing::warn!("Skipping {}: {}", identifier, e);
                        None
                    }
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let entries: Vec<FetchedEntry> = results.into_iter().flatten().collect();
    let failed = total - entries.len();
    tracing::info!("Fetched {}/{} entries ({} failed)", entries.len(), total, failed);
    (entries, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::EtlError;

    #[test]
    fn test_group_by_identifier() {
        let annotations = vec![
            Annotation {
                entity_id: 1,
                identifier: "R00001".to_string(),
            },
            Annotation {
                entity_id: 2,
                identifier: "R00001".to_string(),
            },
            Annotation {
                entity_id: 3,
                identifier: "R00002".to_string(),
            },
        ];
        let groups = group_by_identifier(annotations);
        assert_eq!(groups["R00001"], vec![1, 2]);
        assert_eq!(groups["R00002"], vec![3]);
    }

    #[tokio::test]
    async fn test_fetch_concurrently_skips_failures() {
        let groups = BTreeMap::from([
            ("C00001".to_string(), vec![1]),
            ("C99999".to_string(), vec![2]),
        ]);

        let (entries, failed) = fetch_concurrently(groups, 2, |id| async move {
            if id == "C99999" {
                Err(EtlError::Parse {
                    message: "gone".to_string(),
                })
            } else {
                Ok(format!("body of {}", id))
            }
        })
        .await;

        assert_eq!(failed, 1);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].identifier, "C00001");
        assert_eq!(entries[0].body, "body of C00001");
    }

    #[test]
    fn test_fetch_concurrently_caps_requests_in_flight() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::Duration;

        let groups: BTreeMap<String, Vec<i64>> = (0..12)
            .map(|i| (format!("R{:05}", i), vec![i]))
            .collect();
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        let (entries, failed) = tokio_test::block_on(fetch_concurrently(groups, 3, |id| {
            let in_flight = &in_flight;
            let peak = &peak;
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(id)
            }
        }));

        assert_eq!(entries.len(), 12);
        assert_eq!(failed, 0);
        assert_eq!(peak.load(Ordering::SeqCst), 3);
        assert_eq!(in_flight.load(Ordering::SeqCst), 0);
    }
}
