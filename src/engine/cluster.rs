use crate::config::ClusterStrategy;
use crate::model::Span;

/// Partition same-day, same-category spans into overlap clusters.
///
/// Returns indices into `spans`, clusters in opening order, members in
/// insertion order.
///
/// `FirstMatch` scans clusters in order and appends to the first one holding
/// any overlapping member. It never merges clusters: a span that overlaps two
/// disjoint clusters joins only the first, so the result depends on input
/// order. `Transitive` merges every cluster the span overlaps into the
/// earliest of them.
pub fn build_clusters(spans: &[Span], strategy: ClusterStrategy) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = Vec::new();

    for (ix, span) in spans.iter().enumerate() {
        match strategy {
            ClusterStrategy::FirstMatch => {
                let hit = clusters
                    .iter_mut()
                    .find(|members| members.iter().any(|&m| spans[m].overlaps(span)));
                match hit {
                    Some(members) => members.push(ix),
                    None => clusters.push(vec![ix]),
                }
            }
            ClusterStrategy::Transitive => {
                let hits: Vec<usize> = clusters
                    .iter()
                    .enumerate()
                    .filter(|(_, members)| members.iter().any(|&m| spans[m].overlaps(span)))
                    .map(|(c, _)| c)
                    .collect();
                let Some((&target, rest)) = hits.split_first() else {
                    clusters.push(vec![ix]);
                    continue;
                };
                // Remove from the back so earlier cluster indices stay valid.
                let mut absorbed: Vec<Vec<usize>> = rest.iter().rev().map(|&c| clusters.remove(c)).collect();
                absorbed.reverse();
                for members in absorbed {
                    clusters[target].extend(members);
                }
                clusters[target].push(ix);
            }
        }
    }

    clusters
}
