use crate::model::*;

// ── Track assignment ──────────────────────────────────────────────

/// Greedy column assignment for one cluster.
///
/// Members are visited by ascending start (stable, so ties keep cluster
/// order). Each track remembers only its latest occupant; a member goes to
/// the first track whose occupant it does not overlap, otherwise a new track
/// opens. Every member gets the same `count`: no member is widened across
/// tracks left free beside it.
///
/// Returns one `Track` per entry of `members`, in the same order.
pub fn assign_tracks(spans: &[Span], members: &[usize]) -> Vec<Track> {
    let mut order: Vec<usize> = (0..members.len()).collect();
    order.sort_by_key(|&k| spans[members[k]].start);

    let mut last_in_track: Vec<Span> = Vec::new();
    let mut index_of = vec![0u32; members.len()];

    for k in order {
        let span = spans[members[k]];
        match last_in_track.iter().position(|last| !last.overlaps(&span)) {
            Some(t) => {
                last_in_track[t] = span;
                index_of[k] = t as u32;
            }
            None => {
                index_of[k] = last_in_track.len() as u32;
                last_in_track.push(span);
            }
        }
    }

    let count = last_in_track.len().max(1) as u32;
    index_of
        .into_iter()
        .map(|index| Track { index, count })
        .collect()
}

/// Sweep-line: the largest number of spans active at any single instant.
/// An end and a start at the same instant do not count together.
pub fn peak_overlap(spans: &[Span]) -> u32 {
    let mut events: Vec<(Ms, i32)> = Vec::with_capacity(spans.len() * 2);
    for s in spans {
        events.push((s.start, 1));
        events.push((s.end, -1));
    }
    // Ends sort before starts at equal instants (half-open spans).
    events.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut count: i32 = 0;
    let mut peak: i32 = 0;
    for (_, delta) in &events {
        count += delta;
        peak = peak.max(count);
    }
    peak as u32
}
