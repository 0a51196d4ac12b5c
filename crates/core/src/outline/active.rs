use super::ScannedOutline;
use crate::config::TiebreakPolicy;
use readnav_traits::IntersectionEntry;
use readnav_types::{HeadingId, TriggerBand};

/// Picks the heading that becomes active from one intersection batch.
///
/// Only entries that are intersecting and belong to the outline count.
/// Returns `None` when the batch holds no such entry; the caller then keeps
/// the current active heading.
pub fn resolve_active(
    batch: &[IntersectionEntry],
    scanned: &ScannedOutline,
    band: &TriggerBand,
    policy: TiebreakPolicy,
) -> Option<HeadingId> {
    let mut candidates = batch
        .iter()
        .filter(|entry| entry.is_intersecting)
        .filter_map(|entry| scanned.id_for(entry.target).map(|id| (entry, id)));

    let winner = match policy {
        TiebreakPolicy::LastDelivered => candidates.last(),
        TiebreakPolicy::NearestBandTop => candidates.min_by(|(a, _), (b, _)| {
            band.distance_to_top(a.bounding_top)
                .total_cmp(&band.distance_to_top(b.bounding_top))
        }),
    };
    winner.map(|(_, id)| id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use readnav_types::{HeadingEntry, HeadingLevel, NodeKey, Outline};

    fn scanned() -> ScannedOutline {
        ScannedOutline {
            outline: Outline::from(vec![
                HeadingEntry::new("a", "A", HeadingLevel::H2),
                HeadingEntry::new("b", "B", HeadingLevel::H2),
                HeadingEntry::new("c", "C", HeadingLevel::H3),
            ]),
            nodes: vec![NodeKey::new(10), NodeKey::new(11), NodeKey::new(12)],
        }
    }

    #[test]
    fn test_last_delivered_wins() {
        let batch = [
            IntersectionEntry::entering(NodeKey::new(10), 100.0),
            IntersectionEntry::entering(NodeKey::new(12), 250.0),
            IntersectionEntry::leaving(NodeKey::new(11), -40.0),
        ];
        let active = resolve_active(
            &batch,
            &scanned(),
            &TriggerBand::default(),
            TiebreakPolicy::LastDelivered,
        );
        assert_eq!(active, Some(HeadingId::new("c")));
    }

    #[test]
    fn test_nearest_band_top_wins() {
        let batch = [
            IntersectionEntry::entering(NodeKey::new(10), 100.0),
            IntersectionEntry::entering(NodeKey::new(12), 250.0),
        ];
        let active = resolve_active(
            &batch,
            &scanned(),
            &TriggerBand::default(),
            TiebreakPolicy::NearestBandTop,
        );
        assert_eq!(active, Some(HeadingId::new("a")));
    }

    #[test]
    fn test_leaving_and_unknown_entries_are_ignored() {
        let batch = [
            IntersectionEntry::leaving(NodeKey::new(10), 90.0),
            IntersectionEntry::entering(NodeKey::new(77), 120.0),
        ];
        for policy in [TiebreakPolicy::LastDelivered, TiebreakPolicy::NearestBandTop] {
            assert_eq!(
                resolve_active(&batch, &scanned(), &TriggerBand::default(), policy),
                None
            );
        }
    }
}
