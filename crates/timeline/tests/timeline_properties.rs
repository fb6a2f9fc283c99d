use clipstage_project_model::clip::Clip;
use clipstage_project_model::lane::{lanes_are_ordered, Lane, LaneKind};
use clipstage_project_model::snapshot::EditorSnapshot;
use clipstage_timeline::config::TimelineConfig;
use clipstage_timeline::editing::{delete_clips, split_clip};
use clipstage_timeline::invariants::{check_invariants, find_overlaps};
use clipstage_timeline::lanes::{create_lane, prune_empty_lanes};
use clipstage_timeline::placement::{resolve_collisions, DragPointer, DragSession};
use proptest::prelude::*;

fn kind_from(n: u8) -> LaneKind {
    match n % 3 {
        0 => LaneKind::Text,
        1 => LaneKind::Video,
        _ => LaneKind::Audio,
    }
}

#[test]
fn drag_within_six_pixels_of_edge_snaps_at_twelve_pps() {
    let mut snap = EditorSnapshot::new();
    snap.lanes = vec![Lane::new("lv", LaneKind::Video)];
    snap.clips.push(Clip::new("left", "a", "lv", 0.0, 10.0));
    snap.clips.push(Clip::new("moving", "a", "lv", 30.0, 5.0));

    let config = TimelineConfig::default();
    let mut session = DragSession::begin(&snap, &[], "moving", 60.0).unwrap();
    // 30.0 -> 10.3 at 12 px/s.
    let pointer = DragPointer {
        dx_px: -19.7 * 12.0,
        y_px: Some(40.0),
        pixels_per_second: 12.0,
    };
    let preview = session.update(&snap, &config, pointer).unwrap().clone();
    assert_eq!(preview.start_time, 10.0);
    assert_eq!(preview.guide, Some(10.0));

    session.commit(&mut snap).unwrap();
    assert_eq!(snap.clip("moving").unwrap().start_time, 10.0);
    assert!(check_invariants(&snap).is_empty());
}

proptest! {
    #[test]
    fn collision_resolution_leaves_no_overlap(
        spans in prop::collection::vec((0.0f64..100.0, 0.1f64..10.0), 1..20),
        priority in 0usize..20,
    ) {
        let mut snap = EditorSnapshot::new();
        snap.lanes = vec![Lane::new("lv", LaneKind::Video)];
        for (i, (start, duration)) in spans.iter().enumerate() {
            snap.clips.push(Clip::new(format!("c{i}"), "a", "lv", *start, *duration));
        }
        let priority_id = format!("c{}", priority % spans.len());
        let before: Vec<f64> = snap.clips.iter().map(|c| c.start_time).collect();

        resolve_collisions(&mut snap, "lv", Some(&priority_id));

        prop_assert!(find_overlaps(&snap).is_empty());
        // Clips only ever move forward.
        for (clip, start) in snap.clips.iter().zip(before) {
            prop_assert!(clip.start_time >= start);
        }
    }

    #[test]
    fn lanes_stay_ordered_after_any_mutation(
        ops in prop::collection::vec((0u8..3, 0usize..10, any::<bool>()), 1..40),
    ) {
        let mut snap = EditorSnapshot::new();
        for (kind, index, prune) in ops {
            if prune && !snap.lanes.is_empty() {
                let lane_id = snap.lanes[index % snap.lanes.len()].id.clone();
                prune_empty_lanes(&mut snap, &[lane_id]);
            } else {
                create_lane(&mut snap, kind_from(kind), index);
            }
            prop_assert!(lanes_are_ordered(&snap.lanes));
        }
    }

    #[test]
    fn split_preserves_total_duration(
        start in 0.0f64..50.0,
        duration in 1.0f64..20.0,
        fraction in 0.1f64..0.9,
    ) {
        let mut snap = EditorSnapshot::new();
        snap.lanes = vec![Lane::new("lv", LaneKind::Video)];
        snap.clips.push(Clip::new("c", "a", "lv", start, duration));

        let right = split_clip(&mut snap, &TimelineConfig::default(), "c", start + duration * fraction)
            .unwrap();
        let left = snap.clip("c").unwrap();
        let right = snap.clip(&right).unwrap();
        prop_assert!((left.duration + right.duration - duration).abs() < 1e-9);
        prop_assert!((left.end_time() - right.start_time).abs() < 1e-9);
    }

    #[test]
    fn delete_never_leaves_dangling_subtitles(
        count in 1usize..6,
        victim in 0usize..6,
    ) {
        let mut snap = EditorSnapshot::new();
        snap.lanes = vec![Lane::new("lt", LaneKind::Text), Lane::new("lv", LaneKind::Video)];
        for i in 0..count {
            let id = format!("v{i}");
            snap.clips.push(Clip::new(id.clone(), "a", "lv", i as f64 * 10.0, 10.0));
            let sub = format!("s{i}");
            snap.clips.push(Clip::new(sub.clone(), "t", "lt", i as f64 * 10.0, 2.0));
            let mut seg = clipstage_project_model::subtitle::SubtitleSegment::new(
                sub.clone(), "x", i as f64 * 10.0, i as f64 * 10.0 + 2.0,
            );
            seg.source_clip_id = Some(id);
            snap.subtitles.insert(sub, seg);
        }

        delete_clips(&mut snap, &[format!("v{}", victim % count)]);
        prop_assert!(check_invariants(&snap).is_empty());
    }
}
