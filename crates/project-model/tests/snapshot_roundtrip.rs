use clipstage_project_model::clip::{Clip, ClipSettings, ColorAdjustments, CornerRadii};
use clipstage_project_model::lane::{Lane, LaneKind};
use clipstage_project_model::project::EditorProjectState;
use clipstage_project_model::snapshot::EditorSnapshot;
use clipstage_project_model::subtitle::{SubtitleSegment, WordTiming};
use clipstage_project_model::transform::ClipTransform;
use proptest::prelude::*;

fn finite() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |v| v.is_finite())
}

#[derive(Debug, Clone)]
struct ClipDraw {
    start: f64,
    duration: f64,
    offset: f64,
    z: i32,
    speed: f64,
    volume: f64,
    radius: f64,
    brightness: f64,
    x: f64,
    rotation: f64,
    words: Vec<(f64, f64)>,
}

fn clip_draw() -> impl Strategy<Value = ClipDraw> {
    (
        (finite(), finite(), finite(), any::<i32>()),
        (finite(), finite(), finite(), finite()),
        (finite(), finite()),
        prop::collection::vec((0.0f64..3600.0, 0.0f64..5.0), 0..6),
    )
        .prop_map(
            |((start, duration, offset, z), (speed, volume, radius, brightness), (x, rotation), words)| {
                ClipDraw {
                    start,
                    duration,
                    offset,
                    z,
                    speed,
                    volume,
                    radius,
                    brightness,
                    x,
                    rotation,
                    words,
                }
            },
        )
}

fn build(draws: &[ClipDraw], selected: usize) -> EditorSnapshot {
    let mut snap = EditorSnapshot::new();
    snap.lanes = vec![
        Lane::new("lane-text-1", LaneKind::Text),
        Lane::new("lane-video-1", LaneKind::Video),
    ];
    for (i, d) in draws.iter().enumerate() {
        let id = format!("clip-{i}");
        let mut clip = Clip::new(id.clone(), "asset", "lane-video-1", d.start, d.duration);
        clip.start_offset = d.offset;
        clip.z_index = d.z;
        snap.clips.push(clip);
        snap.settings.insert(
            id.clone(),
            ClipSettings {
                speed: d.speed,
                volume: d.volume,
                corner_radii: CornerRadii::uniform(d.radius),
                color: ColorAdjustments {
                    brightness: d.brightness,
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        let mut transform = ClipTransform::FULL;
        transform.x = d.x;
        transform.rotation = d.rotation;
        snap.transforms.insert(id.clone(), transform);

        let sub_id = format!("sub-{i}");
        snap.clips.push(Clip::new(
            sub_id.clone(),
            "subtitle",
            "lane-text-1",
            d.start,
            d.duration,
        ));
        let mut segment = SubtitleSegment::new(sub_id.clone(), "caption", d.start, d.start + d.duration);
        segment.source_clip_id = Some(id);
        segment.words = Some(
            d.words
                .iter()
                .map(|(s, len)| WordTiming::new(*s, s + len, "word"))
                .collect(),
        );
        snap.subtitles.insert(sub_id, segment);
    }
    if !draws.is_empty() {
        snap.selection.select_only(format!("clip-{}", selected % draws.len()));
        snap.selection.lane_id = Some("lane-video-1".to_string());
    }
    snap.next_id = draws.len() as u64 * 2;
    snap
}

#[test]
fn awkward_floats_survive_round_trip() {
    let draw = ClipDraw {
        start: 198.62006851766338,
        duration: 1.721170395869191,
        offset: 0.1 + 0.2,
        z: -3,
        speed: 1.0 / 3.0,
        volume: 2.0f64.sqrt(),
        radius: 1e-300,
        brightness: -0.0,
        x: f64::MIN_POSITIVE,
        rotation: f64::MAX,
        words: vec![(198.62006851766338, 0.3)],
    };
    let snap = build(&[draw], 0);
    let json = snap.to_json().unwrap();
    let parsed = EditorSnapshot::from_json(&json).unwrap();
    assert_eq!(parsed, snap);
    assert_eq!(parsed.to_json().unwrap(), json);
}

proptest! {
    #[test]
    fn snapshot_round_trip_is_byte_identical(
        draws in prop::collection::vec(clip_draw(), 0..6),
        selected in 0usize..6,
    ) {
        let snap = build(&draws, selected);
        let first = snap.to_json().unwrap();
        let parsed = EditorSnapshot::from_json(&first).unwrap();
        prop_assert_eq!(&parsed, &snap);
        prop_assert_eq!(parsed.to_json().unwrap(), first);
    }

    #[test]
    fn project_round_trip_is_byte_identical(
        draws in prop::collection::vec(clip_draw(), 0..4),
    ) {
        let mut project = EditorProjectState::new("Round trip");
        project.snapshot = build(&draws, 0);
        let first = project.to_json().unwrap();
        let parsed = EditorProjectState::from_json(&first).unwrap();
        prop_assert_eq!(&parsed, &project);
        prop_assert_eq!(parsed.to_json().unwrap(), first);
    }
}
