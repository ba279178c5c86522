use flythru::{ FlySettings, FlyThrough, InterpolationMode, Keyframe };
use nalgebra::{ Vector3, Vector4 };
use serde::Deserialize;
use std::collections::BTreeMap;

// Keyframe sidecar as written by the host tool: { "<id>": { .. }, .. }
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StoredKeyframe {
    orbit_center: [f64; 3],
    orientation: [f64; 4],
    distance: f64,
    name: Option<String>,
}

fn load_keyframes(path: &str) -> Vec<Keyframe> {
    let data = std::fs::read_to_string(path).unwrap();
    let stored: BTreeMap<String, StoredKeyframe> = serde_json::from_str(&data).unwrap();
    stored.into_iter().map(|(id, k)| {
        let [w, x, y, z] = k.orientation;
        let [cx, cy, cz] = k.orbit_center;
        let mut kf = Keyframe::new(Vector4::new(w, x, y, z), Vector3::new(cx, cy, cz), k.distance).with_id(id);
        kf.name = k.name;
        kf
    }).collect()
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "test_data/keyframes.json".into());
    let subframes = args.next().map(|v| v.parse().unwrap()).unwrap_or(10);
    let mode: InterpolationMode = args.next().map(|v| v.parse().unwrap()).unwrap_or_default();

    let mut fly = FlyThrough::new();
    fly.set_keyframes(load_keyframes(&path));
    fly.sort_keyframes_by_name();
    fly.set_settings(FlySettings { subframes, max_frames: None, mode });
    fly.on_progress(|p| {
        log::info!("{:.1}%", p * 100.0);
        true
    });

    let mut out = String::from("frame,w,x,y,z,cx,cy,cz,distance\n");
    let count = fly.play(|i, f| {
        let (q, c) = (f.orientation, f.orbit_center);
        out.push_str(&format!("{i},{},{},{},{},{},{},{},{}\n", q[0], q[1], q[2], q[3], c[0], c[1], c[2], f.distance));
    }).unwrap();

    println!("{path}: {} keyframes -> {count} frames ({mode})", fly.keyframes().len());
    std::fs::write("frames.csv", out).unwrap();
}
