use device_registry::ScreenRecord;
use profile_transport::{MockSubscriber, StreamMetadata};

pub const ROW_WIDTH: usize = 64;

pub fn screen(element: &str, device: &str, values: Vec<f64>, props: Vec<&str>) -> ScreenRecord {
    ScreenRecord {
        element_name: element.into(),
        device_name: device.into(),
        image_name: format!("{device}:IMAGE"),
        values,
        props: props.into_iter().map(String::from).collect(),
    }
}

/// DEV1 is 2x3 with one property, DEV2 is 4x1.
pub fn two_screens() -> Vec<ScreenRecord> {
    vec![
        screen("OTR1", "DEV1", vec![2.0, 3.0, 0.5], vec!["", "", "DEV:1:X:RES"]),
        screen("OTR2", "DEV2", vec![4.0, 1.0], vec![]),
    ]
}

/// A twiss-table line for `element`.
pub fn row(index: usize, element: &str, beta_a: f64, beta_b: f64) -> String {
    format!("{index} {element} 0.0 0.0 0.0 {beta_a} {beta_b}")
}

/// Header/trailer lines that frame the table.
pub fn boundary(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("# boundary {i}")).collect()
}

/// Wrap data lines with boundary rows on both ends.
pub fn framed(data: Vec<String>) -> Vec<String> {
    let mut lines = boundary(3);
    lines.extend(data);
    lines.extend(boundary(3));
    lines
}

/// Pack lines as a `|S64` column and queue them as one cycle.
pub fn push_lines(sub: &mut MockSubscriber, lines: &[String]) {
    let mut payload = Vec::with_capacity(lines.len() * ROW_WIDTH);
    for l in lines {
        let mut cell = l.as_bytes().to_vec();
        cell.resize(ROW_WIDTH, 0);
        payload.extend_from_slice(&cell);
    }
    let md = StreamMetadata::new(format!("|S{ROW_WIDTH}"), vec![lines.len()]);
    sub.push_cycle(&md, payload);
}
